// Takes one spectrum analyzer sweep and saves it as a two-column text file

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use serde::Serialize;

use labdrivers::config::StationConfig;
use labdrivers::devices::agilent859x::Agilent859X;
use labdrivers::Result;

#[derive(Parser, Debug)]
#[command(about = "Take a spectrum analyzer sweep and save the trace")]
struct Args {
	/// Station configuration file
	#[arg(short, long, default_value = "station.toml")]
	config: PathBuf,

	/// Start frequency in Hz
	#[arg(long, requires = "stop")]
	start: Option<f64>,

	/// Stop frequency in Hz
	#[arg(long, requires = "start")]
	stop: Option<f64>,

	/// Resolution bandwidth in Hz
	#[arg(long)]
	rbw: Option<f64>,

	/// Output file
	#[arg(short, long, default_value = "trace.txt")]
	output: PathBuf,
}

#[derive(Serialize)]
struct Peak {
	frequency_hz: f64,
	amplitude: f64,
	bandwidth_3db_hz: f64,
}

fn run(args:&Args) -> Result<()> {
	let station = StationConfig::load(&args.config)?;
	let sa_config = station.spectrum_analyzer
		.ok_or_else(|| labdrivers::Error::Config("no [spectrum_analyzer] section".to_owned()))?;

	let settings = sa_config.link_settings(Agilent859X::default_link_settings());
	let mut sa = Agilent859X::connect_with(&sa_config.resource, &settings)?;

	if let (Some(start), Some(stop)) = (args.start, args.stop) {
		sa.set_frequency_range(start, stop)?;
	}
	if let Some(rbw) = args.rbw {
		sa.set_resolution_bandwidth(rbw)?;
	}

	sa.save_trace(&args.output)?;
	info!("Saved trace to {}", args.output.display());

	sa.place_marker_at_peak()?;
	let peak = Peak {
		frequency_hz:     sa.marker_frequency()?,
		amplitude:        sa.marker_amplitude()?,
		bandwidth_3db_hz: sa.marker_bandwidth_3db()?,
	};
	match serde_json::to_string_pretty(&peak) {
		Ok(s) => println!("{}", s),
		Err(e) => error!("Unable to format peak: {}", e),
	}

	sa.close()
}

fn main() -> ExitCode {
	env_logger::init();
	let args = Args::parse();

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			ExitCode::FAILURE
		}
	}
}
