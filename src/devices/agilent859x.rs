// Agilent/HP 8590-series spectrum analyzer on GPIB, kept in single-sweep mode

use std::path::Path;

use log::info;

use crate::bus::{LinkSettings, Resource, Session};
use crate::error::{Error, Result};
use crate::utils;

use super::finite;

pub const ID_QUERY:&str = "ID?";
pub const DEFAULT_GPIB_ADDRESS:u8 = 3;

// Points per trace in the default trace length
pub const TRACE_POINTS:usize = 401;

pub struct Agilent859X {
	session: Session,
	id: String,
}

fn on_off(on:bool) -> &'static str { if on {"ON"} else {"OFF"} }

impl Agilent859X {

	pub fn default_link_settings() -> LinkSettings { LinkSettings::default() }

	pub fn connect(resource:&Resource) -> Result<Self> {
		Self::connect_with(resource, &Self::default_link_settings())
	}

	pub fn connect_with(resource:&Resource, settings:&LinkSettings) -> Result<Self> {
		Self::new(Session::open(resource, settings)?)
	}

	/// Identifies the analyzer, restores presets, selects single sweep and sets the date format.
	pub fn new(mut session:Session) -> Result<Self> {
		let id = session.handshake(ID_QUERY)?;

		session.write("IP;SNGLS;")?;
		session.write("DATEMODE DMY;")?;

		Ok(Self{ session, id })
	}

	/// Identity reply from the connection handshake.
	pub fn identity(&self) -> &str { &self.id }

	pub fn close(&mut self) -> Result<()> {
		if self.session.is_open() { info!("Closing spectrum analyzer"); }
		self.session.close()
	}

	pub fn reset(&mut self) -> Result<()> { self.session.write("IP;SNGLS;") }

	pub fn id(&mut self) -> Result<String> { self.session.query("ID?;") }

	pub fn input_impedance(&mut self) -> Result<f64> { self.session.query_value("INZ?") }

	/// Takes one sweep and returns the trace amplitudes.
	pub fn take_sweep(&mut self) -> Result<Vec<f64>> {
		self.session.write("TS;")?;
		self.session.query_values("TRA?;")
	}

	pub fn set_start_frequency(&mut self, hz:f64) -> Result<()> {
		self.session.write(&format!("FA {}", finite("start frequency", hz)?))
	}

	pub fn start_frequency(&mut self) -> Result<f64> { self.session.query_value("FA?") }

	pub fn set_center_frequency(&mut self, hz:f64) -> Result<()> {
		self.session.write(&format!("CF {}", finite("center frequency", hz)?))
	}

	pub fn center_frequency(&mut self) -> Result<f64> { self.session.query_value("CF?") }

	pub fn set_stop_frequency(&mut self, hz:f64) -> Result<()> {
		self.session.write(&format!("FB {}", finite("stop frequency", hz)?))
	}

	pub fn stop_frequency(&mut self) -> Result<f64> { self.session.query_value("FB?") }

	pub fn set_frequency_span(&mut self, hz:f64) -> Result<()> {
		self.session.write(&format!("SP {}", finite("frequency span", hz)?))
	}

	pub fn frequency_span(&mut self) -> Result<f64> { self.session.query_value("SP?") }

	pub fn set_frequency_range(&mut self, start_hz:f64, stop_hz:f64) -> Result<()> {
		let (start_hz, stop_hz) = (finite("start frequency", start_hz)?, finite("stop frequency", stop_hz)?);
		if start_hz >= stop_hz {
			return Err(Error::InvalidSetting(format!("start frequency {} Hz is not below stop frequency {} Hz", start_hz, stop_hz)));
		}
		self.session.write(&format!("FA {};FB {}", start_hz, stop_hz))
	}

	/// Frequencies of the trace points, read from the current start and stop frequencies.
	pub fn frequency_axis(&mut self) -> Result<Vec<f64>> {
		let fa = self.start_frequency()?;
		let fb = self.stop_frequency()?;
		Ok(utils::linspace(fa, fb, TRACE_POINTS))
	}

	/// Takes a sweep and writes `frequency amplitude` rows to `path`.
	pub fn save_trace<P: AsRef<Path>>(&mut self, path:P) -> Result<()> {
		let trace = self.take_sweep()?;
		let freqs = self.frequency_axis()?;
		if trace.len() != freqs.len() {
			return Err(Error::MalformedReply{ command: "TRA?;".to_owned(), reply: format!("{} points, expected {}", trace.len(), TRACE_POINTS) });
		}
		utils::write_columns(path, &freqs, &trace)
	}

	pub fn set_sweep_time(&mut self, seconds:f64) -> Result<()> {
		self.session.write(&format!("ST {}", finite("sweep time", seconds)?))
	}

	pub fn set_resolution_bandwidth(&mut self, hz:f64) -> Result<()> {
		self.session.write(&format!("RB {}", finite("resolution bandwidth", hz)?))
	}

	pub fn resolution_bandwidth(&mut self) -> Result<f64> { self.session.query_value("RB?;") }

	pub fn place_marker_at_peak(&mut self) -> Result<()> { self.session.write("MKPK HI;") }

	pub fn marker_frequency(&mut self) -> Result<f64> { self.session.query_value("TDF P;MKREAD FRQ;MKF?;") }

	pub fn marker_amplitude(&mut self) -> Result<f64> { self.session.query_value("MKA?") }

	/// Bandwidth of the signal under the marker, 3 dB down from its peak.
	pub fn marker_bandwidth_3db(&mut self) -> Result<f64> { self.session.query_value("MKBW -3?") }

	// Screen annotation

	pub fn clear_display(&mut self) -> Result<()> { self.session.write("CLRDSP") }

	pub fn blank_trace(&mut self) -> Result<()> { self.session.write("BLANK TRA") }

	pub fn set_annotation(&mut self, on:bool) -> Result<()> { self.session.write(&format!("ANNOT {}", on_off(on))) }

	pub fn set_graticule(&mut self, on:bool) -> Result<()> { self.session.write(&format!("GRAT {}", on_off(on))) }

	pub fn set_menu(&mut self, on:bool) -> Result<()> { self.session.write(&format!("MENU {}", on_off(on))) }

	/// Draws a box in display units; `border` is the optional (width, height) of its outline.
	pub fn draw_box(&mut self, x1:u32, y1:u32, x2:u32, y2:u32, border:Option<(u32, u32)>) -> Result<()> {
		let cmd = match border {
			Some((w, h)) => format!("DRAWBOX {},{},{},{},{},{}", x1, y1, x2, y2, w, h),
			None         => format!("DRAWBOX {},{},{},{}", x1, y1, x2, y2),
		};
		self.session.write(&cmd)
	}

	/// Writes `text` with its lower left corner at (`x`, `y`). `%` and `"` delimit
	/// the text on the wire and can't appear in it.
	pub fn write_text(&mut self, x:u32, y:u32, text:&str) -> Result<()> {
		if text.contains('%') || text.contains('"') {
			return Err(Error::InvalidSetting(format!("display text can't contain '%' or '\"': {:?}", text)));
		}
		self.session.write(&format!("PU;PA{},{};TEXT%\"{}\"%", x, y, text))
	}

}

// Implemented
// ID		IDENTIFY				Identification, connection handshake
// IP		INSTRUMENT PRESET		Preset, paired with SNGLS
// SNGLS	SINGLE SWEEP
// DATEMODE	DATE MODE				DMY on connect
// INZ		INPUT IMPEDANCE
// TS		TAKE SWEEP
// TRA		TRACE A					Read as comma-separated ASCII
// FA/FB/CF/SP					Start, stop, center, span
// ST		SWEEP TIME
// RB		RESOLUTION BANDWIDTH
// MKPK		MARKER PEAK				HI only
// MKF/MKA	MARKER FREQ/AMPL
// MKBW		MARKER BANDWIDTH		-3 dB only
// CLRDSP BLANK ANNOT GRAT MENU DRAWBOX PU PA TEXT	Display annotation
