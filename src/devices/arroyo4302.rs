// Arroyo 4302 laser diode current source on RS-232; output goes off before the port is released

use log::{info, warn};

use crate::bus::{LinkSettings, Parity, Resource, Session};
use crate::error::Result;
use crate::reply::{self, Identity};

use super::finite;

pub const ID_QUERY:&str = "*IDN?";
pub const DEFAULT_BAUD_RATE:u32 = 38400;
pub const DEFAULT_TIMEOUT_MS:u64 = 500;

pub struct Arroyo4302 {
	session: Session,
	id: String,
}

impl Arroyo4302 {

	/// 38400 baud, 8N1, `\n` line endings, 500 ms timeout.
	pub fn default_link_settings() -> LinkSettings {
		LinkSettings {
			baud_rate: DEFAULT_BAUD_RATE,
			data_bits: 8,
			parity: Parity::None,
			stop_bits: 1,
			write_termination: "\n".to_owned(),
			read_termination: "\n".to_owned(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
		}
	}

	pub fn connect(resource:&Resource) -> Result<Self> {
		Self::connect_with(resource, &Self::default_link_settings())
	}

	pub fn connect_with(resource:&Resource, settings:&LinkSettings) -> Result<Self> {
		Self::new(Session::open(resource, settings)?)
	}

	pub fn new(mut session:Session) -> Result<Self> {
		let id = session.handshake(ID_QUERY)?;
		Ok(Self{ session, id })
	}

	/// Identity reply from the connection handshake.
	pub fn identity(&self) -> &str { &self.id }

	/// Queries `*IDN?` again and splits it into its fields.
	pub fn identify(&mut self) -> Result<Identity> {
		let res = self.session.query(ID_QUERY)?;
		Identity::parse(ID_QUERY, &res)
	}

	/// Laser diode current setpoint in mA.
	pub fn set_output_current(&mut self, ma:f64) -> Result<()> {
		self.session.write(&format!("LASER:LDI {}", finite("output current", ma)?))
	}

	pub fn output_current(&mut self) -> Result<f64> { self.session.query_value("LASER:LDI?") }

	/// Measured laser diode voltage in V.
	pub fn voltage(&mut self) -> Result<f64> { self.session.query_value("LASER:LDV?") }

	pub fn enable_output(&mut self, enable:bool) -> Result<()> {
		self.session.write(if enable {"LASER:OUTPUT 1"} else {"LASER:OUTPUT 0"})
	}

	pub fn output_enabled(&mut self) -> Result<bool> {
		let res = self.session.query("LASER:OUTPUT?")?;
		reply::parse_flag("LASER:OUTPUT?", &res)
	}

	/// Switches the output off and releases the port. Calling it again does nothing.
	///
	/// The port is released even if switching the output off fails; that error is
	/// still returned.
	pub fn close(&mut self) -> Result<()> {
		if !self.session.is_open() { return Ok(()); }

		info!("Closing current source");
		let disabled = self.enable_output(false);
		let closed = self.session.close();
		disabled.and(closed)
	}

}

impl Drop for Arroyo4302 {

	fn drop(&mut self) {
		if let Err(e) = self.close() {
			warn!("Error while closing current source: {}", e);
		}
	}

}

// Implemented
// *IDN?			Identification
// LASER:LDI		Current setpoint [mA], set and query
// LASER:LDV?		Measured voltage [V]
// LASER:OUTPUT		Output on/off, set and query

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bus::SimulatedInstrument;
	use crate::error::Error;

	fn source(sim:&SimulatedInstrument) -> Arroyo4302 {
		sim.on(ID_QUERY, "Arroyo,4302,SN1234,1.05");
		let session = Session::with_transport("SIM", Arroyo4302::default_link_settings(), Box::new(sim.clone()));
		Arroyo4302::new(session).unwrap()
	}

	#[test]
	fn serial_defaults() {
		let s = Arroyo4302::default_link_settings();
		assert_eq!(s.baud_rate, 38400);
		assert_eq!((s.data_bits, s.parity, s.stop_bits), (8, Parity::None, 1));
		assert_eq!(s.write_termination, "\n");
		assert_eq!(s.timeout_ms, 500);
	}

	#[test]
	fn handshake_uses_idn() {
		let sim = SimulatedInstrument::new();
		let cs = source(&sim);
		assert_eq!(cs.identity(), "Arroyo,4302,SN1234,1.05");
		assert_eq!(sim.written(), vec!["*IDN?"]);
	}

	#[test]
	fn identity_fields() {
		let sim = SimulatedInstrument::new();
		let mut cs = source(&sim);
		sim.on(ID_QUERY, "Arroyo,4302,SN1234,1.05");
		let id = cs.identify().unwrap();
		assert_eq!(id.model, "4302");
		assert_eq!(id.serial_num, "SN1234");
	}

	#[test]
	fn current_and_output_commands() {
		let sim = SimulatedInstrument::new();
		let mut cs = source(&sim);
		cs.set_output_current(25.5).unwrap();
		cs.set_output_current(100.0).unwrap();
		cs.enable_output(true).unwrap();
		cs.enable_output(false).unwrap();

		assert_eq!(&sim.written()[1..], &["LASER:LDI 25.5", "LASER:LDI 100", "LASER:OUTPUT 1", "LASER:OUTPUT 0"]);
	}

	#[test]
	fn measurements() {
		let sim = SimulatedInstrument::new();
		let mut cs = source(&sim);
		sim.on("LASER:LDV?", "1.873").on("LASER:LDI?", "25.50").on("LASER:OUTPUT?", "1");

		assert_eq!(cs.voltage().unwrap(), 1.873);
		assert_eq!(cs.output_current().unwrap(), 25.5);
		assert!(cs.output_enabled().unwrap());
	}

	#[test]
	fn voltage_timeout_propagates() {
		let sim = SimulatedInstrument::new();
		let mut cs = source(&sim);
		sim.on_timeout("LASER:LDV?");
		assert!(cs.voltage().unwrap_err().is_timeout());
	}

	#[test]
	fn close_disables_output_once() {
		let sim = SimulatedInstrument::new();
		let mut cs = source(&sim);
		cs.close().unwrap();
		cs.close().unwrap();
		drop(cs);

		assert_eq!(sim.written(), vec!["*IDN?", "LASER:OUTPUT 0"]);
		assert_eq!(sim.close_count(), 1);
	}

	#[test]
	fn drop_disables_output() {
		let sim = SimulatedInstrument::new();
		{
			let mut cs = source(&sim);
			cs.enable_output(true).unwrap();
		}
		assert_eq!(sim.written().last().map(String::as_str), Some("LASER:OUTPUT 0"));
		assert!(sim.is_closed());
	}

	#[test]
	fn closed_source_rejects_commands() {
		let sim = SimulatedInstrument::new();
		let mut cs = source(&sim);
		cs.close().unwrap();
		assert!(matches!(cs.set_output_current(10.0), Err(Error::Closed)));
	}
}
