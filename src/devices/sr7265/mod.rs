// Signal Recovery 7265 DSP lock-in amplifier on GPIB

use log::info;

use crate::bus::{LinkSettings, Resource, Session};
use crate::error::{Error, Result};
use crate::reply;

pub mod tables;

pub use self::tables::{AcGain, Coupling, Imode, InputDevice, InputShield, Sensitivity, Vmode};

pub const ID_QUERY:&str = "ID?";
pub const DEFAULT_GPIB_ADDRESS:u8 = 10;

pub struct SR7265 {
	session: Session,
	id: String,
}

impl SR7265 {

	pub fn default_link_settings() -> LinkSettings { LinkSettings::default() }

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

	pub fn id(&mut self) -> Result<String> { self.session.query(ID_QUERY) }

	pub fn close(&mut self) -> Result<()> {
		if self.session.is_open() { info!("Closing lock-in amplifier"); }
		self.session.close()
	}

	fn query_code(&mut self, cmd:&str) -> Result<u8> {
		let res = self.session.query(cmd)?;
		reply::parse_code(cmd, &res)
	}

	// Signal channel

	pub fn set_imode(&mut self, imode:Imode) -> Result<()> {
		self.session.write(&format!("IMODE {}", imode.code()))
	}

	pub fn imode(&mut self) -> Result<Imode> {
		let code = self.query_code("IMODE")?;
		Imode::from_code(code).ok_or_else(|| Error::malformed("IMODE", &code.to_string()))
	}

	/// Voltage input mode. Only takes effect while the current mode is [`Imode::Off`].
	pub fn set_vmode(&mut self, vmode:Vmode) -> Result<()> {
		self.session.write(&format!("VMODE {}", vmode.code()))
	}

	pub fn vmode(&mut self) -> Result<Vmode> {
		let code = self.query_code("VMODE")?;
		Vmode::from_code(code).ok_or_else(|| Error::malformed("VMODE", &code.to_string()))
	}

	pub fn set_input_device(&mut self, device:InputDevice) -> Result<()> {
		self.session.write(&format!("FET {}", device.code()))
	}

	pub fn set_input_shield(&mut self, shield:InputShield) -> Result<()> {
		self.session.write(&format!("FLOAT {}", shield.code()))
	}

	pub fn set_coupling(&mut self, coupling:Coupling) -> Result<()> {
		self.session.write(&format!("CP {}", coupling.code()))
	}

	/// Signal magnitude in V or A, depending on the input mode.
	pub fn magnitude(&mut self) -> Result<f64> { self.session.query_value("MAG.") }

	/// Reads the input mode, then selects `sensitivity` if it exists in that mode.
	/// A step that doesn't exist in the current mode is rejected without sending `SEN`.
	pub fn set_sensitivity(&mut self, sensitivity:Sensitivity) -> Result<()> {
		let imode = self.imode()?;
		if !sensitivity.is_available(imode) {
			return Err(Error::InvalidSetting(format!("sensitivity {} is not available in current mode {:?}", sensitivity.record().name, imode)));
		}
		self.session.write(&format!("SEN {}", sensitivity.code()))
	}

	/// Adjusts the sensitivity so the magnitude sits between 30% and 90% of full scale.
	pub fn set_sensitivity_auto(&mut self) -> Result<()> { self.session.write("AS") }

	/// Full-scale sensitivity in V or A, depending on the input mode.
	pub fn sensitivity(&mut self) -> Result<f64> { self.session.query_value("SEN.") }

	/// Auto-sensitivity followed by auto-phase, maximising X and minimising Y.
	pub fn auto_measure(&mut self) -> Result<()> { self.session.write("ASM") }

	pub fn set_ac_gain(&mut self, gain:AcGain) -> Result<()> {
		self.session.write(&format!("ACGAIN {}", gain.code()))
	}

	/// AC gain in dB.
	pub fn ac_gain(&mut self) -> Result<u8> {
		let code = self.query_code("ACGAIN")?;
		AcGain::from_code(code)
			.map(AcGain::gain_db)
			.ok_or_else(|| Error::malformed("ACGAIN", &code.to_string()))
	}

	pub fn enable_auto_gain(&mut self, enable:bool) -> Result<()> {
		self.session.write(&format!("AUTOMATIC {}", enable as u8))
	}

	/// Output filter time constant in s.
	pub fn time_constant(&mut self) -> Result<f64> { self.session.query_value("TC.") }

}

// Implemented
// ID		Identification
// IMODE	Current input mode, set and query
// VMODE	Voltage input mode, set and query
// FET		Voltage input device
// FLOAT	Input connector shield
// CP		Input coupling
// MAG.		Magnitude
// SEN		Sensitivity, checked against the input mode
// SEN.		Full-scale sensitivity
// AS		Auto-sensitivity
// ASM		Auto-measure
// ACGAIN	AC gain, set and query
// AUTOMATIC	AC gain automatic control
// TC.		Time constant
