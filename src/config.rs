// Station configuration: the bus resource of each instrument plus link overrides (see station.example.toml)

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::bus::{LinkSettings, Parity, Resource};
use crate::error::{Error, Result};

/// Link parameters given in the file; anything left out keeps the driver default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkOverrides {
	pub baud_rate: Option<u32>,
	pub data_bits: Option<u8>,
	pub parity: Option<Parity>,
	pub stop_bits: Option<u8>,
	pub write_termination: Option<String>,
	pub read_termination: Option<String>,
	pub timeout_ms: Option<u64>,
}

impl LinkOverrides {
	pub fn apply(&self, mut base:LinkSettings) -> LinkSettings {
		if let Some(x) = self.baud_rate { base.baud_rate = x; }
		if let Some(x) = self.data_bits { base.data_bits = x; }
		if let Some(x) = self.parity { base.parity = x; }
		if let Some(x) = self.stop_bits { base.stop_bits = x; }
		if let Some(x) = &self.write_termination { base.write_termination = x.clone(); }
		if let Some(x) = &self.read_termination { base.read_termination = x.clone(); }
		if let Some(x) = self.timeout_ms { base.timeout_ms = x; }
		base
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
	pub resource: Resource,
	#[serde(default)]
	pub link: LinkOverrides,
}

impl InstrumentConfig {
	pub fn link_settings(&self, defaults:LinkSettings) -> LinkSettings { self.link.apply(defaults) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
	pub spectrum_analyzer: Option<InstrumentConfig>,
	pub current_source: Option<InstrumentConfig>,
	pub lock_in: Option<InstrumentConfig>,
}

impl StationConfig {
	pub fn load<P: AsRef<Path>>(path:P) -> Result<Self> {
		let path = path.as_ref();
		let text = fs::read_to_string(path)
			.map_err(|e| Error::Config(format!("unable to read {}: {}", path.display(), e)))?;
		text.parse()
	}
}

impl FromStr for StationConfig {
	type Err = Error;

	fn from_str(s:&str) -> Result<Self> {
		toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
	}
}
