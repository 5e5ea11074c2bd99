// GPIB through a LAN/GPIB gateway, or a LAN instrument, over the VXI-11 core channel

use crate::error::Result;
use crate::vxi11::CoreClient;

use super::{LinkSettings, Transport};

pub struct Vxi11Transport {
	core: CoreClient,
}

impl Vxi11Transport {

	/// Connects to `host` and creates a link to `device` (`inst0`, `gpib0,3`, ...).
	pub fn open(host:&str, device:&str, settings:&LinkSettings) -> Result<Self> {
		let mut core = CoreClient::new(host, settings.timeout())?;
		core.set_term_char(settings.read_termination.bytes().last());
		core.create_link(device)?;
		Ok(Self{ core })
	}

}

impl Transport for Vxi11Transport {

	fn write(&mut self, data:&[u8]) -> Result<()> { self.core.write(data) }

	fn read(&mut self) -> Result<Vec<u8>> { self.core.read() }

	fn close(&mut self) -> Result<()> {
		if self.core.is_linked() { self.core.destroy_link() }
		else { Ok(()) }
	}

}
