// Connection adapter: bus resources, link parameters and the Session owning one open connection

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::reply;

pub mod serial;
pub mod sim;
pub mod vxi11;

pub use self::serial::SerialTransport;
pub use self::sim::SimulatedInstrument;
pub use self::vxi11::Vxi11Transport;

/// Where an instrument lives. Passed through from configuration as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bus", rename_all = "lowercase")]
pub enum Resource {
	/// A GPIB instrument behind a VXI-11 LAN/GPIB gateway.
	Gpib { gateway: String, #[serde(default)] board: u8, address: u8 },
	/// An instrument speaking VXI-11 itself.
	Tcpip { host: String, #[serde(default = "default_device")] device: String },
	/// An RS-232 port such as `/dev/ttyUSB0` or `COM5`.
	Serial { port: String },
}

fn default_device() -> String { "inst0".to_owned() }

impl Resource {
	pub fn gpib(gateway:&str, address:u8) -> Self {
		Resource::Gpib{ gateway: gateway.to_owned(), board: 0, address }
	}

	pub fn serial(port:&str) -> Self {
		Resource::Serial{ port: port.to_owned() }
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Resource::Gpib{ gateway, board, address } => write!(f, "GPIB{}::{}::INSTR via {}", board, address, gateway),
			Resource::Tcpip{ host, device }          => write!(f, "TCPIP::{}::{}::INSTR", host, device),
			Resource::Serial{ port }                 => write!(f, "ASRL::{}::INSTR", port),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity { None, Odd, Even }

/// Static link parameters. VXI-11 links only use the terminations and the timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
	pub baud_rate: u32,
	pub data_bits: u8,
	pub parity: Parity,
	pub stop_bits: u8,
	pub write_termination: String,
	pub read_termination: String,
	pub timeout_ms: u64,
}

impl Default for LinkSettings {
	fn default() -> Self {
		LinkSettings {
			baud_rate: 9600,
			data_bits: 8,
			parity: Parity::None,
			stop_bits: 1,
			write_termination: "\n".to_owned(),
			read_termination: "\n".to_owned(),
			timeout_ms: 2000,
		}
	}
}

impl LinkSettings {
	pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

/// One open byte channel to an instrument.
///
/// `read` returns exactly one reply message. Implementations report a silent
/// instrument as [`Error::Timeout`].
pub trait Transport {
	fn write(&mut self, data:&[u8]) -> Result<()>;
	fn read(&mut self) -> Result<Vec<u8>>;
	fn close(&mut self) -> Result<()>;
}

pub struct Session {
	resource: String,
	settings: LinkSettings,
	transport: Option<Box<dyn Transport>>,
}

impl Session {

	/// Opens the bus resource. Failure to reach it is reported as [`Error::Connection`].
	pub fn open(resource:&Resource, settings:&LinkSettings) -> Result<Self> {
		let opened:Result<Box<dyn Transport>> = match resource {
			Resource::Gpib{ gateway, board, address } => {
				let device = format!("gpib{},{}", board, address);
				Vxi11Transport::open(gateway, &device, settings).map(|t| Box::new(t) as Box<dyn Transport>)
			},
			Resource::Tcpip{ host, device } => Vxi11Transport::open(host, device, settings).map(|t| Box::new(t) as Box<dyn Transport>),
			Resource::Serial{ port } => SerialTransport::open(port, settings).map(|t| Box::new(t) as Box<dyn Transport>),
		};
		let transport = opened.map_err(|e| Error::Connection{ resource: resource.to_string(), reason: e.to_string() })?;

		info!("Opened {}", resource);
		Ok(Self::with_transport(&resource.to_string(), settings.clone(), transport))
	}

	/// Wraps an already open transport, e.g. a [`SimulatedInstrument`].
	pub fn with_transport(resource:&str, settings:LinkSettings, transport:Box<dyn Transport>) -> Self {
		Session{ resource: resource.to_owned(), settings, transport: Some(transport) }
	}

	pub fn resource(&self) -> &str { &self.resource }

	pub fn settings(&self) -> &LinkSettings { &self.settings }

	pub fn is_open(&self) -> bool { self.transport.is_some() }

	fn transport(&mut self) -> Result<&mut Box<dyn Transport>> {
		self.transport.as_mut().ok_or(Error::Closed)
	}

	/// Sends the identity query and returns the reply. Any failure, including a
	/// timeout or an empty reply, is a connection failure. No retries.
	pub fn handshake(&mut self, query:&str) -> Result<String> {
		let resource = self.resource.clone();
		let fail = |reason:String| Error::Connection{ resource: resource.clone(), reason };

		let id = self.query(query).map_err(|e| fail(format!("identity query {:?} failed: {}", query, e)))?;
		if id.is_empty() {
			return Err(fail(format!("empty reply to identity query {:?}", query)));
		}

		info!("Communications established with {}", id);
		Ok(id)
	}

	pub fn write(&mut self, cmd:&str) -> Result<()> {
		let mut data:Vec<u8> = Vec::with_capacity(cmd.len() + self.settings.write_termination.len());
		data.extend_from_slice(cmd.as_bytes());
		data.extend_from_slice(self.settings.write_termination.as_bytes());

		debug!("[{}] << {}", self.resource, cmd);
		self.transport()?.write(&data)
	}

	/// Writes `cmd` and returns the single-line reply with line endings trimmed.
	pub fn query(&mut self, cmd:&str) -> Result<String> {
		self.write(cmd)?;
		let raw = self.transport()?.read()?;
		let res = String::from_utf8(raw)
			.map_err(|e| Error::malformed(cmd, &String::from_utf8_lossy(e.as_bytes())))?;

		let res = res.trim().to_owned();
		debug!("[{}] >> {}", self.resource, res);
		Ok(res)
	}

	pub fn query_value(&mut self, cmd:&str) -> Result<f64> {
		let res = self.query(cmd)?;
		reply::parse_value(cmd, &res)
	}

	pub fn query_values(&mut self, cmd:&str) -> Result<Vec<f64>> {
		let res = self.query(cmd)?;
		reply::parse_values(cmd, &res)
	}

	/// Releases the connection. Calling it again is a no-op.
	pub fn close(&mut self) -> Result<()> {
		match self.transport.take() {
			Some(mut t) => {
				info!("Closing {}", self.resource);
				t.close()
			},
			None => Ok(()),
		}
	}

}

impl Drop for Session {
	fn drop(&mut self) {
		if let Err(e) = self.close() {
			warn!("Error while closing {}: {}", self.resource, e);
		}
	}
}
