// Error type shared by every driver; socket and serial timeouts always surface as Error::Timeout

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("Unable to connect to {resource}: {reason}")]
	Connection { resource: String, reason: String },

	#[error("Invalid setting: {0}")]
	InvalidSetting(String),

	#[error("Timed out waiting for the instrument")]
	Timeout,

	#[error("Malformed reply to {command:?}: {reply:?}")]
	MalformedReply { command: String, reply: String },

	#[error("Session already closed")]
	Closed,

	#[error("VXI-11 error: {0}")]
	Vxi11(String),

	#[error("RPC error: {0}")]
	Rpc(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Serial port error: {0}")]
	Serial(#[from] serialport::Error),

	#[error("Trace output error: {0}")]
	Csv(#[from] csv::Error),

	#[error("I/O error: {0}")]
	Io(#[source] io::Error),
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		match e.kind() {
			io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout,
			_ => Error::Io(e),
		}
	}
}

impl Error {
	pub(crate) fn malformed(command: &str, reply: &str) -> Self {
		Error::MalformedReply { command: command.to_owned(), reply: reply.to_owned() }
	}

	/// True for failures where the instrument never answered.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout)
	}
}
