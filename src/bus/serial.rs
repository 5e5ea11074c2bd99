// RS-232 instruments through the serialport crate

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use log::debug;
use serialport::{DataBits, SerialPort, StopBits};

use crate::error::{Error, Result};

use super::{LinkSettings, Parity, Transport};

// Granularity of the polling reads; the overall deadline comes from LinkSettings
const POLL_INTERVAL:Duration = Duration::from_millis(50);

pub struct SerialTransport {
	port: Option<Box<dyn SerialPort>>,
	read_termination: Vec<u8>,
	timeout: Duration,
}

fn data_bits(n:u8) -> Result<DataBits> {
	match n {
		5 => Ok(DataBits::Five),
		6 => Ok(DataBits::Six),
		7 => Ok(DataBits::Seven),
		8 => Ok(DataBits::Eight),
		_ => Err(Error::InvalidSetting(format!("{} data bits", n))),
	}
}

fn stop_bits(n:u8) -> Result<StopBits> {
	match n {
		1 => Ok(StopBits::One),
		2 => Ok(StopBits::Two),
		_ => Err(Error::InvalidSetting(format!("{} stop bits", n))),
	}
}

// Reads only end at the terminator, so without one every query would time out
fn check_read_termination(settings:&LinkSettings) -> Result<()> {
	if settings.read_termination.is_empty() {
		return Err(Error::InvalidSetting("serial links need a read termination".to_owned()));
	}
	Ok(())
}

impl From<Parity> for serialport::Parity {
	fn from(p:Parity) -> Self {
		match p {
			Parity::None => serialport::Parity::None,
			Parity::Odd  => serialport::Parity::Odd,
			Parity::Even => serialport::Parity::Even,
		}
	}
}

impl SerialTransport {

	pub fn open(port_name:&str, settings:&LinkSettings) -> Result<Self> {
		check_read_termination(settings)?;
		let port = serialport::new(port_name, settings.baud_rate)
			.data_bits(data_bits(settings.data_bits)?)
			.parity(settings.parity.into())
			.stop_bits(stop_bits(settings.stop_bits)?)
			.open()?;

		debug!("Serial port {} opened at {} baud", port_name, settings.baud_rate);
		Self::with_port(port, settings)
	}

	/// Wraps a port that is already open and configured; only the terminations and timeout are applied.
	pub fn with_port(mut port:Box<dyn SerialPort>, settings:&LinkSettings) -> Result<Self> {
		check_read_termination(settings)?;
		port.set_timeout(POLL_INTERVAL.min(settings.timeout()))?;
		Ok(Self{ port: Some(port), read_termination: settings.read_termination.as_bytes().to_vec(), timeout: settings.timeout() })
	}

	fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
		self.port.as_mut().ok_or(Error::Closed)
	}

}

impl Transport for SerialTransport {

	fn write(&mut self, data:&[u8]) -> Result<()> {
		let port = self.port()?;
		port.write_all(data)?;
		port.flush()?;
		Ok(())
	}

	fn read(&mut self) -> Result<Vec<u8>> {
		let deadline = Instant::now() + self.timeout;
		let term = self.read_termination.clone();
		let port = self.port()?;

		let mut ans:Vec<u8> = vec![];
		let mut buff = [0u8; 256];
		loop {
			if ans.ends_with(&term) {
				ans.truncate(ans.len() - term.len());
				return Ok(ans);
			}
			if Instant::now() >= deadline {
				return Err(Error::Timeout);
			}

			match port.read(&mut buff) {
				Ok(0) => { },
				Ok(n) => ans.extend_from_slice(&buff[..n]),
				Err(e) if e.kind() == io::ErrorKind::TimedOut => { },
				Err(e) => return Err(e.into()),
			}
		}
	}

	fn close(&mut self) -> Result<()> {
		// Dropping the handle releases the port
		self.port = None;
		Ok(())
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frame_parameters() {
		assert_eq!(data_bits(8).unwrap(), DataBits::Eight);
		assert_eq!(stop_bits(1).unwrap(), StopBits::One);
		assert!(matches!(data_bits(9), Err(Error::InvalidSetting(_))));
		assert!(matches!(stop_bits(3), Err(Error::InvalidSetting(_))));
		assert_eq!(serialport::Parity::from(Parity::None), serialport::Parity::None);
	}

	#[test]
	fn empty_read_termination_is_rejected_before_opening() {
		let settings = LinkSettings{ read_termination: String::new(), ..LinkSettings::default() };
		assert!(matches!(SerialTransport::open("/dev/nonexistent-serial", &settings), Err(Error::InvalidSetting(_))));
	}

	#[cfg(unix)]
	mod pty {
		use std::thread;

		use serialport::TTYPort;

		use super::*;

		fn settings(read_termination:&str, timeout_ms:u64) -> LinkSettings {
			LinkSettings{ read_termination: read_termination.to_owned(), timeout_ms, ..LinkSettings::default() }
		}

		fn pair(settings:&LinkSettings) -> (TTYPort, SerialTransport) {
			let (master, slave) = TTYPort::pair().unwrap();
			(master, SerialTransport::with_port(Box::new(slave), settings).unwrap())
		}

		#[test]
		fn reply_is_returned_without_terminator() {
			let (mut master, mut t) = pair(&settings("\n", 1000));
			master.write_all(b"2.5\n").unwrap();
			assert_eq!(t.read().unwrap(), b"2.5".to_vec());
		}

		#[test]
		fn multi_byte_terminator() {
			let (mut master, mut t) = pair(&settings("\r\n", 1000));
			master.write_all(b"Arroyo,4302,1,1.0\r\n").unwrap();
			assert_eq!(t.read().unwrap(), b"Arroyo,4302,1,1.0".to_vec());
		}

		#[test]
		fn reply_split_across_reads() {
			let (mut master, mut t) = pair(&settings("\n", 2000));
			let writer = thread::spawn(move || {
				master.write_all(b"1.2").unwrap();
				thread::sleep(Duration::from_millis(150));
				master.write_all(b"5\n").unwrap();
				master
			});
			assert_eq!(t.read().unwrap(), b"1.25".to_vec());
			writer.join().unwrap();
		}

		#[test]
		fn silent_port_times_out_at_the_deadline() {
			let (_master, mut t) = pair(&settings("\n", 200));
			let t0 = Instant::now();
			assert!(t.read().unwrap_err().is_timeout());
			assert!(t0.elapsed() >= Duration::from_millis(200));
		}

		#[test]
		fn unterminated_reply_times_out() {
			let (mut master, mut t) = pair(&settings("\n", 200));
			master.write_all(b"2.5").unwrap();
			assert!(t.read().unwrap_err().is_timeout());
		}

		#[test]
		fn writes_reach_the_other_end() {
			let (mut master, mut t) = pair(&settings("\n", 1000));
			t.write(b"LASER:LDV?\n").unwrap();

			let mut buff = [0u8; 11];
			master.read_exact(&mut buff).unwrap();
			assert_eq!(&buff, b"LASER:LDV?\n");
		}

		#[test]
		fn closed_port_refuses_io() {
			let (_master, mut t) = pair(&settings("\n", 200));
			t.close().unwrap();
			assert!(matches!(t.write(b"X\n"), Err(Error::Closed)));
			assert!(matches!(t.read(), Err(Error::Closed)));
		}

		#[test]
		fn empty_read_termination_is_rejected_on_wrap() {
			let (_master, slave) = TTYPort::pair().unwrap();
			assert!(matches!(SerialTransport::with_port(Box::new(slave), &settings("", 200)), Err(Error::InvalidSetting(_))));
		}
	}
}
