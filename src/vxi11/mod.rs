// VXI-11 core channel: the RPC program LAN instruments and LAN/GPIB gateways expose

// Device core
pub const DEVICE_CORE_PROG:u32  = 0x0607af;
pub const DEVICE_CORE_VERS:u32  = 1;
pub const CREATE_LINK:u32       = 10;
pub const DEVICE_WRITE:u32      = 11;
pub const DEVICE_READ:u32       = 12;
pub const DESTROY_LINK:u32      = 23;

pub const CLIENT_ID:i32 = 3333;
pub const DEFAULT_LOCK_TIMEOUT:u32 = 10000;
pub const READ_CHUNK_SIZE:u32 = 0x10000;

pub const OPERATION_FLAGS_END_ONLY:i32 = 8;
pub const OPERATION_FLAGS_TERMCHR_SET:i32 = 128;

pub const REASON_REQCNT:i32 = 1;
pub const REASON_CHR:i32    = 2;
pub const REASON_END:i32    = 4;

use std::io;
use std::time::Duration;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::rpc::port_mapping::{TcpPortMapperClient, Mapping};
use crate::rpc::tcp_clients::TcpClient;

pub mod xdr_pack;

fn err(msg:&str) -> Error { Error::Vxi11(msg.to_owned()) }

// Protocol failures from the RPC layer; socket errors and timeouts keep their own variants
fn rpc_error(e:io::Error) -> Error {
	match e.kind() {
		io::ErrorKind::Other | io::ErrorKind::InvalidData | io::ErrorKind::NotFound | io::ErrorKind::UnexpectedEof => Error::Rpc(e.to_string()),
		_ => e.into(),
	}
}

// Device error codes from the VXI-11 specification, table B.2
fn device_error(code:i32) -> Result<()> {
	match code {
		0  => Ok(()),
		1  => Err(err("Syntax error")),
		3  => Err(err("Device not accessible")),
		4  => Err(err("Invalid link identifier")),
		5  => Err(err("Parameter error")),
		6  => Err(err("Channel not established")),
		8  => Err(err("Operation not supported")),
		9  => Err(err("Out of resources")),
		11 => Err(err("Device locked by another link")),
		12 => Err(err("No lock held by this link")),
		15 => Err(Error::Timeout),
		17 => Err(err("I/O error")),
		21 => Err(err("Invalid address")),
		23 => Err(err("Abort")),
		29 => Err(err("Channel already established")),
		_  => Err(Error::Vxi11(format!("Unknown device error {}", code))),
	}
}

pub struct CoreClient {
	client: TcpClient,
	opt_link: Option<Link>,
	io_timeout_ms: u32,
	term_char: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct Link {
	pub link_id: i32,
	pub max_recv_size: u32,
}

impl CoreClient {

	fn get_link(&self) -> Result<Link> {
		self.opt_link.ok_or_else(|| err("No link"))
	}

	fn call(&mut self) -> Result<()> { self.client.do_call().map_err(rpc_error) }

	fn next_i32(&mut self) -> Result<i32> { self.client.unpacker.unpack_i32().map_err(rpc_error) }

	fn next_u32(&mut self) -> Result<u32> { self.client.unpacker.unpack_u32().map_err(rpc_error) }

	/// Connects to the core channel of `host`, looking its port up through the portmapper.
	///
	/// The socket timeout is a little longer than the device timeout so that the
	/// instrument gets a chance to report its own I/O timeout first.
	pub fn new(host:&str, io_timeout:Duration) -> Result<Self> {
		let socket_timeout = Some(io_timeout + Duration::from_secs(1));

		let mut pmap_client = TcpPortMapperClient::new(host, socket_timeout)?;
		let mapping = Mapping {
			program: DEVICE_CORE_PROG,
			version: DEVICE_CORE_VERS,
			port: 0,
		};
		let port = pmap_client.get_port(&mapping).map_err(rpc_error)?;
		debug!("{} serves the VXI-11 core channel on port {}", host, port);

		Self::with_port(host, port, io_timeout)
	}

	/// Connects to a core channel whose port is already known.
	pub fn with_port(host:&str, port:u16, io_timeout:Duration) -> Result<Self> {
		let socket_timeout = Some(io_timeout + Duration::from_secs(1));
		let client = TcpClient::connect((host, port), DEVICE_CORE_PROG, DEVICE_CORE_VERS, socket_timeout)?;
		let io_timeout_ms = u32::try_from(io_timeout.as_millis()).unwrap_or(u32::MAX);

		Ok(CoreClient{ client, opt_link: None, io_timeout_ms, term_char: None })
	}

	/// Stops reads at this byte in addition to END.
	pub fn set_term_char(&mut self, term_char:Option<u8>) { self.term_char = term_char; }

	pub fn is_linked(&self) -> bool { self.opt_link.is_some() }

	pub fn create_link(&mut self, device:&str) -> Result<()> {
		if self.opt_link.is_some() {
			return Err(err("Already connected to a link"));
		}

		self.client.start_call(CREATE_LINK)?;
		xdr_pack::pack_create_link_parms(&mut self.client.packer, CLIENT_ID, false, DEFAULT_LOCK_TIMEOUT, device)?;
		self.call()?;

		let error:i32         = self.next_i32()?;
		let link_id:i32       = self.next_i32()?;
		let _abort_port:u32   = self.next_u32()?;
		let max_recv_size:u32 = self.next_u32()?;

		device_error(error)?;

		self.opt_link = Some(Link{ link_id, max_recv_size });
		info!("Created VXI-11 link {} to device {:?}", link_id, device);
		Ok(())
	}

	pub fn write(&mut self, data:&[u8]) -> Result<()> {
		let link = self.get_link()?;
		if data.len() as u64 > link.max_recv_size as u64 {
			return Err(err("Command longer than the device's receive buffer"));
		}

		self.client.start_call(DEVICE_WRITE)?;
		xdr_pack::pack_device_write_parms(&mut self.client.packer, link.link_id, self.io_timeout_ms, DEFAULT_LOCK_TIMEOUT, OPERATION_FLAGS_END_ONLY, data)?;
		self.call()?;

		let error:i32 = self.next_i32()?;
		let size:u32  = self.next_u32()?;

		device_error(error)?;
		if size as usize != data.len() {
			return Err(err("Number of bytes in confirmation doesn't match number of bytes sent"));
		}
		Ok(())
	}

	/// Reads one complete response, following up on partial reads until END or the term char.
	pub fn read(&mut self) -> Result<Vec<u8>> {
		let link = self.get_link()?;
		let (flags, term_char) = match self.term_char {
			Some(c) => (OPERATION_FLAGS_TERMCHR_SET, c as i32),
			None    => (0, 0),
		};

		let mut ans:Vec<u8> = vec![];
		loop {
			self.client.start_call(DEVICE_READ)?;
			xdr_pack::pack_device_read_parms(&mut self.client.packer, link.link_id, READ_CHUNK_SIZE, self.io_timeout_ms, DEFAULT_LOCK_TIMEOUT, flags, term_char)?;
			self.call()?;

			let error:i32    = self.next_i32()?;
			let reason:i32   = self.next_i32()?;
			let data:Vec<u8> = self.client.unpacker.unpack_variable_len_opaque().map_err(rpc_error)?;

			device_error(error)?;
			ans.extend_from_slice(&data);

			if reason & (REASON_END | REASON_CHR) != 0 {
				return Ok(ans);
			} else if reason & REASON_REQCNT == 0 {
				return Err(err("Expected one of the three reason bits to be set"));
			}
		}
	}

	pub fn destroy_link(&mut self) -> Result<()> {
		let link = self.get_link()?;

		self.client.start_call(DESTROY_LINK)?;
		xdr_pack::pack_device_link(&mut self.client.packer, link.link_id)?;
		self.call()?;

		// The link is gone on our side whatever the device says
		self.opt_link = None;
		device_error(self.next_i32()?)
	}

}
