// ONC RPC client over a TCP stream

use std::io::{self, Read, Write, Error, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};

use crate::xdr;
use super::{xdr_pack, xdr_unpack};

const LAST_FRAGMENT:u32 = 0x8000_0000;

// Largest reply accepted: a full VXI-11 read chunk plus headers
const MAX_RECORD_SIZE:usize = 0x10000 + 0x100;

fn connect_any<A: ToSocketAddrs>(addr: A, timeout: Duration) -> io::Result<TcpStream> {
	let mut last_err = Error::new(ErrorKind::InvalidInput, "Address resolved to nothing");
	for a in addr.to_socket_addrs()? {
		match TcpStream::connect_timeout(&a, timeout) {
			Ok(stream) => return Ok(stream),
			Err(e) => last_err = e,
		}
	}
	Err(last_err)
}

/// An RPC client over TCP using record marking (RFC 5531 section 11).
pub struct TcpClient {
	stream: TcpStream,
	prog: u32,
	vers: u32,
	lastxid: u32,
	pub packer: xdr::Packer,
	pub unpacker: xdr::Unpacker,
}

impl TcpClient {

	/// With a timeout, it bounds the connection attempt as well as every read and write.
	pub fn connect<A: ToSocketAddrs>(addr: A, prog: u32, vers: u32, timeout: Option<Duration>) -> io::Result<Self> {
		let stream = match timeout {
			Some(t) => connect_any(addr, t)?,
			None    => TcpStream::connect(addr)?,
		};
		stream.set_read_timeout(timeout)?;
		stream.set_write_timeout(timeout)?;
		stream.set_nodelay(true)?;
		Ok(Self{ stream, prog, vers, lastxid: 0, packer: xdr::Packer::new(), unpacker: xdr::Unpacker::new() })
	}

	/// Clears the packer and writes a call header; arguments are packed after this returns.
	pub fn start_call(&mut self, prc:u32) -> io::Result<()> {
		self.lastxid = self.lastxid.wrapping_add(1);
		self.packer.reset();
		xdr_pack::pack_callheader_no_auth(&mut self.packer, self.lastxid, self.prog, self.vers, prc)
	}

	/// Sends the packed call and loads the matching reply body into the unpacker.
	pub fn do_call(&mut self) -> io::Result<()> {
		let call:&[u8] = self.packer.as_bytes();
		let header:u32 = call.len() as u32 | LAST_FRAGMENT;

		let mut send_bytes:Vec<u8> = Vec::with_capacity(call.len() + 4);
		send_bytes.write_u32::<BigEndian>(header)?;
		send_bytes.extend_from_slice(call);
		self.stream.write_all(&send_bytes)?;

		loop {
			let reply = self.read_record()?;
			self.unpacker.reset(&reply);

			let xid = xdr_unpack::unpack_replyheader(&mut self.unpacker)?;
			if xid == self.lastxid {
				return Ok(());
			} else if xid < self.lastxid {
				// Stale reply to an earlier call that timed out on our side
				continue;
			} else {
				return Err(Error::new(ErrorKind::InvalidData, "Reply xid is ahead of the last call"));
			}
		}
	}

	fn read_record(&mut self) -> io::Result<Vec<u8>> {
		let mut reply:Vec<u8> = vec![];

		let mut last:bool = false;
		while !last {
			let x:u32 = self.stream.read_u32::<BigEndian>()?;
			last = (x & LAST_FRAGMENT) != 0;

			let n = (x & !LAST_FRAGMENT) as usize;
			let start = reply.len();
			if start + n > MAX_RECORD_SIZE {
				return Err(Error::new(ErrorKind::InvalidData, "Record mark exceeds the largest expected reply"));
			}
			reply.resize(start + n, 0);
			self.stream.read_exact(&mut reply[start..])?;
		}

		Ok(reply)
	}

}

#[cfg(test)]
mod tests {
	use std::time::Instant;

	use super::*;
	use crate::rpc::PROG_UNAVAIL;
	use crate::rpc::fake_server::{FakeServer, Reply, words};

	const PROG:u32 = 0x0607af;

	fn client(server:&FakeServer) -> TcpClient {
		TcpClient::connect(("127.0.0.1", server.port), PROG, 1, Some(Duration::from_secs(2))).unwrap()
	}

	#[test]
	fn reply_body_lands_in_unpacker() {
		let server = FakeServer::start(vec![vec![Reply::ok(&words(&[5, -6]))]]);
		let mut c = client(&server);

		c.start_call(11).unwrap();
		c.packer.pack_u32(99).unwrap();
		c.do_call().unwrap();
		assert_eq!(c.unpacker.unpack_i32().unwrap(), 5);
		assert_eq!(c.unpacker.unpack_i32().unwrap(), -6);
		assert!(c.unpacker.all_data_consumed());

		let calls = server.finish();
		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].procedure, 11);
		assert_eq!(calls[0].args, 99u32.to_be_bytes().to_vec());
	}

	#[test]
	fn stale_replies_are_skipped() {
		let server = FakeServer::start(vec![vec![Reply::stale(&words(&[1])), Reply::ok(&words(&[2]))]]);
		let mut c = client(&server);

		c.start_call(12).unwrap();
		c.do_call().unwrap();
		assert_eq!(c.unpacker.unpack_i32().unwrap(), 2);
		server.finish();
	}

	#[test]
	fn rejected_call_is_an_error() {
		let server = FakeServer::start(vec![vec![Reply::rejected(PROG_UNAVAIL)]]);
		let mut c = client(&server);

		c.start_call(10).unwrap();
		assert_eq!(c.do_call().unwrap_err().to_string(), "Program unavailable");
		server.finish();
	}

	#[test]
	fn oversized_record_mark_is_refused() {
		let server = FakeServer::start(vec![vec![Reply::Raw(vec![0xff, 0xff, 0xff, 0xf0])]]);
		let mut c = client(&server);

		c.start_call(12).unwrap();
		assert_eq!(c.do_call().unwrap_err().kind(), ErrorKind::InvalidData);
		server.finish();
	}

	#[test]
	fn connect_gives_up_within_the_timeout() {
		// Non-routable address; either refused outright or abandoned at the timeout
		let t0 = Instant::now();
		let res = TcpClient::connect(("10.255.255.1", 111), PROG, 1, Some(Duration::from_millis(300)));
		assert!(res.is_err());
		assert!(t0.elapsed() < Duration::from_secs(5));
	}
}
