// Scripted ONC RPC server on a loopback socket, for exercising the TCP clients

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::xdr::{Packer, Unpacker};
use super::{REPLY, MSG_ACCEPTED, SUCCESS};

// xid, message type, rpc version, program, version, procedure, two empty AUTH_NONE blocks
const CALL_HEADER_LEN:usize = 40;

/// One thing the server sends back after receiving a call.
pub enum Reply {
	/// An accepted reply; `stale` answers with the xid before the caller's.
	Accepted { stale: bool, accept_stat: i32, body: Vec<u8> },
	/// Bytes written to the socket as-is, record mark included.
	Raw(Vec<u8>),
}

impl Reply {
	pub fn ok(body:&Packer) -> Self {
		Reply::Accepted{ stale: false, accept_stat: SUCCESS, body: body.as_bytes().to_vec() }
	}

	pub fn stale(body:&Packer) -> Self {
		Reply::Accepted{ stale: true, accept_stat: SUCCESS, body: body.as_bytes().to_vec() }
	}

	pub fn rejected(accept_stat:i32) -> Self {
		Reply::Accepted{ stale: false, accept_stat, body: vec![] }
	}
}

/// A call as the server received it.
pub struct Call {
	pub procedure: u32,
	pub args: Vec<u8>,
}

pub struct FakeServer {
	pub port: u16,
	handle: JoinHandle<Vec<Call>>,
}

fn read_record(stream:&mut TcpStream) -> Option<Vec<u8>> {
	let mark = stream.read_u32::<BigEndian>().ok()?;
	let mut ans = vec![0u8; (mark & 0x7fff_ffff) as usize];
	stream.read_exact(&mut ans).ok()?;
	Some(ans)
}

fn write_reply(stream:&mut TcpStream, xid:u32, reply:&Reply) {
	let bytes = match reply {
		Reply::Raw(bytes) => bytes.clone(),
		Reply::Accepted{ stale, accept_stat, body } => {
			let mut p = Packer::new();
			p.pack_u32(if *stale { xid.wrapping_sub(1) } else { xid }).unwrap();
			p.pack_enum(REPLY).unwrap();
			p.pack_enum(MSG_ACCEPTED).unwrap();
			p.pack_enum(0).unwrap();
			p.pack_variable_len_opaque(&[]).unwrap();
			p.pack_enum(*accept_stat).unwrap();

			let mut record = vec![];
			record.write_u32::<BigEndian>(0x8000_0000 | (p.as_bytes().len() + body.len()) as u32).unwrap();
			record.extend_from_slice(p.as_bytes());
			record.extend_from_slice(body);
			record
		},
	};
	stream.write_all(&bytes).unwrap();
}

impl FakeServer {

	/// Serves one connection; the n-th call received is answered with the n-th group of replies.
	pub fn start(script:Vec<Vec<Reply>>) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();

		let handle = thread::spawn(move || {
			let (mut stream, _) = listener.accept().unwrap();
			let mut calls = vec![];

			for replies in script {
				let record = match read_record(&mut stream) {
					Some(r) => r,
					None => break,
				};

				let mut u = Unpacker::new();
				u.reset(&record);
				let xid = u.unpack_u32().unwrap();
				for _ in 0..4 { u.unpack_u32().unwrap(); }
				let procedure = u.unpack_u32().unwrap();
				calls.push(Call{ procedure, args: record[CALL_HEADER_LEN..].to_vec() });

				for reply in &replies {
					write_reply(&mut stream, xid, reply);
				}
			}
			calls
		});

		FakeServer{ port, handle }
	}

	/// Waits for the script to run out and returns every call received.
	pub fn finish(self) -> Vec<Call> {
		self.handle.join().unwrap()
	}

}

/// Packs XDR words for a reply body.
pub fn words(items:&[i32]) -> Packer {
	let mut p = Packer::new();
	for x in items {
		p.pack_i32(*x).unwrap();
	}
	p
}
