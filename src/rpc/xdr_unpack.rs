// Unpacking of ONC RPC reply headers

use std::io::{self, Error, ErrorKind};

use crate::xdr::Unpacker;
use crate::rpc::{REPLY, MSG_DENIED, RPC_MISMATCH, AUTH_ERROR, MSG_ACCEPTED, PROG_UNAVAIL, PROG_MISMATCH, PROC_UNAVAIL, GARBAGE_ARGS, SUCCESS};

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

pub fn unpack_auth(unpacker:&mut Unpacker) -> io::Result<(i32, Vec<u8>)> {
	let flavor:i32    = unpacker.unpack_enum()?;
	let stuff:Vec<u8> = unpacker.unpack_variable_len_opaque()?;
	Ok((flavor, stuff))
}

/// Consumes an accepted, successful reply header and returns its xid.
pub fn unpack_replyheader(unpacker:&mut Unpacker) -> io::Result<u32> {
	let xid:u32 = unpacker.unpack_u32()?;

	if unpacker.unpack_enum()? != REPLY { return Err(err("Expected REPLY message type")); }

	match unpacker.unpack_enum()? {
		MSG_DENIED => {
			return match unpacker.unpack_enum()? {
				RPC_MISMATCH => Err(err("Message denied due to RPC_MISMATCH")),
				AUTH_ERROR   => Err(err("Message denied due to AUTH_ERROR")),
				_            => Err(err("Message denied for an unknown reason")),
			};
		},
		MSG_ACCEPTED => { },
		_            => return Err(err("Neither MSG_DENIED nor MSG_ACCEPTED in reply")),
	}

	unpack_auth(unpacker)?;

	match unpacker.unpack_enum()? {
		SUCCESS       => Ok(xid),
		PROG_UNAVAIL  => Err(err("Program unavailable")),
		PROG_MISMATCH => Err(err("Program version mismatch")),
		PROC_UNAVAIL  => Err(err("Procedure unavailable")),
		GARBAGE_ARGS  => Err(err("Garbage args")),
		_             => Err(err("Call failed for unknown reason")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::xdr::Packer;

	fn reply(xid:u32, accept_stat:i32) -> Unpacker {
		let mut p = Packer::new();
		p.pack_u32(xid).unwrap();
		p.pack_enum(REPLY).unwrap();
		p.pack_enum(MSG_ACCEPTED).unwrap();
		p.pack_enum(0).unwrap();
		p.pack_variable_len_opaque(&[]).unwrap();
		p.pack_enum(accept_stat).unwrap();

		let mut u = Unpacker::new();
		u.reset(p.as_bytes());
		u
	}

	#[test]
	fn accepted_reply_yields_xid() {
		let mut u = reply(42, SUCCESS);
		assert_eq!(unpack_replyheader(&mut u).unwrap(), 42);
		assert!(u.all_data_consumed());
	}

	#[test]
	fn unavailable_program_is_an_error() {
		let mut u = reply(42, PROG_UNAVAIL);
		assert!(unpack_replyheader(&mut u).is_err());
	}
}
