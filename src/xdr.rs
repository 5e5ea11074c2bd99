// External data representation (RFC 4506), the encoding underneath ONC RPC and VXI-11

use std::io::{self, Error, ErrorKind, Cursor};

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::InvalidData, msg) }

fn padding(n:usize) -> usize { (4 - n % 4) % 4 }

#[derive(Default)]
pub struct Packer {
	buff: Vec<u8>,
}

impl Packer {

	pub fn new() -> Self { Self::default() }

	pub fn reset(&mut self) { self.buff.clear(); }

	pub fn as_bytes(&self) -> &[u8] { &self.buff }

	// Every item is a multiple of four bytes, so alignment holds as long as opaque data is padded
	pub fn pack_u32(&mut self, x:u32) -> io::Result<()> { self.buff.write_u32::<BigEndian>(x) }
	pub fn pack_i32(&mut self, x:i32) -> io::Result<()> { self.buff.write_i32::<BigEndian>(x) }
	pub fn pack_enum(&mut self, x:i32) -> io::Result<()> { self.pack_i32(x) }
	pub fn pack_bool(&mut self, b:bool) -> io::Result<()> { self.pack_i32(b as i32) }

	pub fn pack_variable_len_opaque(&mut self, data:&[u8]) -> io::Result<()> {
		let len = u32::try_from(data.len()).map_err(|_| err("Opaque data too long for XDR"))?;
		self.pack_u32(len)?;
		self.buff.extend_from_slice(data);
		self.buff.resize(self.buff.len() + padding(data.len()), 0);
		Ok(())
	}

}

#[derive(Default)]
pub struct Unpacker {
	rdr: Cursor<Vec<u8>>,
}

impl Unpacker {

	pub fn new() -> Self { Self::default() }

	pub fn reset(&mut self, data:&[u8]) { self.rdr = Cursor::new(data.to_vec()); }

	fn remaining(&self) -> usize {
		self.rdr.get_ref().len().saturating_sub(self.rdr.position() as usize)
	}

	pub fn all_data_consumed(&self) -> bool { self.remaining() == 0 }

	pub fn unpack_u32(&mut self) -> io::Result<u32> { self.rdr.read_u32::<BigEndian>() }
	pub fn unpack_i32(&mut self) -> io::Result<i32> { self.rdr.read_i32::<BigEndian>() }

	// Whether an enum value is in range depends on the caller, so at this level it's just an i32
	pub fn unpack_enum(&mut self) -> io::Result<i32> { self.unpack_i32() }

	pub fn unpack_variable_len_opaque(&mut self) -> io::Result<Vec<u8>> {
		let n = self.unpack_u32()? as usize;
		if n + padding(n) > self.remaining() {
			return Err(err("Opaque length runs past the end of the buffer"));
		}

		let start = self.rdr.position() as usize;
		let ans:Vec<u8> = self.rdr.get_ref()[start..start + n].to_vec();
		self.rdr.set_position((start + n + padding(n)) as u64);
		Ok(ans)
	}

}
