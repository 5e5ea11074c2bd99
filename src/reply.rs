// Parsing of the ASCII replies instruments send back

use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

lazy_static! {
	static ref IDN_RE: Regex = Regex::new("^([^,]+),([^,]+),([^,]+),([^,\\s]+)").unwrap();
}

/// A single floating-point literal, e.g. `2.5E-3`.
pub fn parse_value(cmd:&str, res:&str) -> Result<f64> {
	res.trim().parse::<f64>().map_err(|_| Error::malformed(cmd, res))
}

/// A comma-separated list of floating-point literals.
pub fn parse_values(cmd:&str, res:&str) -> Result<Vec<f64>> {
	res.trim()
		.split(',')
		.map(|field| parse_value(cmd, field).map_err(|_| Error::malformed(cmd, res)))
		.collect()
}

/// An integer setting code. Some instruments send these as `2.0`, so any
/// integral value in range is accepted.
pub fn parse_code(cmd:&str, res:&str) -> Result<u8> {
	let x = parse_value(cmd, res)?;
	if x.fract() == 0.0 && (0.0..=u8::MAX as f64).contains(&x) { Ok(x as u8) }
	else { Err(Error::malformed(cmd, res)) }
}

/// A `0`/`1` state flag.
pub fn parse_flag(cmd:&str, res:&str) -> Result<bool> {
	match parse_code(cmd, res)? {
		0 => Ok(false),
		1 => Ok(true),
		_ => Err(Error::malformed(cmd, res)),
	}
}

/// The reply to an IEEE 488.2 `*IDN?` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub manufacturer: String,
	pub model: String,
	pub serial_num: String,
	pub fw_version: String,
}

impl Identity {
	pub fn parse(cmd:&str, res:&str) -> Result<Self> {
		let caps = IDN_RE.captures(res.trim()).ok_or_else(|| Error::malformed(cmd, res))?;
		let field = |i:usize| caps.get(i).map(|m| m.as_str().trim().to_owned()).ok_or_else(|| Error::malformed(cmd, res));

		Ok(Identity {
			manufacturer: field(1)?,
			model:        field(2)?,
			serial_num:   field(3)?,
			fw_version:   field(4)?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scientific_notation() {
		assert_eq!(parse_value("SEN.", "2.5E-3").unwrap(), 0.0025);
		assert_eq!(parse_value("FA?", " 1.5E+09\r").unwrap(), 1.5e9);
	}

	#[test]
	fn not_a_number() {
		assert!(matches!(parse_value("MAG.", "?"), Err(Error::MalformedReply{ .. })));
		assert!(matches!(parse_value("MAG.", ""), Err(Error::MalformedReply{ .. })));
	}

	#[test]
	fn comma_separated() {
		assert_eq!(parse_values("TRA?;", "1,-2.5, 3E1").unwrap(), vec![1.0, -2.5, 30.0]);
		assert_eq!(parse_values("MAG.", "4.0").unwrap(), vec![4.0]);
	}

	#[test]
	fn one_bad_field_fails_the_whole_reply() {
		match parse_values("TRA?;", "1,,3") {
			Err(Error::MalformedReply{ reply, .. }) => assert_eq!(reply, "1,,3"),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn codes_and_flags() {
		assert_eq!(parse_code("IMODE", "2").unwrap(), 2);
		assert_eq!(parse_code("IMODE", "1.0").unwrap(), 1);
		assert!(parse_code("IMODE", "1.5").is_err());
		assert!(parse_code("IMODE", "-1").is_err());
		assert!(parse_flag("LASER:OUTPUT?", "1").unwrap());
		assert!(!parse_flag("LASER:OUTPUT?", "0").unwrap());
		assert!(parse_flag("LASER:OUTPUT?", "2").is_err());
	}

	#[test]
	fn identity_fields() {
		let id = Identity::parse("*IDN?", "Arroyo Instruments,4302,12345,1.2.3\r\n").unwrap();
		assert_eq!(id.manufacturer, "Arroyo Instruments");
		assert_eq!(id.model, "4302");
		assert_eq!(id.serial_num, "12345");
		assert_eq!(id.fw_version, "1.2.3");
		assert!(Identity::parse("*IDN?", "4302").is_err());
	}
}
