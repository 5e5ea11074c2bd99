
// One module per instrument model, named after the model

pub mod agilent859x;
pub mod arroyo4302;
pub mod sr7265;

use crate::error::{Error, Result};

// NaN and infinities would go out as text the instrument can't parse
pub(crate) fn finite(name:&str, x:f64) -> Result<f64> {
	if x.is_finite() { Ok(x) }
	else { Err(Error::InvalidSetting(format!("{} must be a finite number, got {}", name, x))) }
}
