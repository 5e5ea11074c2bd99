// Setting tables for the 7265 signal channel, each member carrying its wire code

use serde::{Serialize, Deserialize};

/// Current input mode. `Off` means the voltage input is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Imode {
	Off,
	HighBandwidth,
	LowNoise,
}

/// Voltage input mode. Ignored by the instrument while an [`Imode`] other than `Off` is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vmode {
	Grounded,
	A,
	MinusB,
	AMinusB,
}

/// Voltage-mode input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputDevice {
	Bipolar,	// 10 kohm, 2 nV/rtHz at 1 kHz
	Fet,		// 10 Mohm, 5 nV/rtHz at 1 kHz
}

/// Input connector shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputShield {
	Ground,
	Floating,	// 1 kohm to ground
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coupling {
	Ac,
	Dc,
}

macro_rules! coded {
	($t:ident { $($v:ident = $c:expr),+ $(,)? }) => {
		impl $t {
			pub const ALL: &'static [$t] = &[$($t::$v),+];

			pub fn code(self) -> u8 {
				match self { $($t::$v => $c),+ }
			}

			pub fn from_code(code:u8) -> Option<Self> {
				Self::ALL.iter().copied().find(|m| m.code() == code)
			}
		}
	};
}

coded!(Imode { Off = 0, HighBandwidth = 1, LowNoise = 2 });
coded!(Vmode { Grounded = 0, A = 1, MinusB = 2, AMinusB = 3 });
coded!(InputDevice { Bipolar = 0, Fet = 1 });
coded!(InputShield { Ground = 0, Floating = 1 });
coded!(Coupling { Ac = 0, Dc = 1 });

/// One full-scale sensitivity step.
///
/// A bound of zero means the step is not available in that input mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityRecord {
	pub name: &'static str,
	pub code: u8,
	pub voltage_fs: f64,
	pub current_fs_high_bandwidth: f64,
	pub current_fs_low_noise: f64,
}

const fn sen(name:&'static str, code:u8, voltage_fs:f64, current_fs_high_bandwidth:f64, current_fs_low_noise:f64) -> SensitivityRecord {
	SensitivityRecord{ name, code, voltage_fs, current_fs_high_bandwidth, current_fs_low_noise }
}

pub const SENSITIVITY_TABLE:[SensitivityRecord; 27] = [
	sen("2nV",    1,   2e-9,   2e-15,      0.0),
	sen("5nV",    2,   5e-9,   5e-15,      0.0),
	sen("10nV",   3,  10e-9,  10e-15,      0.0),
	sen("20nV",   4,  20e-9,  20e-15,      0.0),
	sen("50nV",   5,  50e-9,  50e-15,      0.0),
	sen("100nV",  6, 100e-9, 100e-15,      0.0),
	sen("200nV",  7, 200e-9, 200e-15,    2e-15),
	sen("500nV",  8, 500e-9, 500e-15,    5e-15),
	sen("1uV",    9,   1e-6,   1e-12,   10e-15),
	sen("2uV",   10,   2e-6,   2e-12,   20e-15),
	sen("5uV",   11,   5e-6,   5e-12,   50e-15),
	sen("10uV",  12,  10e-6,  10e-12,  100e-15),
	sen("20uV",  13,  20e-6,  20e-12,  200e-15),
	sen("50uV",  14,  50e-6,  50e-12,  500e-15),
	sen("100uV", 15, 100e-6, 100e-12,    1e-12),
	sen("200uV", 16, 200e-6, 200e-12,    2e-12),
	sen("500uV", 17, 500e-6, 500e-12,    5e-12),
	sen("1mV",   18,   1e-3,    1e-9,   10e-12),
	sen("2mV",   19,   2e-3,    2e-9,   20e-12),
	sen("5mV",   20,   5e-3,    5e-9,   50e-12),
	sen("10mV",  21,  10e-3,   10e-9,  100e-12),
	sen("20mV",  22,  20e-3,   20e-9,  200e-12),
	sen("50mV",  23,  50e-3,   50e-9,  500e-12),
	sen("100mV", 24, 100e-3,  100e-9,     1e-9),
	sen("200mV", 25, 200e-3,  200e-9,     2e-9),
	sen("500mV", 26, 500e-3,  500e-9,     5e-9),
	sen("1V",    27,    1.0,    1e-6,    10e-9),
];

/// A sensitivity step, named by its voltage-mode full scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sensitivity {
	Nv2, Nv5, Nv10, Nv20, Nv50, Nv100, Nv200, Nv500,
	Uv1, Uv2, Uv5, Uv10, Uv20, Uv50, Uv100, Uv200, Uv500,
	Mv1, Mv2, Mv5, Mv10, Mv20, Mv50, Mv100, Mv200, Mv500,
	V1,
}

impl Sensitivity {
	pub const ALL:[Sensitivity; 27] = [
		Sensitivity::Nv2, Sensitivity::Nv5, Sensitivity::Nv10, Sensitivity::Nv20, Sensitivity::Nv50,
		Sensitivity::Nv100, Sensitivity::Nv200, Sensitivity::Nv500,
		Sensitivity::Uv1, Sensitivity::Uv2, Sensitivity::Uv5, Sensitivity::Uv10, Sensitivity::Uv20,
		Sensitivity::Uv50, Sensitivity::Uv100, Sensitivity::Uv200, Sensitivity::Uv500,
		Sensitivity::Mv1, Sensitivity::Mv2, Sensitivity::Mv5, Sensitivity::Mv10, Sensitivity::Mv20,
		Sensitivity::Mv50, Sensitivity::Mv100, Sensitivity::Mv200, Sensitivity::Mv500,
		Sensitivity::V1,
	];

	// ALL and SENSITIVITY_TABLE are in the same order
	pub fn record(self) -> &'static SensitivityRecord {
		&SENSITIVITY_TABLE[self as usize]
	}

	pub fn code(self) -> u8 { self.record().code }

	/// Full scale in V (voltage mode) or A (current modes); zero if unavailable in `imode`.
	pub fn full_scale(self, imode:Imode) -> f64 {
		let r = self.record();
		match imode {
			Imode::Off           => r.voltage_fs,
			Imode::HighBandwidth => r.current_fs_high_bandwidth,
			Imode::LowNoise      => r.current_fs_low_noise,
		}
	}

	pub fn is_available(self, imode:Imode) -> bool { self.full_scale(imode) != 0.0 }

	pub fn from_code(code:u8) -> Option<Self> {
		Self::ALL.iter().copied().find(|s| s.code() == code)
	}

	/// Looks a step up by its table name, e.g. `"500nV"` or `"1V"`.
	pub fn from_name(name:&str) -> Option<Self> {
		Self::ALL.iter().copied().find(|s| s.record().name.eq_ignore_ascii_case(name))
	}
}

/// AC gain step of the input amplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcGain {
	Db0, Db10, Db20, Db30, Db40, Db50, Db60, Db70, Db80, Db90,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcGainRecord {
	pub code: u8,
	pub gain_db: u8,
}

pub const AC_GAIN_TABLE:[AcGainRecord; 10] = [
	AcGainRecord{ code: 0, gain_db:  0 },
	AcGainRecord{ code: 1, gain_db: 10 },
	AcGainRecord{ code: 2, gain_db: 20 },
	AcGainRecord{ code: 3, gain_db: 30 },
	AcGainRecord{ code: 4, gain_db: 40 },
	AcGainRecord{ code: 5, gain_db: 50 },
	AcGainRecord{ code: 6, gain_db: 60 },
	AcGainRecord{ code: 7, gain_db: 70 },
	AcGainRecord{ code: 8, gain_db: 80 },
	AcGainRecord{ code: 9, gain_db: 90 },
];

impl AcGain {
	pub const ALL:[AcGain; 10] = [
		AcGain::Db0, AcGain::Db10, AcGain::Db20, AcGain::Db30, AcGain::Db40,
		AcGain::Db50, AcGain::Db60, AcGain::Db70, AcGain::Db80, AcGain::Db90,
	];

	pub fn record(self) -> &'static AcGainRecord { &AC_GAIN_TABLE[self as usize] }

	pub fn code(self) -> u8 { self.record().code }

	pub fn gain_db(self) -> u8 { self.record().gain_db }

	pub fn from_code(code:u8) -> Option<Self> {
		Self::ALL.iter().copied().find(|g| g.code() == code)
	}
}
