
#[macro_use]
extern crate lazy_static;

// External data representation, a protocol for serializing data to be sent over the network
pub mod xdr;

// Remote procedure call, a protocol build on top of XDR to provide something like C-style function calls over the network
pub mod rpc;

// A protocol using RPC that's meant to communicate with instruments directly or through a LAN/GPIB gateway
pub mod vxi11;

// Bus resources, link settings and the session each driver owns
pub mod bus;

// Parsing of ASCII instrument replies
pub mod reply;

// Station configuration file
pub mod config;

// Drivers for the individual instruments
pub mod devices;

pub mod error;
pub mod utils;

pub use crate::bus::{LinkSettings, Resource, Session};
pub use crate::error::{Error, Result};
