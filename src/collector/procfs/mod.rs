//! Collectors for Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading process
//! information from the `/proc` virtual filesystem.

pub mod net;
pub mod parser;
pub mod process;
pub mod reader;

pub use net::{DecodeError, TcpState, ip_from_le_hex, port_from_hex};
pub use parser::{LimitsLayout, ParseError, Record, UserResolver};
pub use process::{CollectError, PidFilter, ProcessCollector};
