//! Decoders for the hex columns of `/proc/net/tcp`.
//!
//! Addresses are printed by the kernel as the raw 32-bit word in host
//! (little-endian) order, ports as 4 hex digits and the connection state as
//! a hex `tcp_states.h` code.

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// Error type for malformed `/proc/net/tcp` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input does not have the fixed number of hex digits.
    InvalidLength { input: String, expected: usize },
    /// Input contains a non-hex character.
    InvalidHex { input: String },
    /// State code outside `1..=12`.
    UnknownTcpState(u32),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidLength { input, expected } => {
                write!(f, "expected {} hex digits, got {:?}", expected, input)
            }
            DecodeError::InvalidHex { input } => write!(f, "invalid hex value {:?}", input),
            DecodeError::UnknownTcpState(code) => write!(f, "unknown TCP state {}", code),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Parses exactly `digits` hex digits.
fn parse_fixed_hex(input: &str, digits: usize) -> Result<u32, DecodeError> {
    if input.len() != digits {
        return Err(DecodeError::InvalidLength {
            input: input.to_string(),
            expected: digits,
        });
    }
    // from_str_radix would also accept a leading '+'
    if !input.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex {
            input: input.to_string(),
        });
    }
    u32::from_str_radix(input, 16).map_err(|_| DecodeError::InvalidHex {
        input: input.to_string(),
    })
}

/// Decodes a little-endian hex IPv4 address, e.g. `881210AC` -> `172.16.18.136`.
pub fn ip_from_le_hex(le_hex: &str) -> Result<Ipv4Addr, DecodeError> {
    let word = parse_fixed_hex(le_hex, 8)?;
    Ok(Ipv4Addr::from(word.to_le_bytes()))
}

/// Decodes a 4-digit hex port, e.g. `0050` -> `80`.
pub fn port_from_hex(p_hex: &str) -> Result<u16, DecodeError> {
    let port = parse_fixed_hex(p_hex, 4)?;
    // Four hex digits always fit
    Ok(port as u16)
}

/// TCP connection state, numbered as in the kernel's `tcp_states.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TcpState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    MaxStates,
}

impl TcpState {
    const ALL: [TcpState; 12] = [
        TcpState::Established,
        TcpState::SynSent,
        TcpState::SynRecv,
        TcpState::FinWait1,
        TcpState::FinWait2,
        TcpState::TimeWait,
        TcpState::Close,
        TcpState::CloseWait,
        TcpState::LastAck,
        TcpState::Listen,
        TcpState::Closing,
        TcpState::MaxStates,
    ];

    /// Maps a state code in `1..=12` to its state.
    pub fn from_code(code: u32) -> Result<Self, DecodeError> {
        match code {
            1..=12 => Ok(Self::ALL[code as usize - 1]),
            _ => Err(DecodeError::UnknownTcpState(code)),
        }
    }

    /// Decodes the `st` column of `/proc/net/tcp`, e.g. `0A` -> `Listen`.
    pub fn from_hex(hex: &str) -> Result<Self, DecodeError> {
        if hex.is_empty() || hex.len() > 8 {
            return Err(DecodeError::InvalidLength {
                input: hex.to_string(),
                expected: 2,
            });
        }
        let code = parse_fixed_hex(hex, hex.len())?;
        Self::from_code(code)
    }

    pub fn code(self) -> u32 {
        self as u32 + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TcpState::Established => "ESTABLISHED",
            TcpState::SynSent => "TCP_SYN_SENT",
            TcpState::SynRecv => "TCP_SYN_RECV",
            TcpState::FinWait1 => "TCP_FIN_WAIT1",
            TcpState::FinWait2 => "TCP_FIN_WAIT2",
            TcpState::TimeWait => "TCP_TIME_WAIT",
            TcpState::Close => "TCP_CLOSE",
            TcpState::CloseWait => "TCP_CLOSE_WAIT",
            TcpState::LastAck => "TCP_LAST_ACK",
            TcpState::Listen => "TCP_LISTEN",
            TcpState::Closing => "TCP_CLOSING",
            TcpState::MaxStates => "TCP_MAX_STATES",
        }
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
