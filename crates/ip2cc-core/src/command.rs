// ── Relay commands ──
//
// A command is a (port, state) pair. The wire form is a single ASCII
// line addressed to relay module 1: `setstate,1:<port>,<state>\r\n`.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::error::CoreError;

/// The IP2CC exposes its three relays on module address 1.
pub const MODULE_ADDRESS: u8 = 1;

/// One of the three relay contacts on the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    One,
    Two,
    Three,
}

impl Port {
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Dropdown value used by the `portNum` action option.
    ///
    /// Carries the trailing separator so it concatenates directly with
    /// the state code.
    pub const fn option_id(self) -> &'static str {
        match self {
            Self::One => "1,",
            Self::Two => "2,",
            Self::Three => "3,",
        }
    }

    pub fn from_option_id(id: &str) -> Option<Self> {
        match id {
            "1," => Some(Self::One),
            "2," => Some(Self::Two),
            "3," => Some(Self::Three),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Port {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(CoreError::InvalidPort(other)),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Relay position. The unit encodes closed (on) as `1`, open (off) as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    Closed,
    Open,
}

impl RelayState {
    /// Dropdown value used by the `setPort` action option.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Closed => "1",
            Self::Open => "0",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Closed),
            "0" => Some(Self::Open),
            _ => None,
        }
    }

    /// Imperative label used on buttons ("Close" / "Open").
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Closed => "Close",
            Self::Open => "Open",
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::Open => f.write_str("open"),
        }
    }
}

/// Set one relay to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub port: Port,
    pub state: RelayState,
}

impl Command {
    pub const fn new(port: Port, state: RelayState) -> Self {
        Self { port, state }
    }

    /// The exact line written to the socket, terminator included.
    pub fn to_wire(&self) -> String {
        format!("{self}\r\n")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "setstate,{MODULE_ADDRESS}:{}{}",
            self.port.option_id(),
            self.state.code()
        )
    }
}
