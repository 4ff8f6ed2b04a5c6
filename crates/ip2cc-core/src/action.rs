// ── Action registry ──
//
// The host builds its action editor from `ActionDefinition`s and calls
// back into the adapter with an `ActionInvocation` carrying the option
// values the user picked. Option values are the raw dropdown ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::command::{Command, Port, RelayState};
use crate::error::CoreError;

pub const PORT_SET: &str = "portSet";
pub const OPT_PORT_NUM: &str = "portNum";
pub const OPT_SET_PORT: &str = "setPort";

/// A named, parameterized operation the host can invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: String,
    pub label: String,
    pub options: Vec<ActionOption>,
}

/// One input in the host's action editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionOption {
    Dropdown {
        id: String,
        label: String,
        width: u8,
        default: String,
        choices: Vec<Choice>,
    },
}

impl ActionOption {
    pub fn id(&self) -> &str {
        match self {
            Self::Dropdown { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The `portSet` definition: pick a port, pick on (close) or off (open).
pub fn port_set_definition() -> ActionDefinition {
    let ports = Port::iter()
        .map(|port| Choice::new(port.option_id(), &format!("Port {port}")))
        .collect();

    ActionDefinition {
        id: PORT_SET.into(),
        label: "Choose port and state".into(),
        options: vec![
            ActionOption::Dropdown {
                id: OPT_PORT_NUM.into(),
                label: "Choose Port".into(),
                width: 12,
                default: Port::One.option_id().into(),
                choices: ports,
            },
            ActionOption::Dropdown {
                id: OPT_SET_PORT.into(),
                label: "Set On or Off".into(),
                width: 12,
                default: RelayState::Closed.code().into(),
                choices: vec![
                    Choice::new(RelayState::Closed.code(), "Turn On (Close)"),
                    Choice::new(RelayState::Open.code(), "Turn Off (Open)"),
                ],
            },
        ],
    }
}

/// Every action the adapter understands.
pub fn registry() -> Vec<ActionDefinition> {
    vec![port_set_definition()]
}

// ── Invocation ───────────────────────────────────────────────────────

/// What the host sends to the dispatcher: `{action, options}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub action: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl ActionInvocation {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(id.into(), value.into());
        self
    }

    /// The `portSet` invocation for a typed command.
    pub fn port_set(port: Port, state: RelayState) -> Self {
        Self::new(PORT_SET)
            .with_option(OPT_PORT_NUM, port.option_id())
            .with_option(OPT_SET_PORT, state.code())
    }

    pub fn option(&self, id: &str) -> Option<&str> {
        self.options.get(id).map(String::as_str)
    }

    /// Decode `portSet` options into a [`Command`].
    ///
    /// Both options are required; values must be one of the dropdown ids.
    pub fn port_set_command(&self) -> Result<Command, CoreError> {
        let port_id = self.require(OPT_PORT_NUM)?;
        let port = Port::from_option_id(port_id).ok_or_else(|| CoreError::InvalidOption {
            option: OPT_PORT_NUM.into(),
            value: port_id.into(),
        })?;

        let code = self.require(OPT_SET_PORT)?;
        let state = RelayState::from_code(code).ok_or_else(|| CoreError::InvalidOption {
            option: OPT_SET_PORT.into(),
            value: code.into(),
        })?;

        Ok(Command::new(port, state))
    }

    fn require(&self, id: &str) -> Result<&str, CoreError> {
        self.option(id).ok_or_else(|| CoreError::MissingOption { option: id.into() })
    }
}
