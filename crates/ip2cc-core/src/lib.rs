//! Device adapter for Global Caché iTach IP2CC contact-closure units.
//!
//! This crate is the plugin a control-surface host loads to drive the
//! relay unit:
//!
//! - **[`RelayAdapter`]**: owns the [`AdapterConfig`] and at most one live
//!   connection. Implements [`DeviceModule`], the lifecycle contract the
//!   host calls into (`initialize`, `apply_configuration`, `dispatch`,
//!   `shutdown`).
//!
//! - **[`Command`]**: a (port, state) pair rendered to the
//!   `setstate,1:<port>,<state>\r\n` wire line.
//!
//! - **Schema** ([`action`], [`preset`], [`field`]): the action registry,
//!   the six button presets, and the configuration fields the host renders.
//!
//! - **[`Host`]**: observer the adapter reports status, log lines, and
//!   presets to. [`ChannelHost`] backs it with `tokio::sync` channels.
//!
//! - **[`Connector`] / [`Transport`]**: the narrow socket contract the
//!   adapter consumes. [`TcpConnector`] implements it on `ip2cc-api`.

pub mod action;
pub mod adapter;
pub mod command;
pub mod config;
pub mod error;
pub mod field;
pub mod host;
pub mod preset;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{ActionDefinition, ActionInvocation, ActionOption, Choice};
pub use adapter::{DeviceModule, DispatchOutcome, RelayAdapter};
pub use command::{Command, Port, RelayState};
pub use config::AdapterConfig;
pub use error::CoreError;
pub use field::ConfigField;
pub use host::{ChannelHost, Host, LogEntry, LogLevel, StatusReport};
pub use preset::{ButtonStyle, Preset};
pub use transport::{Connector, TcpConnector, Transport};

pub use ip2cc_api::{ClientConfig, DEFAULT_PORT, ReconnectConfig, Status};
