// ── Relay adapter ──
//
// Owns the configuration and at most one connection. The host drives
// every lifecycle step; the adapter never spawns work of its own beyond
// what the transport does internally.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use ip2cc_api::LinkObserver;

use crate::action::{self, ActionDefinition, ActionInvocation, PORT_SET};
use crate::command::Command;
use crate::config::AdapterConfig;
use crate::error::CoreError;
use crate::field::{self, ConfigField};
use crate::host::{Host, LogLevel, Status};
use crate::preset::{self, Preset};
use crate::transport::{Connector, Transport};

// ── DeviceModule ─────────────────────────────────────────────────

/// Lifecycle contract between a control-surface host and a device module.
pub trait DeviceModule {
    type Config;

    /// Reset status, publish presets, and (re)connect from current config.
    fn initialize(&mut self);

    /// Replace the configuration wholesale and reconnect.
    fn apply_configuration(&mut self, config: Self::Config);

    fn config_fields(&self) -> Vec<ConfigField>;

    fn list_actions(&self) -> Vec<ActionDefinition>;

    /// Run an action. Never fails; the outcome says what happened.
    fn dispatch(&self, action: &ActionInvocation) -> DispatchOutcome;

    fn list_presets(&self) -> &[Preset];

    /// Release the connection. Safe to call repeatedly.
    fn shutdown(&mut self);
}

/// What a dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command was handed to the transport.
    Sent(Command),
    /// No connection, or the connection is down. Nothing written.
    NotConnected,
    /// The action id is not one this adapter registers.
    UnknownAction(String),
    /// `portSet` options were missing or not one of the dropdown ids.
    InvalidOptions(String),
    /// The transport refused the write.
    SendFailed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

// ── RelayAdapter ─────────────────────────────────────────────────

struct Connection {
    transport: Box<dyn Transport>,
    /// Cleared on teardown so late notifications from the old link are dropped.
    live: Arc<AtomicBool>,
}

/// Adapter for one iTach IP2CC unit.
pub struct RelayAdapter {
    config: AdapterConfig,
    host: Arc<dyn Host>,
    connector: Arc<dyn Connector>,
    connection: Option<Connection>,
    presets: Vec<Preset>,
}

impl RelayAdapter {
    /// Build an adapter. Does NOT connect -- the host calls
    /// [`initialize`](DeviceModule::initialize) for that.
    pub fn new(config: AdapterConfig, host: Arc<dyn Host>, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            host,
            connector,
            connection: None,
            presets: preset::presets(),
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|conn| conn.transport.is_connected())
    }

    /// Write one command if the link is up; skip it otherwise.
    pub fn send_command(&self, command: &Command) -> DispatchOutcome {
        debug!(command = %command, host = %self.config.host, "sending tcp");

        let Some(conn) = self.connection.as_ref().filter(|c| c.transport.is_connected()) else {
            debug!("socket not connected, dropping command");
            self.host.log(LogLevel::Debug, "Socket not connected");
            return DispatchOutcome::NotConnected;
        };

        match conn.transport.send(command.to_wire().as_bytes()) {
            Ok(()) => DispatchOutcome::Sent(*command),
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "send failed");
                self.host.log(LogLevel::Warn, &format!("Send failed: {err}"));
                DispatchOutcome::SendFailed(err.to_string())
            }
        }
    }

    fn init_presets(&mut self) {
        self.presets = preset::presets();
        self.host.set_presets(&self.presets);
    }

    fn init_transport(&mut self) {
        self.close_connection();

        let Some(host) = self.config.host() else {
            debug!("no host configured, staying offline");
            return;
        };

        info!(host, port = self.config.port, "opening device connection");
        let live = Arc::new(AtomicBool::new(true));
        let observer = Arc::new(ConnectionObserver {
            host: Arc::clone(&self.host),
            live: Arc::clone(&live),
        });
        let transport = self.connector.connect(host, self.config.port, observer);
        self.connection = Some(Connection { transport, live });
    }

    fn close_connection(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.live.store(false, Ordering::Release);
            conn.transport.destroy();
        }
    }
}

impl DeviceModule for RelayAdapter {
    type Config = AdapterConfig;

    fn initialize(&mut self) {
        self.host.set_status(Status::Unknown, None);
        self.init_presets();
        self.init_transport();
    }

    fn apply_configuration(&mut self, config: AdapterConfig) {
        self.config = config;
        self.init_transport();
        self.init_presets();
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        field::config_fields()
    }

    fn list_actions(&self) -> Vec<ActionDefinition> {
        action::registry()
    }

    fn dispatch(&self, action: &ActionInvocation) -> DispatchOutcome {
        debug!(action = %action.action, options = ?action.options, "action");

        if action.action != PORT_SET {
            debug!(action = %action.action, "ignoring unknown action");
            self.host
                .log(LogLevel::Debug, &format!("Unknown action '{}'", action.action));
            return DispatchOutcome::UnknownAction(action.action.clone());
        }

        match action.port_set_command() {
            Ok(command) => self.send_command(&command),
            Err(e) => {
                warn!(error = %e, "rejecting portSet");
                self.host.log(LogLevel::Warn, &e.to_string());
                DispatchOutcome::InvalidOptions(e.to_string())
            }
        }
    }

    fn list_presets(&self) -> &[Preset] {
        &self.presets
    }

    fn shutdown(&mut self) {
        self.close_connection();
        debug!(host = %self.config.host, "adapter shut down");
    }
}

impl Drop for RelayAdapter {
    fn drop(&mut self) {
        self.close_connection();
    }
}

// ── Link notifications → host ────────────────────────────────────

struct ConnectionObserver {
    host: Arc<dyn Host>,
    live: Arc<AtomicBool>,
}

impl LinkObserver for ConnectionObserver {
    fn on_status(&self, status: Status, message: Option<&str>) {
        if self.live.load(Ordering::Acquire) {
            self.host.set_status(status, message);
        }
    }

    fn on_error(&self, error: &ip2cc_api::Error) {
        if !self.live.load(Ordering::Acquire) {
            return;
        }
        debug!(error = ?error, "network error");
        self.host
            .log(LogLevel::Error, &format!("Network error: {error}"));
    }
}

// ── Tests ────────────────────────────────────────────────────────
