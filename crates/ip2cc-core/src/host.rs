// ── Host side channel ──
//
// The adapter never reaches into the host runtime. Everything it wants
// the host to know -- status transitions, log lines, preset updates --
// goes through the `Host` observer handed in at construction.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

pub use ip2cc_api::Status;

use crate::preset::Preset;

const LOG_CHANNEL_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Observer implemented by whatever drives the adapter.
///
/// Calls may arrive from the transport's background task, so
/// implementations must be thread-safe.
pub trait Host: Send + Sync {
    /// Connectivity status for the host's UI.
    fn set_status(&self, status: Status, message: Option<&str>);

    /// A line for the host's module log.
    fn log(&self, level: LogLevel, message: &str);

    /// The adapter regenerated its presets.
    fn set_presets(&self, presets: &[Preset]) {
        let _ = presets;
    }
}

// ── ChannelHost ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: Status,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// [`Host`] backed by `tokio::sync` channels.
///
/// Status is a `watch` (latest value wins), log lines a `broadcast`,
/// presets an atomically swapped snapshot. Used by the CLI and by tests
/// that want to observe the adapter without a real control surface.
pub struct ChannelHost {
    status: watch::Sender<StatusReport>,
    logs: broadcast::Sender<LogEntry>,
    presets: ArcSwap<Vec<Preset>>,
}

impl ChannelHost {
    pub fn new() -> Self {
        let (status, _) = watch::channel(StatusReport::default());
        let (logs, _) = broadcast::channel(LOG_CHANNEL_SIZE);
        Self {
            status,
            logs,
            presets: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn status(&self) -> StatusReport {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusReport> {
        self.status.subscribe()
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogEntry> {
        self.logs.subscribe()
    }

    pub fn presets(&self) -> Arc<Vec<Preset>> {
        self.presets.load_full()
    }
}

impl Default for ChannelHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for ChannelHost {
    fn set_status(&self, status: Status, message: Option<&str>) {
        debug!(%status, detail = message, "status change");
        self.status.send_replace(StatusReport {
            status,
            message: message.map(String::from),
        });
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(target: "ip2cc::module", "{message}"),
            LogLevel::Info => info!(target: "ip2cc::module", "{message}"),
            LogLevel::Warn => warn!(target: "ip2cc::module", "{message}"),
            LogLevel::Error => error!(target: "ip2cc::module", "{message}"),
        }
        // No subscribers is fine.
        let _ = self.logs.send(LogEntry {
            at: Utc::now(),
            level,
            message: message.to_string(),
        });
    }

    fn set_presets(&self, presets: &[Preset]) {
        self.presets.store(Arc::new(presets.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::preset::presets;

    #[test]
    fn status_latest_value_wins() {
        let host = ChannelHost::new();
        let rx = host.subscribe_status();
        assert_eq!(host.status(), StatusReport::default());

        host.set_status(Status::Warning, Some("Connecting"));
        host.set_status(Status::Ok, None);

        assert_eq!(rx.borrow().status, Status::Ok);
        assert_eq!(host.status().message, None);
    }

    #[test]
    fn logs_reach_subscribers() {
        let host = ChannelHost::new();
        host.log(LogLevel::Info, "before subscribe");

        let mut rx = host.subscribe_logs();
        host.log(LogLevel::Error, "Network error: refused");

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message, "Network error: refused");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn presets_snapshot_replaced() {
        let host = ChannelHost::new();
        assert!(host.presets().is_empty());
        host.set_presets(&presets());
        assert_eq!(host.presets().len(), 6);
    }
}
