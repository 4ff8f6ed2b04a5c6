//! `ip2cc watch`: keep the link open and stream what the adapter reports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use ip2cc_core::{ChannelHost, DeviceModule, LogEntry, RelayAdapter, StatusReport, TcpConnector};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// One line of the stream.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WatchEvent {
    Status {
        at: DateTime<Utc>,
        #[serde(flatten)]
        report: StatusReport,
    },
    Log(LogEntry),
}

impl WatchEvent {
    fn line(&self) -> String {
        match self {
            Self::Status { at, report } => {
                let mut line = format!("{} status {}", at.format("%H:%M:%S"), report.status);
                if let Some(message) = &report.message {
                    line.push_str(": ");
                    line.push_str(message);
                }
                line
            }
            Self::Log(entry) => format!(
                "{} {:<5}  {}",
                entry.at.format("%H:%M:%S"),
                entry.level,
                entry.message
            ),
        }
    }
}

fn emit(format: &OutputFormat, event: &WatchEvent, quiet: bool) -> Result<(), CliError> {
    let out = output::render_event(format, event, WatchEvent::line)?;
    output::print_output(&out, quiet);
    Ok(())
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let target = config::resolve_target(global, cfg)?;
    let format = config::output_format(global, cfg);
    eprintln!("Watching {} (Ctrl-C to stop)", config::display_addr(&target));

    let host = Arc::new(ChannelHost::new());
    let connector = Arc::new(TcpConnector::new(config::client_config(cfg)));
    let mut status = host.subscribe_status();
    let mut logs = host.subscribe_logs();
    let mut adapter = RelayAdapter::new(target, host.clone(), connector.clone());

    adapter.initialize();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            biased;

            res = &mut ctrl_c => {
                debug!("interrupt received");
                break res.map_err(CliError::from);
            }

            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let report = status.borrow_and_update().clone();
                let event = WatchEvent::Status { at: Utc::now(), report };
                if let Err(e) = emit(&format, &event, global.quiet) {
                    break Err(e);
                }
            }

            entry = logs.recv() => match entry {
                Ok(entry) => {
                    if let Err(e) = emit(&format, &WatchEvent::Log(entry), global.quiet) {
                        break Err(e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "log lines dropped"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    adapter.shutdown();
    connector.wait_idle().await;
    result
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use ip2cc_core::{LogLevel, Status};

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn status_line_and_json() {
        let event = WatchEvent::Status {
            at: at(),
            report: StatusReport {
                status: Status::Warning,
                message: Some("Connecting".into()),
            },
        };
        assert_eq!(event.line(), "12:30:05 status warning: Connecting");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "status");
        assert_eq!(json["status"], "warning");
        assert_eq!(json["message"], "Connecting");
    }

    #[test]
    fn log_line() {
        let event = WatchEvent::Log(LogEntry {
            at: at(),
            level: LogLevel::Error,
            message: "Network error: Connection refused".into(),
        });
        assert_eq!(
            event.line(),
            "12:30:05 error  Network error: Connection refused"
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "log");
        assert_eq!(json["level"], "error");
    }
}
