//! `ip2cc set <port> <open|close>`: one-shot relay switch.
//!
//! Drives the adapter through the same lifecycle a control surface would:
//! initialize, wait for the link, dispatch `portSet`, shut down, and wait
//! for the queued line to be flushed before exiting.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use ip2cc_core::{
    ActionInvocation, ChannelHost, Command, DeviceModule, DispatchOutcome, Port, RelayAdapter,
    RelayState, Status, TcpConnector,
};

use crate::cli::{GlobalOpts, SetArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct SetResult {
    device: String,
    port: u8,
    state: RelayState,
    command: String,
}

impl SetResult {
    fn detail(&self) -> String {
        let verb = match self.state {
            RelayState::Closed => "closed",
            RelayState::Open => "opened",
        };
        format!(
            "Port {} {verb} on {} ({})",
            self.port, self.device, self.command
        )
    }
}

pub async fn handle(args: SetArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let port = Port::try_from(args.port).map_err(|e| CliError::Validation {
        field: "port".into(),
        reason: e.to_string(),
    })?;
    let state = RelayState::from(args.state);
    let target = config::resolve_target(global, cfg)?;
    let addr = config::display_addr(&target);

    let host = Arc::new(ChannelHost::new());
    let connector = Arc::new(TcpConnector::new(config::client_config(cfg)));
    let mut status = host.subscribe_status();
    let mut adapter = RelayAdapter::new(target, host.clone(), connector.clone());

    adapter.initialize();

    let wait = Duration::from_secs(global.timeout);
    let connected = tokio::time::timeout(wait, status.wait_for(|r| r.status == Status::Ok))
        .await
        .is_ok_and(|res| res.is_ok());
    debug!(connected, %addr, "link ready");

    let outcome = if connected {
        adapter.dispatch(&ActionInvocation::port_set(port, state))
    } else {
        DispatchOutcome::NotConnected
    };
    let last = host.status();

    adapter.shutdown();
    connector.wait_idle().await;

    let command = match outcome {
        DispatchOutcome::Sent(command) => command,
        DispatchOutcome::NotConnected => {
            let reason = match last.message {
                Some(message) if last.status == Status::Error => message,
                _ => format!("No connection after {}s", global.timeout),
            };
            return Err(CliError::ConnectionFailed { addr, reason });
        }
        DispatchOutcome::SendFailed(reason) => {
            return Err(CliError::ConnectionFailed { addr, reason });
        }
        DispatchOutcome::UnknownAction(reason) | DispatchOutcome::InvalidOptions(reason) => {
            return Err(CliError::Rejected { reason });
        }
    };

    let result = result_for(&addr, command);
    let out = output::render_single(
        &config::output_format(global, cfg),
        &result,
        SetResult::detail,
        |r| r.command.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn result_for(addr: &str, command: Command) -> SetResult {
    SetResult {
        device: addr.to_owned(),
        port: command.port.number(),
        state: command.state,
        command: command.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_line() {
        let result = result_for("10.0.0.5:4998", Command::new(Port::Two, RelayState::Closed));
        assert_eq!(
            result.detail(),
            "Port 2 closed on 10.0.0.5:4998 (setstate,1:2,1)"
        );
        let result = result_for("10.0.0.5:4998", Command::new(Port::Three, RelayState::Open));
        assert_eq!(result.detail(), "Port 3 opened on 10.0.0.5:4998 (setstate,1:3,0)");
    }
}
