use thiserror::Error;

/// Top-level error type for the `ip2cc-api` crate.
///
/// Covers every failure mode of the device link: connecting, writing,
/// and using a client after it has been torn down. `ip2cc-core` maps
/// these into adapter-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// TCP connect failed (refused, unreachable, DNS failure, etc.)
    #[error("Connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connect attempt did not complete in time.
    #[error("Connection to {addr} timed out after {timeout_secs}s")]
    Timeout { addr: String, timeout_secs: u64 },

    /// Read or write failure on an established socket.
    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    // ── Usage ───────────────────────────────────────────────────────
    /// Send attempted while the socket is not established.
    #[error("Not connected")]
    NotConnected,

    /// The client has been destroyed.
    #[error("Connection closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_names_address() {
        let err = Error::Connect {
            addr: "10.0.0.5:4998".into(),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert!(err.to_string().starts_with("Connection to 10.0.0.5:4998 failed"));
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = Error::Timeout {
            addr: "10.0.0.5:4998".into(),
            timeout_secs: 5,
        };
        assert_eq!(
            err.to_string(),
            "Connection to 10.0.0.5:4998 timed out after 5s"
        );
        assert_eq!(Error::Closed.to_string(), "Connection closed");
    }
}
