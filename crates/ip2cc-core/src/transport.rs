// ── Transport contract ──
//
// The adapter only needs five things from a socket: open it, close it,
// ask whether it is up, write bytes, and be told about status/errors.
// `Connector` + `Transport` capture exactly that, so tests can swap in
// a recording fake and the CLI can plug in the tokio client.

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::debug;

use ip2cc_api::{ClientConfig, LinkObserver, TcpClient};

/// A live (or connecting) link owned by the adapter.
pub trait Transport: Send {
    /// `true` only while the socket is established and writable.
    fn is_connected(&self) -> bool;

    /// Best-effort write. Never waits for the bytes to leave.
    fn send(&self, data: &[u8]) -> Result<(), ip2cc_api::Error>;

    /// Close and release the link. Safe to call more than once.
    fn destroy(&mut self);
}

/// Factory for [`Transport`]s.
pub trait Connector: Send + Sync {
    /// Start connecting to `host:port`. Must not block; connection
    /// progress is reported through `observer`.
    fn connect(&self, host: &str, port: u16, observer: Arc<dyn LinkObserver>) -> Box<dyn Transport>;
}

// ── TcpConnector ─────────────────────────────────────────────────────

/// [`Connector`] producing tokio-backed [`TcpClient`]s.
///
/// Keeps the tasks of destroyed links so callers can
/// [`wait_idle`](Self::wait_idle) for pending writes to flush. Finished
/// tasks are dropped on the next destroy.
#[derive(Debug, Default)]
pub struct TcpConnector {
    config: ClientConfig,
    closing: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TcpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            closing: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Wait until every destroyed link has flushed and closed.
    pub async fn wait_idle(&self) {
        let handles: Vec<_> = self
            .closing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                debug!(error = %e, "link task ended abnormally");
            }
        }
    }
}

impl Connector for TcpConnector {
    fn connect(&self, host: &str, port: u16, observer: Arc<dyn LinkObserver>) -> Box<dyn Transport> {
        let client = TcpClient::connect(host, port, self.config.clone(), observer);
        Box::new(TcpTransport {
            client,
            closing: Arc::clone(&self.closing),
        })
    }
}

struct TcpTransport {
    client: TcpClient,
    closing: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Transport for TcpTransport {
    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    fn send(&self, data: &[u8]) -> Result<(), ip2cc_api::Error> {
        self.client.send(Bytes::copy_from_slice(data))
    }

    fn destroy(&mut self) {
        if let Some(task) = self.client.destroy() {
            let mut closing = self.closing.lock().unwrap_or_else(PoisonError::into_inner);
            closing.retain(|h| !h.is_finished());
            closing.push(task);
        }
    }
}
