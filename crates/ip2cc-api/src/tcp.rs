//! Persistent TCP link to an iTach unit with auto-reconnect.
//!
//! [`TcpClient::connect`] spawns a background task that owns the socket.
//! The task connects, forwards queued writes, discards whatever the unit
//! sends back, and reconnects with exponential backoff + jitter when the
//! link drops. Status transitions are pushed to a [`LinkObserver`] and
//! mirrored on a [`tokio::sync::watch`] channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ip2cc_api::{ClientConfig, TcpClient, DEFAULT_PORT};
//!
//! let mut client = TcpClient::connect("10.0.0.5", DEFAULT_PORT, ClientConfig::default(), observer);
//! client.status().wait_for(|s| *s == ip2cc_api::Status::Ok).await?;
//! client.send("setstate,1:1,1\r\n")?;
//! if let Some(task) = client.destroy() {
//!     task.await?;
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::Error;
use crate::status::Status;
use crate::transport::{ClientConfig, calculate_backoff};

const INBOUND_BUFFER_SIZE: usize = 512;

// ── LinkObserver ─────────────────────────────────────────────────────

/// Receives link notifications from the background task.
///
/// Called from the tokio task that owns the socket, never from the
/// thread that calls [`TcpClient::send`].
pub trait LinkObserver: Send + Sync {
    /// Link health changed.
    fn on_status(&self, status: Status, message: Option<&str>);

    /// A transport-level failure occurred.
    fn on_error(&self, error: &Error);
}

// ── TcpClient ────────────────────────────────────────────────────────

enum Outgoing {
    Data(Bytes),
    Close,
}

/// Handle to a running device link.
///
/// Call [`destroy`](Self::destroy) for a graceful close that flushes
/// accepted writes. Dropping the handle without destroying it aborts the
/// link immediately.
pub struct TcpClient {
    host: String,
    port: u16,
    outgoing_tx: Option<mpsc::UnboundedSender<Outgoing>>,
    status_rx: watch::Receiver<Status>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TcpClient {
    /// Spawn the link task for `host:port`.
    ///
    /// Returns immediately. The first connection attempt happens
    /// asynchronously; watch [`status`](Self::status) or the observer to
    /// learn when the link is up. Must be called within a tokio runtime.
    pub fn connect(
        host: impl Into<String>,
        port: u16,
        config: ClientConfig,
        observer: Arc<dyn LinkObserver>,
    ) -> Self {
        let host = host.into();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(Status::Unknown);
        let cancel = CancellationToken::new();

        let link = Link {
            host: host.clone(),
            port,
            config,
            status_tx,
            observer,
        };
        let task = tokio::spawn(link.run(outgoing_rx, cancel.clone()));

        Self {
            host,
            port,
            outgoing_tx: Some(outgoing_tx),
            status_rx,
            cancel,
            task: Some(task),
        }
    }

    /// `true` only while the socket is established and accepting writes.
    pub fn is_connected(&self) -> bool {
        self.outgoing_tx.is_some() && *self.status_rx.borrow() == Status::Ok
    }

    /// Subscribe to link status changes.
    pub fn status(&self) -> watch::Receiver<Status> {
        self.status_rx.clone()
    }

    /// Queue bytes for the socket. Never waits for the write.
    pub fn send(&self, data: impl Into<Bytes>) -> Result<(), Error> {
        let Some(tx) = &self.outgoing_tx else {
            return Err(Error::Closed);
        };
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        tx.send(Outgoing::Data(data.into()))
            .map_err(|_| Error::Closed)
    }

    /// Close the link once every accepted write is flushed.
    ///
    /// Returns the link task so callers may await the close. Later calls
    /// return `None` and do nothing.
    pub fn destroy(&mut self) -> Option<JoinHandle<()>> {
        let tx = self.outgoing_tx.take()?;
        debug!(host = %self.host, port = self.port, "destroying link");
        let _ = tx.send(Outgoing::Close);
        self.task.take()
    }
}

impl Drop for TcpClient {
    fn drop(&mut self) {
        if self.outgoing_tx.is_some() {
            self.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for TcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpClient")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("status", &*self.status_rx.borrow())
            .field("destroyed", &self.outgoing_tx.is_none())
            .finish_non_exhaustive()
    }
}

// ── Background link task ─────────────────────────────────────────────

struct Link {
    host: String,
    port: u16,
    config: ClientConfig,
    status_tx: watch::Sender<Status>,
    observer: Arc<dyn LinkObserver>,
}

enum SessionEnd {
    /// Close requested by the owner; stop for good.
    Closed,
    /// The unit hung up; reconnect.
    PeerClosed,
}

impl Link {
    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn publish(&self, status: Status, message: Option<&str>) {
        self.status_tx.send_replace(status);
        self.observer.on_status(status, message);
    }

    fn fail(&self, error: &Error) {
        warn!(addr = %self.addr(), error = %error, "link error");
        self.observer.on_error(error);
        self.publish(Status::Error, Some(&error.to_string()));
    }

    /// Main loop: connect → session → on drop, backoff → reconnect.
    async fn run(self, mut outgoing: mpsc::UnboundedReceiver<Outgoing>, cancel: CancellationToken) {
        let mut attempt: u32 = 0;
        let mut closed = false;

        loop {
            if drain_stale(&mut outgoing) {
                closed = true;
                break;
            }

            self.publish(Status::Warning, Some("Connecting"));

            let opened = tokio::select! {
                biased;
                () = cancel.cancelled() => { closed = true; break; }
                () = wait_for_close(&mut outgoing) => { closed = true; break; }
                result = open_stream(&self.host, self.port, self.config.connect_timeout) => result,
            };

            match opened {
                Ok(stream) => {
                    attempt = 0;
                    info!(addr = %self.addr(), "connected");
                    self.publish(Status::Ok, None);

                    match session(stream, &mut outgoing, &cancel).await {
                        Ok(SessionEnd::Closed) => {
                            closed = true;
                            break;
                        }
                        Ok(SessionEnd::PeerClosed) => {
                            info!(addr = %self.addr(), "peer closed connection");
                            self.publish(Status::Error, Some("Disconnected"));
                        }
                        Err(e) => self.fail(&e),
                    }
                }
                Err(e) => self.fail(&e),
            }

            if let Some(max) = self.config.reconnect.max_retries {
                if attempt >= max {
                    warn!(
                        addr = %self.addr(),
                        max_retries = max,
                        "reconnection limit reached, giving up"
                    );
                    break;
                }
            }

            let delay = calculate_backoff(attempt, &self.config.reconnect);
            debug!(
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                attempt,
                "waiting before reconnect"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => { closed = true; break; }
                () = wait_for_close(&mut outgoing) => { closed = true; break; }
                () = tokio::time::sleep(delay) => {}
            }

            attempt = attempt.saturating_add(1);
        }

        // Owners never hear from a link after they closed it.
        if closed {
            self.status_tx.send_replace(Status::Unknown);
        }
        debug!(addr = %self.addr(), "link task exiting");
    }
}

async fn open_stream(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, Error> {
    let addr = format!("{host}:{port}");
    debug!(addr = %addr, "connecting");

    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            stream.set_nodelay(true)?;
            Ok(stream)
        }
        Ok(Err(source)) => Err(Error::Connect { addr, source }),
        Err(_) => Err(Error::Timeout {
            addr,
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Pump queued writes to the socket until the owner closes or the peer drops.
async fn session(
    stream: TcpStream,
    outgoing: &mut mpsc::UnboundedReceiver<Outgoing>,
    cancel: &CancellationToken,
) -> Result<SessionEnd, Error> {
    let (mut reader, mut writer) = stream.into_split();
    let mut inbound = [0u8; INBOUND_BUFFER_SIZE];

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(SessionEnd::Closed),
            msg = outgoing.recv() => match msg {
                Some(Outgoing::Data(bytes)) => {
                    writer.write_all(&bytes).await?;
                    trace!(len = bytes.len(), "wrote bytes");
                }
                Some(Outgoing::Close) | None => {
                    writer.flush().await?;
                    if let Err(e) = writer.shutdown().await {
                        debug!(error = %e, "socket shutdown failed");
                    }
                    return Ok(SessionEnd::Closed);
                }
            },
            read = reader.read(&mut inbound) => match read? {
                0 => return Ok(SessionEnd::PeerClosed),
                n => trace!(len = n, "discarding inbound bytes"),
            },
        }
    }
}

/// Drop writes queued while the link was down. Returns `true` if the
/// owner asked to close in the meantime.
fn drain_stale(outgoing: &mut mpsc::UnboundedReceiver<Outgoing>) -> bool {
    let mut dropped = 0usize;
    loop {
        match outgoing.try_recv() {
            Ok(Outgoing::Data(_)) => dropped += 1,
            Ok(Outgoing::Close) | Err(mpsc::error::TryRecvError::Disconnected) => return true,
            Err(mpsc::error::TryRecvError::Empty) => break,
        }
    }
    if dropped > 0 {
        debug!(dropped, "discarded writes queued while disconnected");
    }
    false
}

/// Resolves once the owner closes; writes arriving meanwhile are dropped.
async fn wait_for_close(outgoing: &mut mpsc::UnboundedReceiver<Outgoing>) {
    while let Some(msg) = outgoing.recv().await {
        match msg {
            Outgoing::Data(_) => debug!("dropping write, link not established"),
            Outgoing::Close => return,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;

    use tokio::net::TcpListener;

    use super::*;
    use crate::transport::ReconnectConfig;

    const WAIT: Duration = Duration::from_secs(5);

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<(Status, Option<String>)>>,
        errors: Mutex<Vec<String>>,
    }

    impl LinkObserver for Recorder {
        fn on_status(&self, status: Status, message: Option<&str>) {
            self.statuses
                .lock()
                .unwrap()
                .push((status, message.map(String::from)));
        }

        fn on_error(&self, error: &Error) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    fn fast_config(max_retries: Option<u32>) -> ClientConfig {
        ClientConfig {
            connect_timeout: Duration::from_secs(2),
            reconnect: ReconnectConfig {
                initial_delay: Duration::from_millis(20),
                max_delay: Duration::from_millis(100),
                max_retries,
            },
        }
    }

    async fn wait_status(client: &TcpClient, want: Status) {
        let mut rx = client.status();
        tokio::time::timeout(WAIT, rx.wait_for(|s| *s == want))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn connects_and_writes_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let recorder = Arc::new(Recorder::default());

        let mut client = TcpClient::connect("127.0.0.1", port, fast_config(None), recorder.clone());
        let (mut socket, _) = tokio::time::timeout(WAIT, listener.accept())
            .await
            .unwrap()
            .unwrap();
        wait_status(&client, Status::Ok).await;
        assert!(client.is_connected());

        client.send("setstate,1:1,1\r\n").unwrap();
        let mut buf = [0u8; 16];
        tokio::time::timeout(WAIT, socket.read_exact(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf, b"setstate,1:1,1\r\n");

        let task = client.destroy().unwrap();
        tokio::time::timeout(WAIT, task).await.unwrap().unwrap();

        let statuses = recorder.statuses.lock().unwrap().clone();
        assert_eq!(
            statuses,
            vec![
                (Status::Warning, Some("Connecting".to_string())),
                (Status::Ok, None),
            ]
        );
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn destroy_flushes_accepted_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut client = TcpClient::connect(
            "127.0.0.1",
            port,
            fast_config(None),
            Arc::new(Recorder::default()),
        );
        let (mut socket, _) = listener.accept().await.unwrap();
        wait_status(&client, Status::Ok).await;

        client.send("setstate,1:2,0\r\n").unwrap();
        client.send("setstate,1:3,1\r\n").unwrap();
        let task = client.destroy().unwrap();

        let mut received = Vec::new();
        tokio::time::timeout(WAIT, socket.read_to_end(&mut received))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, b"setstate,1:2,0\r\nsetstate,1:3,1\r\n");

        tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
        assert!(!client.is_connected());
        assert!(matches!(client.send("x"), Err(Error::Closed)));
        assert!(client.destroy().is_none());
    }

    #[tokio::test]
    async fn refused_connection_reports_error() {
        // Grab a free port, then close it so the connect is refused.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let recorder = Arc::new(Recorder::default());

        let client = TcpClient::connect("127.0.0.1", port, fast_config(Some(0)), recorder.clone());
        wait_status(&client, Status::Error).await;

        assert!(!client.is_connected());
        assert!(matches!(client.send("x"), Err(Error::NotConnected)));

        let errors = recorder.errors.lock().unwrap().clone();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(&format!("127.0.0.1:{port}")), "{errors:?}");
    }

    #[tokio::test]
    async fn reconnects_after_peer_hangs_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let recorder = Arc::new(Recorder::default());

        let mut client = TcpClient::connect("127.0.0.1", port, fast_config(None), recorder.clone());

        let (first, _) = listener.accept().await.unwrap();
        wait_status(&client, Status::Ok).await;
        drop(first);

        let (_second, _) = tokio::time::timeout(WAIT, listener.accept())
            .await
            .unwrap()
            .unwrap();
        wait_status(&client, Status::Ok).await;

        let statuses = recorder.statuses.lock().unwrap().clone();
        assert!(
            statuses.contains(&(Status::Error, Some("Disconnected".to_string()))),
            "{statuses:?}"
        );

        let task = client.destroy().unwrap();
        tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn destroy_during_backoff_stops_task() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig {
            connect_timeout: Duration::from_secs(2),
            reconnect: ReconnectConfig {
                initial_delay: Duration::from_secs(60),
                max_delay: Duration::from_secs(60),
                max_retries: None,
            },
        };
        let recorder = Arc::new(Recorder::default());

        let mut client = TcpClient::connect("127.0.0.1", port, config, recorder.clone());
        wait_status(&client, Status::Error).await;

        let task = client.destroy().unwrap();
        tokio::time::timeout(WAIT, task).await.unwrap().unwrap();

        // No notifications after the owner closed the link.
        let last = recorder.statuses.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.0, Status::Error);
        assert_eq!(*client.status().borrow(), Status::Unknown);
    }
}
