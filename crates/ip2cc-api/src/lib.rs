// ip2cc-api: Async TCP client for iTach IP2CC relay units

pub mod error;
pub mod status;
pub mod tcp;
pub mod transport;

pub use error::Error;
pub use status::Status;
pub use tcp::{LinkObserver, TcpClient};
pub use transport::{ClientConfig, DEFAULT_PORT, ReconnectConfig};
