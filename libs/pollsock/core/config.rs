use crate::chunking::MAX_PAYLOAD_CHUNK_SIZE;
use crate::traits::*;
use crate::transport::TungsteniteConnector;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default interval at which a pending receive re-checks the abort flag
pub const DEFAULT_ABORT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default bound on sending the normal-closure acknowledgement
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Which transport variant the facade drives
///
/// Chosen once, when the socket is configured; the facade never switches
/// variants afterwards.
#[derive(Clone)]
pub enum TransportKind {
    /// Native socket stack driven by the connect/receive loop
    Native(Arc<dyn Connector>),
    /// Socket owned by a host runtime, reached through opaque handles
    Host(Arc<dyn HostBridge>),
}

impl TransportKind {
    pub fn is_native(&self) -> bool {
        matches!(self, TransportKind::Native(_))
    }

    pub fn is_host(&self) -> bool {
        matches!(self, TransportKind::Host(_))
    }
}

impl Default for TransportKind {
    fn default() -> Self {
        TransportKind::Native(Arc::new(TungsteniteConnector::new()))
    }
}

impl fmt::Debug for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Native(_) => f.write_str("Native"),
            TransportKind::Host(_) => f.write_str("Host"),
        }
    }
}

/// Configuration for one socket
///
/// Built with `pollsock::builder()` or `SocketConfig::new`.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// WebSocket URL (ws:// or wss://)
    pub(crate) address: String,

    /// Framing of every outbound message
    pub(crate) mode: MessageMode,

    /// Upper bound for one sent chunk and for one receive
    pub(crate) max_chunk_size: usize,

    /// How often a pending receive re-checks the abort flag
    pub(crate) abort_poll_interval: Duration,

    /// How long the closure acknowledgement may take before the
    /// connection is released anyway
    pub(crate) close_timeout: Duration,

    pub(crate) transport: TransportKind,
}

impl SocketConfig {
    /// Create a configuration with default tuning and the native transport
    pub fn new(address: impl Into<String>, mode: MessageMode) -> Self {
        Self {
            address: address.into(),
            mode,
            max_chunk_size: MAX_PAYLOAD_CHUNK_SIZE,
            abort_poll_interval: DEFAULT_ABORT_POLL_INTERVAL,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            transport: TransportKind::default(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn mode(&self) -> MessageMode {
        self.mode
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn abort_poll_interval(&self) -> Duration {
        self.abort_poll_interval
    }

    pub fn close_timeout(&self) -> Duration {
        self.close_timeout
    }

    pub fn transport(&self) -> &TransportKind {
        &self.transport
    }

    /// Reject settings the receive loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(PollSockError::Configuration("address is empty".into()));
        }
        if self.max_chunk_size == 0 {
            return Err(PollSockError::Configuration(
                "max_chunk_size must be greater than zero".into(),
            ));
        }
        if self.abort_poll_interval.is_zero() {
            return Err(PollSockError::Configuration(
                "abort_poll_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
