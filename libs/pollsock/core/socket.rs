use crate::config::{SocketConfig, TransportKind};
use crate::connection_state::Metrics;
use crate::host_socket::HostSocket;
use crate::native::NativeSocket;
use crate::traits::*;
use parking_lot::RwLock;
use tracing::debug;

/// Universal WebSocket client
///
/// Forwards every call to the transport variant named by its
/// configuration. The variant is created on the first Connect and never
/// replaced; until then only the state queries are meaningful.
///
/// ```rust,ignore
/// use pollsock::*;
///
/// let socket = Socket::new("ws://127.0.0.1:9001", MessageMode::Binary);
/// socket.connect()?;
///
/// // later, from the caller's own loop
/// if socket.is_connected() {
///     socket.send(&[1, 0, 42])?;
/// }
/// while socket.has_unread_payload_queue() {
///     let message = socket.read_payload_queue()?;
/// }
/// socket.disconnect()?;
/// ```
pub struct Socket {
    config: SocketConfig,
    transport: RwLock<Option<Box<dyn WebSocketTransport>>>,
}

impl Socket {
    /// Create a socket for `address` with default tuning
    pub fn new(address: impl Into<String>, mode: MessageMode) -> Self {
        Self {
            config: SocketConfig::new(address, mode),
            transport: RwLock::new(None),
        }
    }

    pub fn with_config(config: SocketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    /// Check whether Connect has selected a transport variant
    pub fn is_selected(&self) -> bool {
        self.transport.read().is_some()
    }

    fn select_transport(&self) -> Box<dyn WebSocketTransport> {
        match &self.config.transport {
            TransportKind::Native(connector) => {
                debug!("Selecting native transport");
                Box::new(NativeSocket::new(self.config.clone(), connector.clone()))
            }
            TransportKind::Host(bridge) => {
                debug!("Selecting host-provided transport");
                Box::new(HostSocket::new(self.config.clone(), bridge.clone()))
            }
        }
    }

    fn before_connect(operation: &str) -> PollSockError {
        PollSockError::InvalidState(format!(
            "Trying to use {} before calling Connect",
            operation
        ))
    }
}

impl WebSocketTransport for Socket {
    fn is_connected(&self) -> bool {
        self.transport
            .read()
            .as_ref()
            .map(|transport| transport.is_connected())
            .unwrap_or(false)
    }

    fn has_unread_payload_queue(&self) -> bool {
        self.transport
            .read()
            .as_ref()
            .map(|transport| transport.has_unread_payload_queue())
            .unwrap_or(false)
    }

    fn read_payload_queue(&self) -> Result<Vec<u8>> {
        self.transport
            .read()
            .as_ref()
            .ok_or_else(|| Self::before_connect("ReadPayloadQueue"))?
            .read_payload_queue()
    }

    fn connect(&self) -> Result<()> {
        self.config.validate()?;

        let mut guard = self.transport.write();
        if guard.is_some() {
            return Err(PollSockError::InvalidState(
                "Connect called more than once; a socket connects a single time".into(),
            ));
        }

        let transport = self.select_transport();
        transport.connect()?;
        *guard = Some(transport);
        Ok(())
    }

    fn send(&self, payload: &[u8]) -> Result<()> {
        let guard = self.transport.read();
        let transport = guard
            .as_ref()
            .ok_or_else(|| Self::before_connect("Send"))?;

        if !transport.is_connected() {
            return Err(PollSockError::InvalidState(
                "Trying to use Send while not connected".into(),
            ));
        }

        transport.send(payload)
    }

    fn disconnect(&self) -> Result<()> {
        self.transport
            .read()
            .as_ref()
            .ok_or_else(|| Self::before_connect("Disconnect"))?
            .disconnect()
    }

    fn dispose(&self) {
        if let Some(transport) = self.transport.read().as_ref() {
            transport.dispose();
        }
    }

    fn metrics(&self) -> Option<Metrics> {
        self.transport
            .read()
            .as_ref()
            .and_then(|transport| transport.metrics())
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        self.dispose();
    }
}
