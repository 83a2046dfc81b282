use crate::config::SocketConfig;
use crate::traits::*;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Transport backed by a socket the host runtime owns
///
/// Every call is forwarded through the bridge with the handle obtained on
/// Connect. Unlike `NativeSocket`, reads can target a caller buffer via
/// `read_payload_queue_into`, which leaves an oversized message queued.
pub struct HostSocket {
    config: SocketConfig,
    bridge: Arc<dyn HostBridge>,
    handle: RwLock<Option<HostHandle>>,
}

impl HostSocket {
    pub fn new(config: SocketConfig, bridge: Arc<dyn HostBridge>) -> Self {
        Self {
            config,
            bridge,
            handle: RwLock::new(None),
        }
    }

    /// Handle assigned by the host, once connected
    pub fn handle(&self) -> Option<HostHandle> {
        *self.handle.read()
    }

    fn require_handle(&self, operation: &str) -> Result<HostHandle> {
        self.handle().ok_or_else(|| {
            PollSockError::NotConnected(format!("{} used before Connect", operation))
        })
    }

    /// Move the oldest message into `buffer`, returning its length
    ///
    /// Fails with `BufferTooSmall` when the message does not fit; the
    /// message then stays queued and the call can be retried with a
    /// buffer of at least `required` bytes.
    pub fn read_payload_queue_into(&self, buffer: &mut [u8]) -> Result<usize> {
        let handle = self.require_handle("ReadPayloadQueue")?;
        if !self.bridge.has_unread_payload_queue(handle) {
            return Err(PollSockError::QueueEmpty);
        }

        let required = self.bridge.read_payload_queue(handle, buffer);
        if required > buffer.len() {
            return Err(PollSockError::BufferTooSmall {
                required,
                provided: buffer.len(),
            });
        }
        Ok(required)
    }
}

impl WebSocketTransport for HostSocket {
    fn is_connected(&self) -> bool {
        self.handle()
            .map(|handle| self.bridge.is_connected(handle))
            .unwrap_or(false)
    }

    fn has_unread_payload_queue(&self) -> bool {
        self.handle()
            .map(|handle| self.bridge.has_unread_payload_queue(handle))
            .unwrap_or(false)
    }

    fn read_payload_queue(&self) -> Result<Vec<u8>> {
        // Probe with an empty buffer to learn the size, then read for real
        let mut buffer = Vec::new();
        loop {
            match self.read_payload_queue_into(&mut buffer) {
                Ok(len) => {
                    buffer.truncate(len);
                    return Ok(buffer);
                }
                Err(PollSockError::BufferTooSmall { required, .. }) => {
                    buffer.resize(required, 0);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn connect(&self) -> Result<()> {
        let mut guard = self.handle.write();
        if let Some(handle) = *guard {
            return Err(PollSockError::InvalidState(format!(
                "host socket {} already connected",
                handle
            )));
        }

        let handle = self.bridge.connect(&self.config.address, self.config.mode);
        info!("Host socket {} connecting to {}", handle, self.config.address);
        *guard = Some(handle);
        Ok(())
    }

    fn send(&self, payload: &[u8]) -> Result<()> {
        let handle = self.require_handle("Send")?;
        if !self.bridge.is_connected(handle) {
            return Err(PollSockError::NotConnected(format!(
                "host socket {} is not open",
                handle
            )));
        }
        self.bridge.send(handle, payload);
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        let handle = self.handle().ok_or_else(|| {
            PollSockError::InvalidState("Disconnect used before Connect".into())
        })?;
        debug!("Host socket {} disconnect requested", handle);
        self.bridge.disconnect(handle);
        Ok(())
    }

    fn dispose(&self) {
        if let Some(handle) = self.handle() {
            if self.bridge.is_connected(handle) {
                self.bridge.disconnect(handle);
            }
        }
    }
}
