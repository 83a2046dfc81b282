use crate::connection_state::Metrics;
use crate::error::Result;

/// Uniform capability set shared by every transport variant
///
/// All operations return without waiting on the network. Connect and
/// Disconnect only start the work; callers poll `is_connected` and
/// `has_unread_payload_queue` to observe progress.
pub trait WebSocketTransport: Send + Sync {
    /// True only while the connection is open
    fn is_connected(&self) -> bool;

    /// True while at least one complete message awaits dequeue
    ///
    /// Independent of connection state: messages queued before closure
    /// stay readable.
    fn has_unread_payload_queue(&self) -> bool;

    /// Remove and return the oldest complete message
    fn read_payload_queue(&self) -> Result<Vec<u8>>;

    /// Start connecting
    fn connect(&self) -> Result<()>;

    /// Queue `payload` for transmission as one message
    fn send(&self, payload: &[u8]) -> Result<()>;

    /// Request disconnection; idempotent
    fn disconnect(&self) -> Result<()>;

    /// Release everything held by the transport
    fn dispose(&self);

    /// Traffic counters, when the transport keeps them
    fn metrics(&self) -> Option<Metrics> {
        None
    }
}
