use crate::error::Result;
use crate::message::{Fragment, MessageMode, OutboundChunk};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared marker for a connection that became unusable
///
/// Either half of a channel may trip it; the receive loop polls it so a
/// receive that will never resolve does not keep the loop alive.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the connection as aborted
    pub fn trip(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Receiving half of a live connection
#[async_trait]
pub trait FrameReader: Send + 'static {
    /// Receive the next fragment, at most `max_len` bytes of payload
    ///
    /// Must be cancel-safe: the receive loop drops this future when
    /// disconnect is requested or the connection aborts, and nothing
    /// already received may be lost when that happens.
    async fn receive(&mut self, max_len: usize) -> Result<Fragment>;
}

/// Sending half of a live connection
#[async_trait]
pub trait FrameWriter: Send + 'static {
    /// Transmit one chunk of an outbound message
    async fn send_chunk(&mut self, chunk: OutboundChunk<'_>) -> Result<()>;

    /// Send the normal-closure acknowledgement
    async fn close(&mut self) -> Result<()>;
}

/// A freshly handshaken connection, split into its halves
pub struct Channel {
    pub reader: Box<dyn FrameReader>,
    pub writer: Box<dyn FrameWriter>,
    pub abort: AbortFlag,
}

impl Channel {
    pub fn new(
        reader: impl FrameReader,
        writer: impl FrameWriter,
        abort: AbortFlag,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            abort,
        }
    }
}

/// Performs the opening handshake for the native transport
///
/// Implement this trait to plug a different socket stack under the
/// receive loop. The default is `TungsteniteConnector`.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection to `address`
    ///
    /// The returned future is dropped without completion when a
    /// disconnect arrives first.
    async fn connect(&self, address: &str, mode: MessageMode) -> Result<Channel>;
}
