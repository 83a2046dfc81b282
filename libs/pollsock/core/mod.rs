//! # PollSock Core
//!
//! The native transport and the facade in front of it:
//!
//! - **Frame Accumulator**: reassembles received fragments into whole messages
//! - **Delivery Queue**: lock-free FIFO of complete messages awaiting the caller
//! - **Connect/Receive Loop**: spawned task owning the connection
//! - **Send Path**: serialized, chunked transmission of outbound messages
//! - **Socket**: uniform capability set over native and host-provided transports
//!
//! ## Example
//!
//! ```rust,ignore
//! use pollsock::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let socket = pollsock::builder()
//!         .address("ws://127.0.0.1:9001")
//!         .text_messages()
//!         .build()?;
//!
//!     socket.connect()?;
//!     while !socket.is_connected() {
//!         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     }
//!
//!     socket.send(b"henlo")?;
//!     while !socket.has_unread_payload_queue() {
//!         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     }
//!     println!("{:?}", socket.read_payload_queue()?);
//!
//!     socket.disconnect()?;
//!     Ok(())
//! }
//! ```

pub mod accumulator;
pub mod builder;
pub mod chunking;
pub mod config;
pub mod connection_state;
pub mod host_socket;
pub mod native;
pub mod queue;
pub(crate) mod receive_loop;
pub(crate) mod send_path;
pub mod signal;
pub mod socket;

// Re-export main types
pub use accumulator::FrameAccumulator;
pub use builder::{states, SocketBuilder};
pub use chunking::{chunk_count, chunks, OutboundChunks, MAX_PAYLOAD_CHUNK_SIZE};
pub use config::{SocketConfig, TransportKind};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
pub use host_socket::HostSocket;
pub use native::NativeSocket;
pub use queue::{delivery_queue, DeliveryQueue, QueueProducer};
pub use signal::DisconnectSignal;
pub use socket::Socket;

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new socket builder
///
/// # Example
/// ```ignore
/// let socket = pollsock::builder()
///     .address("wss://echo.example.com")
///     .max_chunk_size(4096)
///     .build()?;
/// ```
pub fn builder() -> SocketBuilder<builder::states::NoAddress> {
    SocketBuilder::new()
}
