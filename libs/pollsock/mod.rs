//! # PollSock
//!
//! A non-blocking, poll-based WebSocket client.
//!
//! ## Features
//!
//! - **Never blocks the caller**: Connect and Disconnect only start work; progress is polled
//! - **Whole messages only**: fragments are reassembled before a message becomes readable
//! - **Hang-free teardown**: handshake and receive are raced against disconnect and abort
//! - **Bounded chunks**: outbound payloads go out as ordered, non-interleaved chunks
//! - **Pluggable transports**: native tokio-tungstenite stack or a host-provided socket

pub mod core;
pub mod traits;
pub mod transport;

// Re-export all traits
pub use traits::*;

// Re-export core functionality
pub use self::core::{
    accumulator, builder, chunking, config, connection_state, host_socket, native, queue, signal,
    socket,
    builder::{states, SocketBuilder},
    config::{SocketConfig, TransportKind},
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics},
    host_socket::HostSocket,
    native::NativeSocket,
    socket::Socket,
    chunking::{chunk_count, chunks, OutboundChunks},
    FrameAccumulator, MAX_PAYLOAD_CHUNK_SIZE,
};
pub(crate) use self::core::{receive_loop, send_path};

pub use transport::TungsteniteConnector;

// Convenience function
pub use self::core::builder as socket_builder;
