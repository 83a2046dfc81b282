//! # PollSock Traits
//!
//! Seams and shared types for the pollsock WebSocket client:
//!
//! - **WebSocketTransport**: the capability set every transport variant exposes
//! - **Connector / FrameReader / FrameWriter**: the socket stack driven by the native receive loop
//! - **HostBridge**: foreign socket operations keyed by an opaque handle
//!
//! ## Example
//!
//! ```rust,ignore
//! use pollsock::*;
//!
//! // Plug a custom socket stack under the native transport
//! struct MyConnector;
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     async fn connect(&self, address: &str, mode: MessageMode) -> Result<Channel> {
//!         // Perform the handshake here
//!         todo!()
//!     }
//! }
//! ```

pub mod connector;
pub mod error;
pub mod host;
pub mod message;
pub mod transport;

// Re-export commonly used types
pub use connector::{AbortFlag, Channel, Connector, FrameReader, FrameWriter};
pub use error::{PollSockError, Result};
pub use host::{HostBridge, HostHandle};
pub use message::{Fragment, FragmentKind, MessageMode, OutboundChunk};
pub use transport::WebSocketTransport;
