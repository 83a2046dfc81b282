pub mod states;

use crate::config::{SocketConfig, TransportKind};
use crate::socket::Socket;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for `Socket`
///
/// The address is required; `build()` only exists once it is set.
/// Everything else falls back to the defaults of `SocketConfig::new`.
pub struct SocketBuilder<A>
where
    A: AddressState,
{
    _state: TypeState<A>,
    config: SocketConfig,
}

impl SocketBuilder<NoAddress> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            config: SocketConfig::new(String::new(), MessageMode::Binary),
        }
    }

    pub fn address(self, address: impl Into<String>) -> SocketBuilder<HasAddress> {
        let mut config = self.config;
        config.address = address.into();
        SocketBuilder {
            _state: TypeState::new(),
            config,
        }
    }
}

impl Default for SocketBuilder<NoAddress> {
    fn default() -> Self {
        Self::new()
    }
}

// Optional configuration methods
impl<A> SocketBuilder<A>
where
    A: AddressState,
{
    pub fn mode(mut self, mode: MessageMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Frame every message as text instead of binary
    pub fn text_messages(self) -> Self {
        self.mode(MessageMode::Text)
    }

    /// Set the upper bound for one sent chunk and one receive
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Set how often a pending receive re-checks whether the connection aborted
    ///
    /// This bounds how long the receive loop can stay parked on a peer that
    /// vanished without a close frame.
    pub fn abort_poll_interval(mut self, interval: Duration) -> Self {
        self.config.abort_poll_interval = interval;
        self
    }

    /// Set how long the normal-closure acknowledgement may take
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// Drive the native transport with a custom socket stack
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.config.transport = TransportKind::Native(Arc::new(connector));
        self
    }

    /// Use a host-provided socket instead of the native transport
    pub fn host_bridge(mut self, bridge: impl HostBridge) -> Self {
        self.config.transport = TransportKind::Host(Arc::new(bridge));
        self
    }

    pub fn transport(mut self, transport: TransportKind) -> Self {
        self.config.transport = transport;
        self
    }
}

// Build methods - only available once the address is set
impl SocketBuilder<HasAddress> {
    /// Validate and return the configuration without creating a socket
    pub fn build_config(self) -> Result<SocketConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    pub fn build(self) -> Result<Socket> {
        Socket::with_config(self.build_config()?)
    }
}
