use thiserror::Error;

/// Main error type for pollsock
#[derive(Error, Debug)]
pub enum PollSockError {
    /// Operation requires an open connection
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// Operation issued in the wrong order (e.g. Disconnect before Connect)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The underlying connection failed involuntarily
    ///
    /// Only produced by transport seams; callers observe it as
    /// `ConnectionState::Aborted`, never as a returned error.
    #[error("Transport aborted: {0}")]
    TransportAborted(String),

    /// Caller-supplied read buffer cannot hold the oldest queued message
    ///
    /// The message stays queued. Host-provided transport only.
    #[error("Buffer too small: message needs {required} bytes, buffer holds {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// Dequeue attempted while the delivery queue is empty
    #[error("Payload queue is empty")]
    QueueEmpty,

    /// WebSocket protocol or handshake error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No async runtime available to drive the connection
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type for pollsock operations
pub type Result<T> = std::result::Result<T, PollSockError>;
