use crate::config::SocketConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
use crate::queue::{delivery_queue, DeliveryQueue, QueueProducer};
use crate::receive_loop::{run_connect_receive_loop, LoopContext};
use crate::send_path::Outbound;
use crate::signal::DisconnectSignal;
use crate::traits::*;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// Transport backed by the connect/receive loop
///
/// Connect spawns the loop on the current tokio runtime and returns at
/// once. The loop is the only writer of the connection state and the only
/// producer of the delivery queue; this handle reads both.
///
/// An instance connects at most once.
pub struct NativeSocket {
    config: SocketConfig,
    connector: Arc<dyn Connector>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    queue: DeliveryQueue,
    /// Moved into the loop on Connect
    producer: Mutex<Option<QueueProducer>>,
    outbound_tx: Mutex<Option<UnboundedSender<Outbound>>>,
    signal: DisconnectSignal,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NativeSocket {
    pub fn new(config: SocketConfig, connector: Arc<dyn Connector>) -> Self {
        let (producer, queue) = delivery_queue();
        Self {
            config,
            connector,
            state: Arc::new(AtomicConnectionState::default()),
            metrics: Arc::new(AtomicMetrics::new()),
            queue,
            producer: Mutex::new(Some(producer)),
            outbound_tx: Mutex::new(None),
            signal: DisconnectSignal::new(),
            task_handle: Mutex::new(None),
        }
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn mode(&self) -> MessageMode {
        self.config.mode
    }

    /// Check whether the loop task has run to completion
    pub fn is_finished(&self) -> bool {
        self.task_handle
            .lock()
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false)
    }
}

impl WebSocketTransport for NativeSocket {
    #[inline]
    fn is_connected(&self) -> bool {
        self.state.is_open()
    }

    #[inline]
    fn has_unread_payload_queue(&self) -> bool {
        self.queue.has_unread()
    }

    fn read_payload_queue(&self) -> Result<Vec<u8>> {
        self.queue.pop()
    }

    fn connect(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            PollSockError::Runtime(format!("Connect must be called inside a tokio runtime: {}", e))
        })?;

        self.state
            .compare_exchange(ConnectionState::Idle, ConnectionState::Connecting)
            .map_err(|observed| {
                PollSockError::InvalidState(format!(
                    "Connect called while connection is {}",
                    observed
                ))
            })?;

        let queue = self.producer.lock().take().ok_or_else(|| {
            PollSockError::InvalidState("delivery queue already handed to a receive loop".into())
        })?;

        let (outbound_tx, outbound_rx) = unbounded_channel();
        *self.outbound_tx.lock() = Some(outbound_tx.clone());

        let ctx = LoopContext {
            address: self.config.address.clone(),
            mode: self.config.mode,
            max_chunk_size: self.config.max_chunk_size,
            abort_poll_interval: self.config.abort_poll_interval,
            close_timeout: self.config.close_timeout,
            connector: Arc::clone(&self.connector),
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            queue,
            signal: self.signal.clone(),
        };

        let handle = runtime.spawn(run_connect_receive_loop(ctx, outbound_tx, outbound_rx));
        *self.task_handle.lock() = Some(handle);
        Ok(())
    }

    fn send(&self, payload: &[u8]) -> Result<()> {
        let state = self.state.get();
        if state != ConnectionState::Open {
            return Err(PollSockError::NotConnected(format!(
                "connection is not open, state = {}",
                state
            )));
        }

        let guard = self.outbound_tx.lock();
        let tx = guard.as_ref().ok_or_else(|| {
            PollSockError::NotConnected("send path has been released".into())
        })?;

        tx.send(Outbound::Payload(payload.to_vec()))
            .map_err(|_| PollSockError::NotConnected("send path has shut down".into()))
    }

    fn disconnect(&self) -> Result<()> {
        if !self.signal.is_cancelled() {
            debug!(address = %self.config.address, "Disconnect requested");
        }
        self.signal.cancel();
        Ok(())
    }

    fn dispose(&self) {
        self.signal.cancel();
        // The loop keeps its own sender for the closure handshake
        self.outbound_tx.lock().take();
    }

    fn metrics(&self) -> Option<Metrics> {
        Some(self.metrics.snapshot(self.state.get()))
    }
}

impl Drop for NativeSocket {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverConnector;

    #[async_trait::async_trait]
    impl Connector for NeverConnector {
        async fn connect(&self, _address: &str, _mode: MessageMode) -> Result<Channel> {
            std::future::pending().await
        }
    }

    fn socket() -> NativeSocket {
        NativeSocket::new(
            SocketConfig::new("ws://127.0.0.1:1", MessageMode::Binary),
            Arc::new(NeverConnector),
        )
    }

    #[test]
    fn test_fresh_socket_is_idle() {
        let socket = socket();
        assert_eq!(socket.connection_state(), ConnectionState::Idle);
        assert!(!socket.is_connected());
        assert!(!socket.has_unread_payload_queue());
    }

    #[test]
    fn test_connect_without_runtime_fails() {
        let socket = socket();
        assert!(matches!(socket.connect(), Err(PollSockError::Runtime(_))));
        assert_eq!(socket.connection_state(), ConnectionState::Idle);
    }

    #[test]
    fn test_send_before_open_is_not_connected() {
        let socket = socket();
        assert!(matches!(
            socket.send(&[1, 2, 3]),
            Err(PollSockError::NotConnected(_))
        ));
    }

    #[test]
    fn test_read_empty_queue() {
        let socket = socket();
        assert!(matches!(
            socket.read_payload_queue(),
            Err(PollSockError::QueueEmpty)
        ));
    }

    #[tokio::test]
    async fn test_second_connect_rejected() {
        let socket = socket();
        socket.connect().unwrap();
        assert_eq!(socket.connection_state(), ConnectionState::Connecting);
        assert!(matches!(
            socket.connect(),
            Err(PollSockError::InvalidState(_))
        ));
        socket.disconnect().unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_during_handshake_aborts() {
        let socket = socket();
        socket.connect().unwrap();
        socket.disconnect().unwrap();
        socket.disconnect().unwrap();

        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(1);
        while !socket.is_finished() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert!(socket.is_finished());
        assert_eq!(socket.connection_state(), ConnectionState::Aborted);
        assert!(!socket.is_connected());
    }
}
