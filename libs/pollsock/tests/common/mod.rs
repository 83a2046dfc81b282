//! Common test utilities for PollSock integration tests
//!
//! - `MockWsServer`: real tokio-tungstenite server (echo, or misbehaving peers)
//! - `ScriptedConnector`: in-memory socket stack driven fragment by fragment
//! - `wait_until`: polls a condition the way callers of the socket do

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pollsock::*;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Deterministic pseudo-random bytes (xorshift)
pub fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut x = seed | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x >> 24) as u8
        })
        .collect()
}

/// Deterministic alphanumeric text, UTF-8 encoded
pub fn pseudo_random_text(len: usize, seed: u64) -> Vec<u8> {
    const CHARACTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    pseudo_random_bytes(len, seed)
        .into_iter()
        .map(|b| CHARACTERS[b as usize % CHARACTERS.len()])
        .collect()
}

/// How the mock server treats a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerBehavior {
    /// Echo every data message back
    Echo,
    /// Echo the first data message, then send a close frame
    CloseAfterFirstEcho,
    /// Echo the first data message, then drop the TCP stream without closing
    VanishAfterFirstEcho,
}

/// A simple mock WebSocket server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Create and start an echoing mock WebSocket server
    pub async fn start() -> Self {
        Self::start_with(ServerBehavior::Echo).await
    }

    pub async fn start_with(behavior: ServerBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, shutdown, behavior).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self { addr, shutdown }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        shutdown: Arc<Notify>,
        behavior: ServerBehavior,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                                match behavior {
                                    ServerBehavior::Echo => {}
                                    ServerBehavior::CloseAfterFirstEcho => {
                                        let _ = write.send(Message::Close(None)).await;
                                        // Keep reading so the client's acknowledgement is consumed
                                    }
                                    ServerBehavior::VanishAfterFirstEcho => {
                                        // Dropping both halves closes the TCP stream with no close frame
                                        return;
                                    }
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One chunk as the scripted peer saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChunk {
    pub data: Vec<u8>,
    pub mode: MessageMode,
    pub first: bool,
    pub end_of_message: bool,
}

/// Test-side handle of a scripted connection
#[derive(Clone)]
pub struct ScriptedPeer {
    fragments: mpsc::UnboundedSender<Fragment>,
    pub sent: Arc<Mutex<Vec<RecordedChunk>>>,
    pub closes: Arc<AtomicUsize>,
    pub connects: Arc<AtomicUsize>,
    pub abort: AbortFlag,
}

impl ScriptedPeer {
    /// Deliver a fragment to the client's next receive
    pub fn push(&self, fragment: Fragment) {
        let _ = self.fragments.send(fragment);
    }

    /// Simulate the connection dying underneath a pending receive
    pub fn abort(&self) {
        self.abort.trip();
    }

    pub fn sent_chunks(&self) -> Vec<RecordedChunk> {
        self.sent.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Acquire)
    }
}

/// In-memory connector handing out one scripted channel
pub struct ScriptedConnector {
    reader_rx: Mutex<Option<mpsc::UnboundedReceiver<Fragment>>>,
    peer: ScriptedPeer,
    hang_handshake: bool,
    echo: bool,
    chunk_delay: Option<Duration>,
}

impl ScriptedConnector {
    /// Connector whose handshake succeeds at once
    pub fn new() -> (Self, ScriptedPeer) {
        Self::build(false, false)
    }

    /// Connector whose writer loops every chunk back as a received fragment
    pub fn echoing() -> (Self, ScriptedPeer) {
        Self::build(false, true)
    }

    /// Connector whose handshake never resolves
    pub fn hanging() -> (Self, ScriptedPeer) {
        Self::build(true, false)
    }

    /// Connector whose writer takes `delay` to transmit each chunk
    pub fn slow_writer(delay: Duration) -> (Self, ScriptedPeer) {
        let (mut connector, peer) = Self::build(false, false);
        connector.chunk_delay = Some(delay);
        (connector, peer)
    }

    fn build(hang_handshake: bool, echo: bool) -> (Self, ScriptedPeer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peer = ScriptedPeer {
            fragments: tx,
            sent: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
            connects: Arc::new(AtomicUsize::new(0)),
            abort: AbortFlag::new(),
        };
        let connector = Self {
            reader_rx: Mutex::new(Some(rx)),
            peer: peer.clone(),
            hang_handshake,
            echo,
            chunk_delay: None,
        };
        (connector, peer)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _address: &str, _mode: MessageMode) -> pollsock::Result<Channel> {
        self.peer.connects.fetch_add(1, Ordering::AcqRel);
        if self.hang_handshake {
            std::future::pending::<()>().await;
        }

        let rx = self
            .reader_rx
            .lock()
            .take()
            .ok_or_else(|| PollSockError::WebSocket("scripted channel already used".into()))?;

        let reader = ScriptedReader { rx };
        let writer = ScriptedWriter {
            peer: self.peer.clone(),
            echo: self.echo,
            chunk_delay: self.chunk_delay,
        };
        Ok(Channel::new(reader, writer, self.peer.abort.clone()))
    }
}

struct ScriptedReader {
    rx: mpsc::UnboundedReceiver<Fragment>,
}

#[async_trait]
impl FrameReader for ScriptedReader {
    async fn receive(&mut self, max_len: usize) -> pollsock::Result<Fragment> {
        match self.rx.recv().await {
            Some(fragment) => {
                assert!(
                    fragment.data.len() <= max_len,
                    "scripted fragment exceeds receive bound"
                );
                Ok(fragment)
            }
            None => Err(PollSockError::TransportAborted("scripted peer gone".into())),
        }
    }
}

struct ScriptedWriter {
    peer: ScriptedPeer,
    echo: bool,
    chunk_delay: Option<Duration>,
}

#[async_trait]
impl FrameWriter for ScriptedWriter {
    async fn send_chunk(&mut self, chunk: OutboundChunk<'_>) -> pollsock::Result<()> {
        if let Some(delay) = self.chunk_delay {
            tokio::time::sleep(delay).await;
        }

        self.peer.sent.lock().push(RecordedChunk {
            data: chunk.data.to_vec(),
            mode: chunk.mode,
            first: chunk.first,
            end_of_message: chunk.end_of_message,
        });

        if self.echo {
            let kind = match chunk.mode {
                MessageMode::Binary => FragmentKind::Binary,
                MessageMode::Text => FragmentKind::Text,
            };
            self.peer
                .push(Fragment::data(kind, chunk.data.to_vec(), chunk.end_of_message));
        }

        // Let the receive loop interleave with long sends
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn close(&mut self) -> pollsock::Result<()> {
        self.peer.closes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// Socket over a scripted connector with a short abort poll interval
pub fn scripted_socket(connector: ScriptedConnector, max_chunk_size: usize) -> Socket {
    pollsock::builder()
        .address("ws://scripted.test")
        .max_chunk_size(max_chunk_size)
        .abort_poll_interval(Duration::from_millis(5))
        .connector(connector)
        .build()
        .unwrap()
}

/// Connect `socket` and wait for it to open
pub async fn connect_and_wait(socket: &Socket) {
    socket.connect().unwrap();
    assert!(
        wait_until(|| socket.is_connected(), CONNECT_TIMEOUT).await,
        "Connect did not flip is_connected to true within {:?}",
        CONNECT_TIMEOUT
    );
}

/// Disconnect `socket` and wait for it to report closed
pub async fn disconnect_and_wait(socket: &Socket) {
    socket.disconnect().unwrap();
    assert!(
        wait_until(|| !socket.is_connected(), DISCONNECT_TIMEOUT).await,
        "Disconnect did not flip is_connected to false within {:?}",
        DISCONNECT_TIMEOUT
    );
}
