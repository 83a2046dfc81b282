//! Echo probe for pollsock
//!
//! Connects to a WebSocket echo server, sends one payload, polls until it
//! comes back and disconnects.
//!
//! Settings are read from the environment (or `.env`):
//!   - POLLSOCK_ADDRESS     server address (default ws://127.0.0.1:9001)
//!   - POLLSOCK_TEXT_MODE   `true` to frame messages as text
//!   - POLLSOCK_CHUNK_SIZE  bytes per sent chunk (default 1024)
//!
//! Usage:
//!   cargo run --bin echo_probe -- [payload]

use anyhow::{bail, Context, Result};
use pollsock::{Metrics, Socket, WebSocketTransport};
use pollsock_echo::bin_common::{
    load_settings_from_env, parse_args, wait_while, BinaryRunner, ProbeSettings, RunConfig,
};
use tracing::{info, warn};

const DEFAULT_PAYLOAD: &str = "henlo";

struct EchoProbe {
    config: RunConfig,
    settings: ProbeSettings,
    payload: Vec<u8>,
    last_metrics: Option<Metrics>,
}

impl EchoProbe {
    fn socket(&self) -> Result<Socket> {
        pollsock::builder()
            .address(&self.settings.address)
            .mode(self.settings.mode)
            .max_chunk_size(self.settings.max_chunk_size)
            .build()
            .context("invalid socket settings")
    }
}

impl BinaryRunner for EchoProbe {
    async fn run(&mut self) -> Result<()> {
        let socket = self.socket()?;
        let RunConfig {
            timeout,
            poll_interval,
            ..
        } = self.config.clone();

        info!(
            "Connecting to {} ({:?} mode, {} byte chunks)",
            self.settings.address, self.settings.mode, self.settings.max_chunk_size
        );
        socket.connect()?;

        let is_terminal = |socket: &Socket| {
            socket
                .metrics()
                .map(|m| m.connection_state.is_terminal())
                .unwrap_or(false)
        };

        if !wait_while(
            || !socket.is_connected() && !is_terminal(&socket),
            timeout,
            poll_interval,
        )
        .await
        {
            bail!("connection not open after {:?}", timeout);
        }
        if !socket.is_connected() {
            bail!("connection to {} failed", self.settings.address);
        }

        socket.send(&self.payload)?;
        info!("Sent {} bytes", self.payload.len());

        if !wait_while(
            || !socket.has_unread_payload_queue() && socket.is_connected(),
            timeout,
            poll_interval,
        )
        .await
        {
            warn!("No echo within {:?}", timeout);
        }

        while socket.has_unread_payload_queue() {
            let message = socket.read_payload_queue()?;
            if message == self.payload {
                info!("Echo matched ({} bytes)", message.len());
            } else {
                warn!(
                    "Received {} bytes that differ from the probe payload",
                    message.len()
                );
            }
        }

        socket.disconnect()?;
        if !wait_while(|| socket.is_connected(), timeout, poll_interval).await {
            warn!("Socket still connected {:?} after disconnect", timeout);
        }

        self.last_metrics = socket.metrics();

        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.config
    }

    fn stats(&self) -> Option<String> {
        self.last_metrics.as_ref().map(|metrics| {
            format!(
                "{} messages / {} chunks sent, {} messages / {} fragments received, state {}",
                metrics.messages_sent,
                metrics.chunks_sent,
                metrics.messages_received,
                metrics.fragments_received,
                metrics.connection_state
            )
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = load_settings_from_env()?;
    let payload = parse_args()
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_PAYLOAD.to_string())
        .into_bytes();

    let mut probe = EchoProbe {
        config: RunConfig::new("echo_probe"),
        settings,
        payload,
        last_metrics: None,
    };
    probe.execute().await
}
