//! Outbound half of the native transport
//!
//! # Architecture
//!
//! ```text
//! Socket::send ──► Unbounded mpsc ──► Send Path Task ──► FrameWriter
//!                  (call order)       one message at a time,
//!                                     chunk by chunk
//! ```
//!
//! Every payload passes through a single task, so chunks of two messages
//! never interleave on the wire and messages leave in call order.

use crate::chunking::chunks;
use crate::connection_state::AtomicMetrics;
use crate::receive_loop::wait_aborted;
use crate::signal::DisconnectSignal;
use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace, warn};

/// Commands consumed by the send path task
#[derive(Debug)]
pub(crate) enum Outbound {
    /// Transmit one message
    Payload(Vec<u8>),
    /// Send the normal-closure acknowledgement, then release the writer
    Close,
    /// Release the writer without acknowledgement (connection unusable)
    Release,
}

pub(crate) struct SendContext {
    pub mode: MessageMode,
    pub max_chunk_size: usize,
    pub abort_poll_interval: Duration,
    pub close_timeout: Duration,
    pub signal: DisconnectSignal,
    pub abort: AbortFlag,
    pub metrics: Arc<AtomicMetrics>,
}

/// Drain outbound commands until closure or release
pub(crate) async fn run_send_path(
    mut writer: Box<dyn FrameWriter>,
    mut outbound_rx: UnboundedReceiver<Outbound>,
    ctx: SendContext,
) {
    debug!("Send path started");

    while let Some(command) = outbound_rx.recv().await {
        match command {
            Outbound::Payload(payload) => {
                if ctx.signal.is_cancelled() || ctx.abort.is_aborted() {
                    debug!(len = payload.len(), "Connection going down, dropping queued payload");
                    continue;
                }

                if let Err(e) = send_message(writer.as_mut(), &payload, &ctx).await {
                    warn!("Failed to send message: {}", e);
                    ctx.abort.trip();
                }
            }
            Outbound::Close => {
                match tokio::time::timeout(ctx.close_timeout, writer.close()).await {
                    Ok(Ok(())) => debug!("Normal closure sent"),
                    Ok(Err(e)) => debug!("Closure acknowledgement failed: {}", e),
                    Err(_) => warn!(
                        "Closure acknowledgement timed out after {:?}",
                        ctx.close_timeout
                    ),
                }
                break;
            }
            Outbound::Release => {
                debug!("Releasing connection without closure acknowledgement");
                break;
            }
        }
    }

    debug!("Send path exiting");
}

/// Transmit one payload as ⌈L/C⌉ chunks, final chunk flagged
///
/// Stops early, without error, once disconnect is requested.
async fn send_message(
    writer: &mut dyn FrameWriter,
    payload: &[u8],
    ctx: &SendContext,
) -> Result<()> {
    for chunk in chunks(payload, ctx.mode, ctx.max_chunk_size) {
        let len = chunk.data.len();
        let end_of_message = chunk.end_of_message;

        let result = tokio::select! {
            biased;
            _ = ctx.signal.cancelled() => {
                debug!("Disconnect requested mid-message, abandoning remaining chunks");
                return Ok(());
            }
            _ = wait_aborted(&ctx.abort, ctx.abort_poll_interval) => {
                return Err(PollSockError::TransportAborted(
                    "connection aborted while sending".into(),
                ));
            }
            result = writer.send_chunk(chunk) => result,
        };
        result?;

        ctx.metrics.increment_chunks_sent();
        trace!(len, end_of_message, "Chunk sent");
    }

    ctx.metrics.increment_messages_sent();
    Ok(())
}
