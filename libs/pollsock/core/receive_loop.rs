//! Connect/receive loop of the native transport
//!
//! # Lifecycle
//!
//! ```text
//! Connect() ──► spawn ──► handshake ─┬─ disconnect first ──────────► Aborted
//!                                    ├─ handshake error ───────────► Aborted
//!                                    └─ ok ──► Open
//!                                               │ receive ► accumulate ► enqueue
//!                                               ├─ close frame ─┐
//!                                               ├─ disconnect ──┴─► Closing ─► ack ─► Closed
//!                                               └─ abort / read error ─────► Aborted
//! ```
//!
//! Neither the handshake nor a receive is ever awaited on its own: each is
//! raced against the disconnect signal, and receives additionally against
//! the abort flag, so a peer that vanishes silently cannot park the loop.

use crate::accumulator::FrameAccumulator;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::queue::QueueProducer;
use crate::send_path::{run_send_path, Outbound, SendContext};
use crate::signal::DisconnectSignal;
use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

/// Everything the loop owns for one connection
pub(crate) struct LoopContext {
    pub address: String,
    pub mode: MessageMode,
    pub max_chunk_size: usize,
    pub abort_poll_interval: Duration,
    pub close_timeout: Duration,
    pub connector: Arc<dyn Connector>,
    pub state: Arc<AtomicConnectionState>,
    pub metrics: Arc<AtomicMetrics>,
    pub queue: QueueProducer,
    pub signal: DisconnectSignal,
}

/// Why the receive cycle stopped
#[derive(Debug)]
enum ReceiveExit {
    PeerClosed,
    DisconnectRequested,
    Aborted(String),
}

/// Resolve once `flag` is tripped, checking every `interval`
pub(crate) async fn wait_aborted(flag: &AbortFlag, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if flag.is_aborted() {
            return;
        }
    }
}

/// Main task of the native transport
pub(crate) async fn run_connect_receive_loop(
    ctx: LoopContext,
    outbound_tx: UnboundedSender<Outbound>,
    outbound_rx: UnboundedReceiver<Outbound>,
) {
    debug!(address = %ctx.address, "Connecting");

    let handshake = tokio::select! {
        biased;
        _ = ctx.signal.cancelled() => {
            // Dropping the handshake future discards whatever it would
            // have produced.
            info!("Disconnect requested before handshake completed");
            ctx.state.set(ConnectionState::Aborted);
            return;
        }
        result = ctx.connector.connect(&ctx.address, ctx.mode) => result,
    };

    let Channel {
        reader,
        writer,
        abort,
    } = match handshake {
        Ok(channel) => channel,
        Err(e) => {
            error!("Failed to connect to {}: {}", ctx.address, e);
            ctx.state.set(ConnectionState::Aborted);
            return;
        }
    };

    ctx.state.set(ConnectionState::Open);
    info!("Connected to {}", ctx.address);

    let send_task = tokio::spawn(run_send_path(
        writer,
        outbound_rx,
        SendContext {
            mode: ctx.mode,
            max_chunk_size: ctx.max_chunk_size,
            abort_poll_interval: ctx.abort_poll_interval,
            close_timeout: ctx.close_timeout,
            signal: ctx.signal.clone(),
            abort: abort.clone(),
            metrics: Arc::clone(&ctx.metrics),
        },
    ));

    match receive_cycle(reader, &abort, &ctx).await {
        exit @ (ReceiveExit::PeerClosed | ReceiveExit::DisconnectRequested) => {
            debug!(?exit, "Receive cycle finished, closing");
            ctx.state.set(ConnectionState::Closing);

            let _ = outbound_tx.send(Outbound::Close);
            if let Err(e) = send_task.await {
                warn!("Send path task failed: {}", e);
            }

            ctx.state.set(ConnectionState::Closed);
            info!("Connection to {} closed", ctx.address);
        }
        ReceiveExit::Aborted(reason) => {
            warn!("Connection to {} aborted: {}", ctx.address, reason);
            abort.trip();
            ctx.state.set(ConnectionState::Aborted);

            // The writer is unusable; the send path drops it without
            // waiting on the network.
            let _ = outbound_tx.send(Outbound::Release);
        }
    }
}

/// Receive fragments until close, disconnect or abort
async fn receive_cycle(
    mut reader: Box<dyn FrameReader>,
    abort: &AbortFlag,
    ctx: &LoopContext,
) -> ReceiveExit {
    let mut accumulator = FrameAccumulator::new();

    loop {
        let received = tokio::select! {
            biased;
            _ = ctx.signal.cancelled() => return ReceiveExit::DisconnectRequested,
            _ = wait_aborted(abort, ctx.abort_poll_interval) => {
                return ReceiveExit::Aborted("connection aborted while receiving".into());
            }
            result = reader.receive(ctx.max_chunk_size) => result,
        };

        let fragment = match received {
            Ok(fragment) => fragment,
            Err(e) => return ReceiveExit::Aborted(e.to_string()),
        };

        if fragment.is_close() {
            if !accumulator.is_empty() {
                debug!(
                    pending = accumulator.pending_len(),
                    "Close frame interrupted a partial message, discarding it"
                );
            }
            return ReceiveExit::PeerClosed;
        }

        ctx.metrics.increment_fragments_received();
        trace!(
            len = fragment.data.len(),
            end_of_message = fragment.end_of_message,
            "Fragment received"
        );

        if let Some(message) = accumulator.push(&fragment.data, fragment.end_of_message) {
            ctx.metrics.increment_messages_received();
            if !ctx.queue.push(message) {
                debug!("Delivery queue dropped, stopping receive cycle");
                return ReceiveExit::DisconnectRequested;
            }
        }
    }
}
