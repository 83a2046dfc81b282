//! Native socket stack over tokio-tungstenite
//!
//! Outbound chunks are written as raw data frames: the first chunk of a
//! message carries the binary/text opcode, later chunks are continuation
//! frames, and FIN is set on the final chunk only.
//!
//! Inbound, tungstenite hands over whole messages. The reader slices each
//! one into fragments of at most the requested size, flagging the last,
//! so the receive loop sees the same bounded stream it would get from a
//! fragment-level socket API.

use crate::traits::*;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::borrow::Cow;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::{CloseCode, Data, OpCode};
use tokio_tungstenite::tungstenite::protocol::frame::Frame;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default connector of the native transport
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, address: &str, _mode: MessageMode) -> Result<Channel> {
        let (ws_stream, response) = connect_async(address)
            .await
            .map_err(|e| PollSockError::WebSocket(e.to_string()))?;
        debug!(status = %response.status(), "WebSocket handshake completed");

        let (sink, stream) = ws_stream.split();
        let abort = AbortFlag::new();

        Ok(Channel::new(
            TungsteniteReader::new(stream, abort.clone()),
            TungsteniteWriter::new(sink, abort.clone()),
            abort,
        ))
    }
}

/// Message received from the wire, handed out fragment by fragment
struct PendingMessage {
    kind: FragmentKind,
    data: Vec<u8>,
    offset: usize,
}

pub struct TungsteniteReader {
    stream: SplitStream<WsStream>,
    pending: Option<PendingMessage>,
    abort: AbortFlag,
}

impl TungsteniteReader {
    fn new(stream: SplitStream<WsStream>, abort: AbortFlag) -> Self {
        Self {
            stream,
            pending: None,
            abort,
        }
    }

    fn next_fragment(&mut self, max_len: usize) -> Option<Fragment> {
        let pending = self.pending.as_mut()?;

        let end = (pending.offset + max_len).min(pending.data.len());
        let data = pending.data[pending.offset..end].to_vec();
        let kind = pending.kind;
        let end_of_message = end == pending.data.len();
        pending.offset = end;

        if end_of_message {
            self.pending = None;
        }
        Some(Fragment::data(kind, data, end_of_message))
    }

    fn fail(&self, reason: String) -> PollSockError {
        self.abort.trip();
        PollSockError::TransportAborted(reason)
    }
}

#[async_trait]
impl FrameReader for TungsteniteReader {
    async fn receive(&mut self, max_len: usize) -> Result<Fragment> {
        loop {
            if let Some(fragment) = self.next_fragment(max_len) {
                return Ok(fragment);
            }

            // Only this await can be cancelled; `pending` is filled after
            // it resolves, so a dropped receive loses nothing.
            let kind_and_data = match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => (FragmentKind::Binary, data),
                Some(Ok(Message::Text(text))) => (FragmentKind::Text, text.into_bytes()),
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Close frame received");
                    return Ok(Fragment::close());
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => return Err(self.fail(e.to_string())),
                None => return Err(self.fail("stream ended".into())),
            };

            let (kind, data) = kind_and_data;
            trace!(len = data.len(), "Message received");
            self.pending = Some(PendingMessage {
                kind,
                data,
                offset: 0,
            });
        }
    }
}

pub struct TungsteniteWriter {
    sink: SplitSink<WsStream, Message>,
    abort: AbortFlag,
}

impl TungsteniteWriter {
    fn new(sink: SplitSink<WsStream, Message>, abort: AbortFlag) -> Self {
        Self { sink, abort }
    }
}

fn opcode_for(chunk: &OutboundChunk<'_>) -> OpCode {
    if !chunk.first {
        return OpCode::Data(Data::Continue);
    }
    match chunk.mode {
        MessageMode::Binary => OpCode::Data(Data::Binary),
        MessageMode::Text => OpCode::Data(Data::Text),
    }
}

#[async_trait]
impl FrameWriter for TungsteniteWriter {
    async fn send_chunk(&mut self, chunk: OutboundChunk<'_>) -> Result<()> {
        let frame = Frame::message(chunk.data.to_vec(), opcode_for(&chunk), chunk.end_of_message);

        match self.sink.send(Message::Frame(frame)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.abort.trip();
                Err(PollSockError::WebSocket(e.to_string()))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Cow::Borrowed(""),
        };

        match self.sink.send(Message::Close(Some(frame))).await {
            Ok(()) => Ok(()),
            // Peer closed first; tungstenite already answered its close frame
            Err(WsError::ConnectionClosed)
            | Err(WsError::AlreadyClosed)
            | Err(WsError::Protocol(ProtocolError::SendAfterClosing)) => Ok(()),
            Err(e) => Err(PollSockError::WebSocket(e.to_string())),
        }
    }
}
