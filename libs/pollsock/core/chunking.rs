//! Splitting of outbound payloads into bounded chunks

use crate::message::{MessageMode, OutboundChunk};

/// Default upper bound for one sent chunk and one receive
pub const MAX_PAYLOAD_CHUNK_SIZE: usize = 1024;

/// Iterator over the chunks of one outbound message
///
/// Yields ⌈L/C⌉ contiguous slices in order, only the last flagged
/// end-of-message. An empty payload yields a single empty final chunk.
pub struct OutboundChunks<'a> {
    payload: &'a [u8],
    mode: MessageMode,
    max_chunk_size: usize,
    offset: usize,
    done: bool,
}

impl<'a> Iterator for OutboundChunks<'a> {
    type Item = OutboundChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let end = (self.offset + self.max_chunk_size).min(self.payload.len());
        let chunk = OutboundChunk {
            data: &self.payload[self.offset..end],
            mode: self.mode,
            first: self.offset == 0,
            end_of_message: end == self.payload.len(),
        };

        self.offset = end;
        self.done = chunk.end_of_message;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.done {
            0
        } else {
            chunk_count(self.payload.len() - self.offset, self.max_chunk_size)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for OutboundChunks<'_> {}

/// Split `payload` into chunks of at most `max_chunk_size` bytes
///
/// `max_chunk_size` must be non-zero; `SocketConfig` validation enforces it.
pub fn chunks(payload: &[u8], mode: MessageMode, max_chunk_size: usize) -> OutboundChunks<'_> {
    debug_assert!(max_chunk_size > 0, "chunk size must be non-zero");
    OutboundChunks {
        payload,
        mode,
        max_chunk_size,
        offset: 0,
        done: false,
    }
}

/// Number of chunks a payload of `len` bytes is sent as
pub fn chunk_count(len: usize, max_chunk_size: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(max_chunk_size)
    }
}
