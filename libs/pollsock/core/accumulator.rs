//! Reassembly of received fragments into complete messages

/// Collects fragments until one arrives flagged end-of-message
///
/// Holds nothing between messages: once a message completes the buffer is
/// handed out and a fresh one starts.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buffer: Vec<u8>,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment`; returns the whole message when `end_of_message`
    pub fn push(&mut self, fragment: &[u8], end_of_message: bool) -> Option<Vec<u8>> {
        self.buffer.extend_from_slice(fragment);

        if end_of_message {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        }
    }

    /// Bytes of the message currently in progress
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
