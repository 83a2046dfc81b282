/// Framing mode of a connection, fixed at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageMode {
    #[default]
    Binary,
    Text,
}

impl MessageMode {
    /// Check if messages are framed as text
    pub fn is_text(&self) -> bool {
        matches!(self, MessageMode::Text)
    }

    /// Check if messages are framed as binary
    pub fn is_binary(&self) -> bool {
        matches!(self, MessageMode::Binary)
    }
}

/// Wire-level type of a received fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Binary,
    Text,
    /// Peer sent a close frame; carries no payload
    Close,
}

/// One frame slice delivered by a bounded receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub data: Vec<u8>,
    pub end_of_message: bool,
}

impl Fragment {
    /// Create a data fragment
    pub fn data(kind: FragmentKind, data: impl Into<Vec<u8>>, end_of_message: bool) -> Self {
        Self {
            kind,
            data: data.into(),
            end_of_message,
        }
    }

    /// Create a binary data fragment
    pub fn binary(data: impl Into<Vec<u8>>, end_of_message: bool) -> Self {
        Self::data(FragmentKind::Binary, data, end_of_message)
    }

    /// Create a text data fragment
    pub fn text(data: impl Into<Vec<u8>>, end_of_message: bool) -> Self {
        Self::data(FragmentKind::Text, data, end_of_message)
    }

    /// Create a close fragment
    pub fn close() -> Self {
        Self {
            kind: FragmentKind::Close,
            data: Vec::new(),
            end_of_message: true,
        }
    }

    /// Check if this fragment is a close frame
    pub fn is_close(&self) -> bool {
        self.kind == FragmentKind::Close
    }
}

/// A bounded slice of an outbound payload
///
/// Produced and consumed within one send operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundChunk<'a> {
    pub data: &'a [u8],
    pub mode: MessageMode,
    /// First chunk of its message (continuation frames follow it)
    pub first: bool,
    /// Final chunk of its message
    pub end_of_message: bool,
}
