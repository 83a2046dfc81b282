use crate::message::MessageMode;
use std::fmt;

/// Opaque identifier of a connection owned by the host runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle(pub i32);

impl HostHandle {
    pub fn raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Foreign socket operations exported by a host runtime
///
/// The host owns every resource behind a handle; this crate only forwards
/// calls. All operations must return promptly, progress is observed by
/// polling `is_connected` and `has_unread_payload_queue`.
pub trait HostBridge: Send + Sync + 'static {
    fn is_connected(&self, handle: HostHandle) -> bool;

    fn has_unread_payload_queue(&self, handle: HostHandle) -> bool;

    /// Copy the oldest queued message into `buffer` and remove it
    ///
    /// Returns the message length. When that length exceeds
    /// `buffer.len()` nothing is copied and the message stays queued.
    fn read_payload_queue(&self, handle: HostHandle, buffer: &mut [u8]) -> usize;

    /// Start connecting; returns the handle for all later calls
    fn connect(&self, address: &str, mode: MessageMode) -> HostHandle;

    fn send(&self, handle: HostHandle, payload: &[u8]);

    fn disconnect(&self, handle: HostHandle);
}
