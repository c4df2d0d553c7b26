//! Channel failure reasons.

use std::fmt;

/// Why a send, receive, or request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel has been closed; see [`crate::Channel::close`] for the
    /// exact drain-then-fail semantics.
    Closed,
    /// `timeout_ms` expired before the operation could complete.
    TimedOut,
    /// A non-blocking call (`timeout_ms == 0` or `DONTWAIT`) found no
    /// slot/message available immediately.
    WouldBlock,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Closed => write!(f, "closed"),
            ChannelError::TimedOut => write!(f, "timed_out"),
            ChannelError::WouldBlock => write!(f, "would block"),
        }
    }
}

impl std::error::Error for ChannelError {}
