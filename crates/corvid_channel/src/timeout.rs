//! `timeout_ms` semantics shared by every blocking operation: `-1` blocks
//! indefinitely, `0` never blocks, a positive value blocks until a
//! monotonic deadline.

use std::time::{Duration, Instant};

/// A resolved wait policy for one blocking call.
#[derive(Debug, Clone, Copy)]
pub enum Timeout {
    /// `timeout_ms == -1`: wait until the operation can proceed.
    Blocking,
    /// `timeout_ms == 0`, or the `DONTWAIT` flag: never wait.
    NonBlocking,
    /// `timeout_ms > 0`: wait until `Instant::now()` passes the deadline
    /// captured when the call started.
    Deadline(Instant),
}

impl Timeout {
    /// Resolve raw `timeout_ms`/`DONTWAIT` call arguments into a
    /// [`Timeout`], capturing the deadline instant up front so repeated
    /// `wait_timeout` calls in a retry loop share one monotonic clock.
    pub fn new(timeout_ms: i64, dontwait: bool) -> Timeout {
        if dontwait || timeout_ms == 0 {
            Timeout::NonBlocking
        } else if timeout_ms < 0 {
            Timeout::Blocking
        } else {
            Timeout::Deadline(Instant::now() + Duration::from_millis(timeout_ms as u64))
        }
    }

    /// Remaining time before the deadline, or `None` if this policy
    /// should wait forever ([`Timeout::Blocking`]) or not at all
    /// ([`Timeout::NonBlocking`], and a [`Timeout::Deadline`] already
    /// passed).
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Timeout::Blocking => None,
            Timeout::NonBlocking => Some(Duration::ZERO),
            Timeout::Deadline(at) => Some(at.saturating_duration_since(Instant::now())),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Timeout::Deadline(at) if Instant::now() >= *at)
            || matches!(self, Timeout::NonBlocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_is_blocking() {
        assert!(matches!(Timeout::new(-1, false), Timeout::Blocking));
    }

    #[test]
    fn zero_is_non_blocking() {
        assert!(matches!(Timeout::new(0, false), Timeout::NonBlocking));
    }

    #[test]
    fn dontwait_overrides_a_positive_timeout() {
        assert!(matches!(Timeout::new(5000, true), Timeout::NonBlocking));
    }

    #[test]
    fn positive_is_a_deadline_in_the_future() {
        match Timeout::new(1000, false) {
            Timeout::Deadline(at) => assert!(at > Instant::now()),
            _ => panic!("expected a deadline"),
        }
    }
}
