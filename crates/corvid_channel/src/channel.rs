//! The Normal (bidirectional, point-to-point) channel: a capacity-bounded
//! queue guarded by a mutex and condvar. Capacity 0 is a true rendezvous —
//! `send` does not return until a receiver has actually taken the value.

use std::sync::{Condvar, Mutex};
use std::time::Instant;

use crate::error::ChannelError;
use crate::queue::Queue;
use crate::stats::{ChannelStats, ChannelStatsSnapshot};
use crate::timeout::Timeout;

struct Inner<T> {
    queue: Queue<T>,
    closed: bool,
}

/// A bounded, blocking channel.
///
/// `capacity == 0` behaves as a rendezvous point: a send only completes
/// once a receiver has taken the value. `capacity > 0` is a bounded ring
/// buffer: send only waits for free space, not for the value to be
/// consumed.
pub struct Channel<T> {
    inner: Mutex<Inner<T>>,
    cv: Condvar,
    capacity: usize,
    stats: ChannelStats,
}

impl<T> Channel<T> {
    pub fn new(capacity: usize) -> Self {
        Self::with_queue(capacity, Queue::fifo())
    }

    pub fn new_priority(capacity: usize) -> Self {
        Self::with_queue(capacity, Queue::priority())
    }

    fn with_queue(capacity: usize, queue: Queue<T>) -> Self {
        Channel {
            inner: Mutex::new(Inner { queue, closed: false }),
            cv: Condvar::new(),
            capacity,
            stats: ChannelStats::new(),
        }
    }

    fn room_available(&self, queue: &Queue<T>) -> bool {
        if self.capacity == 0 {
            queue.is_empty()
        } else {
            queue.len() < self.capacity
        }
    }

    /// Send `val` with `byte_len` used only for the stats counters (the
    /// channel itself is not aware of `T`'s wire representation).
    pub fn send(&self, val: T, byte_len: u64, timeout: Timeout) -> Result<(), ChannelError> {
        self.send_with_priority(val, 0, byte_len, timeout)
    }

    pub fn send_with_priority(
        &self,
        val: T,
        priority: i64,
        byte_len: u64,
        timeout: Timeout,
    ) -> Result<(), ChannelError> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if guard.closed {
                return Err(ChannelError::Closed);
            }
            if self.room_available(&guard.queue) {
                break;
            }
            guard = self.wait(guard, &timeout, ChannelError::WouldBlock, true)?;
        }

        // A non-blocking rendezvous send can't promise the value will
        // ever be taken, so it fails outright rather than orphaning the
        // value in an unbuffered queue.
        if self.capacity == 0 && matches!(timeout, Timeout::NonBlocking) {
            return Err(ChannelError::WouldBlock);
        }

        match &guard.queue {
            Queue::Priority(..) => guard.queue.push_with_priority(val, priority),
            Queue::Fifo(..) => guard.queue.push(val),
        }
        let queue_len = guard.queue.len();
        self.stats.record_send(byte_len, queue_len);
        self.cv.notify_all();

        if self.capacity == 0 {
            // True rendezvous: block until the value we just pushed is
            // actually taken (the queue can only ever hold one item while
            // capacity is 0, since no other sender can get past the room
            // check above until this one drains).
            while !guard.queue.is_empty() && !guard.closed {
                guard = self.wait(guard, &timeout, ChannelError::TimedOut, true)?;
            }
        }
        Ok(())
    }

    pub fn recv(&self, timeout: Timeout) -> Result<T, ChannelError> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if let Some(val) = guard.queue.pop() {
                self.cv.notify_all();
                self.stats.record_receive(0);
                return Ok(val);
            }
            if guard.closed {
                return Err(ChannelError::Closed);
            }
            guard = self.wait(guard, &timeout, ChannelError::WouldBlock, false)?;
        }
    }

    fn wait<'a>(
        &'a self,
        guard: std::sync::MutexGuard<'a, Inner<T>>,
        timeout: &Timeout,
        on_would_not_wait: ChannelError,
        is_send: bool,
    ) -> Result<std::sync::MutexGuard<'a, Inner<T>>, ChannelError> {
        let record_timeout = || {
            if is_send {
                self.stats.record_send_timeout();
            } else {
                self.stats.record_recv_timeout();
            }
        };
        match timeout {
            Timeout::Blocking => Ok(self.cv.wait(guard).unwrap()),
            Timeout::NonBlocking => {
                record_timeout();
                Err(on_would_not_wait)
            }
            Timeout::Deadline(at) => {
                let remaining = at.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    record_timeout();
                    return Err(ChannelError::TimedOut);
                }
                let (guard, result) = self.cv.wait_timeout(guard, remaining).unwrap();
                if result.timed_out() {
                    record_timeout();
                    return Err(ChannelError::TimedOut);
                }
                Ok(guard)
            }
        }
    }

    /// Idempotent. After close, sends fail with [`ChannelError::Closed`];
    /// receives continue draining whatever was already buffered, then
    /// also fail with [`ChannelError::Closed`] once the buffer is empty.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.closed = true;
        self.cv.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    pub fn stats(&self) -> ChannelStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn bounded_send_and_recv_round_trip() {
        let ch: Channel<i32> = Channel::new(4);
        ch.send(1, 4, Timeout::Blocking).unwrap();
        ch.send(2, 4, Timeout::Blocking).unwrap();
        assert_eq!(ch.recv(Timeout::Blocking).unwrap(), 1);
        assert_eq!(ch.recv(Timeout::Blocking).unwrap(), 2);
    }

    #[test]
    fn non_blocking_send_on_full_channel_would_block() {
        let ch: Channel<i32> = Channel::new(1);
        ch.send(1, 4, Timeout::Blocking).unwrap();
        let err = ch.send(2, 4, Timeout::NonBlocking).unwrap_err();
        assert_eq!(err, ChannelError::WouldBlock);
    }

    #[test]
    fn non_blocking_recv_on_empty_channel_would_block() {
        let ch: Channel<i32> = Channel::new(1);
        let err = ch.recv(Timeout::NonBlocking).unwrap_err();
        assert_eq!(err, ChannelError::WouldBlock);
    }

    #[test]
    fn close_is_idempotent_and_fails_future_sends() {
        let ch: Channel<i32> = Channel::new(4);
        ch.close();
        ch.close();
        assert_eq!(ch.send(1, 4, Timeout::Blocking).unwrap_err(), ChannelError::Closed);
    }

    #[test]
    fn close_lets_receives_drain_then_fail() {
        let ch: Channel<i32> = Channel::new(4);
        ch.send(1, 4, Timeout::Blocking).unwrap();
        ch.close();
        assert_eq!(ch.recv(Timeout::Blocking).unwrap(), 1);
        assert_eq!(ch.recv(Timeout::Blocking).unwrap_err(), ChannelError::Closed);
    }

    #[test]
    fn rendezvous_send_blocks_until_received() {
        let ch: Arc<Channel<i32>> = Arc::new(Channel::new(0));
        let sender = ch.clone();
        let sent_returned = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = sent_returned.clone();
        let handle = thread::spawn(move || {
            sender.send(42, 4, Timeout::Blocking).unwrap();
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(30));
        assert!(!sent_returned.load(std::sync::atomic::Ordering::SeqCst));

        assert_eq!(ch.recv(Timeout::Blocking).unwrap(), 42);
        handle.join().unwrap();
        assert!(sent_returned.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn recv_times_out_after_deadline() {
        let ch: Channel<i32> = Channel::new(1);
        let timeout = Timeout::new(20, false);
        let err = ch.recv(timeout).unwrap_err();
        assert_eq!(err, ChannelError::TimedOut);
    }

    #[test]
    fn priority_channel_delivers_highest_priority_first() {
        let ch: Channel<&'static str> = Channel::new_priority(4);
        ch.send_with_priority("low", 1, 0, Timeout::Blocking).unwrap();
        ch.send_with_priority("high", 10, 0, Timeout::Blocking).unwrap();
        assert_eq!(ch.recv(Timeout::Blocking).unwrap(), "high");
        assert_eq!(ch.recv(Timeout::Blocking).unwrap(), "low");
    }
}
