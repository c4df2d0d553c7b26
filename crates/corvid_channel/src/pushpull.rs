//! Push/Pull: round-robin distribution to connected pullers, each
//! message delivered to exactly one of them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::channel::Channel;
use crate::error::ChannelError;
use crate::timeout::Timeout;

pub struct PushPull<T> {
    pullers: Mutex<Vec<Arc<Channel<T>>>>,
    next: AtomicUsize,
}

impl<T> PushPull<T> {
    pub fn new() -> Self {
        PushPull { pullers: Mutex::new(Vec::new()), next: AtomicUsize::new(0) }
    }

    /// Connect a new puller and return its channel.
    pub fn connect_puller(&self, capacity: usize) -> Arc<Channel<T>> {
        let channel = Arc::new(Channel::new(capacity));
        self.pullers.lock().unwrap().push(channel.clone());
        channel
    }

    /// Deliver `msg` to the next puller in round-robin order. Fails with
    /// [`ChannelError::Closed`] if no puller is connected.
    pub fn push(&self, msg: T, timeout: Timeout) -> Result<(), ChannelError> {
        let pullers = self.pullers.lock().unwrap();
        if pullers.is_empty() {
            return Err(ChannelError::Closed);
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % pullers.len();
        pullers[idx].send(msg, 0, timeout)
    }

    pub fn close(&self) {
        for puller in self.pullers.lock().unwrap().iter() {
            puller.close();
        }
    }
}

impl<T> Default for PushPull<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robins_across_pullers() {
        let pp: PushPull<i32> = PushPull::new();
        let a = pp.connect_puller(4);
        let b = pp.connect_puller(4);

        pp.push(1, Timeout::Blocking).unwrap();
        pp.push(2, Timeout::Blocking).unwrap();
        pp.push(3, Timeout::Blocking).unwrap();

        assert_eq!(a.recv(Timeout::Blocking).unwrap(), 1);
        assert_eq!(b.recv(Timeout::Blocking).unwrap(), 2);
        assert_eq!(a.recv(Timeout::Blocking).unwrap(), 3);
    }

    #[test]
    fn push_without_a_puller_fails_closed() {
        let pp: PushPull<i32> = PushPull::new();
        assert_eq!(pp.push(1, Timeout::Blocking).unwrap_err(), ChannelError::Closed);
    }
}
