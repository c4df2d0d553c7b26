//! Mutex-protected per-channel statistics.

use std::sync::Mutex;

/// A point-in-time copy of a channel's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatsSnapshot {
    pub sent: u64,
    pub received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub max_queue_size: usize,
    pub send_timeouts: u64,
    pub recv_timeouts: u64,
}

#[derive(Debug, Default)]
pub struct ChannelStats {
    inner: Mutex<ChannelStatsSnapshot>,
}

impl ChannelStats {
    pub fn new() -> Self {
        ChannelStats { inner: Mutex::new(ChannelStatsSnapshot::default()) }
    }

    pub fn record_send(&self, bytes: u64, queue_len: usize) {
        let mut s = self.inner.lock().unwrap();
        s.sent += 1;
        s.bytes_sent += bytes;
        if queue_len > s.max_queue_size {
            s.max_queue_size = queue_len;
        }
    }

    pub fn record_receive(&self, bytes: u64) {
        let mut s = self.inner.lock().unwrap();
        s.received += 1;
        s.bytes_received += bytes;
    }

    pub fn record_send_timeout(&self) {
        self.inner.lock().unwrap().send_timeouts += 1;
    }

    pub fn record_recv_timeout(&self) {
        self.inner.lock().unwrap().recv_timeouts += 1;
    }

    pub fn snapshot(&self) -> ChannelStatsSnapshot {
        *self.inner.lock().unwrap()
    }
}
