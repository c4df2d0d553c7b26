//! Req/Rep: a synchronous request/reply pair. `request` blocks until the
//! matching `reply` arrives; the correlation token is generated by the
//! channel itself, not supplied by the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::channel::Channel;
use crate::error::ChannelError;
use crate::timeout::Timeout;

/// Correlation token identifying one in-flight request.
pub type Token = u64;

pub struct ReqRep<Req, Rep> {
    requests: Channel<(Token, Req)>,
    next_token: AtomicU64,
    pending: Mutex<HashMap<Token, Arc<Channel<Rep>>>>,
}

impl<Req, Rep> ReqRep<Req, Rep> {
    pub fn new(capacity: usize) -> Self {
        ReqRep {
            requests: Channel::new(capacity),
            next_token: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Submit `req` and block until a server calls `reply` with this
    /// request's token.
    pub fn request(&self, req: Req, timeout: Timeout) -> Result<Rep, ChannelError> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let reply_slot = Arc::new(Channel::new(0));
        self.pending.lock().unwrap().insert(token, reply_slot.clone());

        if let Err(e) = self.requests.send((token, req), 0, timeout) {
            self.pending.lock().unwrap().remove(&token);
            return Err(e);
        }

        let result = reply_slot.recv(timeout);
        self.pending.lock().unwrap().remove(&token);
        result
    }

    /// Server side: receive the next pending request and its token.
    pub fn recv_request(&self, timeout: Timeout) -> Result<(Token, Req), ChannelError> {
        self.requests.recv(timeout)
    }

    /// Server side: answer the request identified by `token`. Fails with
    /// [`ChannelError::Closed`] if no request with that token is waiting
    /// (already answered, or the requester gave up).
    pub fn reply(&self, token: Token, rep: Rep, timeout: Timeout) -> Result<(), ChannelError> {
        let slot = self.pending.lock().unwrap().get(&token).cloned();
        match slot {
            Some(slot) => slot.send(rep, 0, timeout),
            None => Err(ChannelError::Closed),
        }
    }

    pub fn close(&self) {
        self.requests.close();
        for slot in self.pending.lock().unwrap().values() {
            slot.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn request_blocks_until_matching_reply() {
        let rr: Arc<ReqRep<i32, i32>> = Arc::new(ReqRep::new(1));
        let server = rr.clone();
        let handle = thread::spawn(move || {
            let (token, req) = server.recv_request(Timeout::Blocking).unwrap();
            server.reply(token, req * 2, Timeout::Blocking).unwrap();
        });

        let reply = rr.request(21, Timeout::Blocking).unwrap();
        assert_eq!(reply, 42);
        handle.join().unwrap();
    }

    #[test]
    fn concurrent_requests_get_distinct_tokens() {
        let rr: Arc<ReqRep<i32, i32>> = Arc::new(ReqRep::new(4));
        let client_a = rr.clone();
        let client_b = rr.clone();
        let a = thread::spawn(move || client_a.request(1, Timeout::Blocking).unwrap());
        let b = thread::spawn(move || client_b.request(2, Timeout::Blocking).unwrap());

        let (token_1, req_1) = rr.recv_request(Timeout::Blocking).unwrap();
        let (token_2, req_2) = rr.recv_request(Timeout::Blocking).unwrap();
        assert_ne!(token_1, token_2);
        rr.reply(token_1, req_1 * 10, Timeout::Blocking).unwrap();
        rr.reply(token_2, req_2 * 10, Timeout::Blocking).unwrap();

        let mut results = vec![a.join().unwrap(), b.join().unwrap()];
        results.sort();
        assert_eq!(results, vec![10, 20]);
    }
}
