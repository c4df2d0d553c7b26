#![cfg_attr(docsrs, feature(doc_cfg))]

//! # corvid-channel
//!
//! The blocking channel and worker-pool runtime backing Corvid's
//! `channel`, `go`, and `select` constructs: four messaging patterns
//! (Normal, Pub/Sub, Push/Pull, Req/Rep) over one `std::thread`-based
//! [`Channel`], plus a fixed-size [`ThreadPool`] and the `parallel_for`/
//! `parallel_reduce` helpers built on top of it.
//!
//! Built on `std::thread`/`std::sync::{Mutex, Condvar}` rather than an
//! async runtime: Corvid channels need blocking rendezvous and
//! `timeout_ms` semantics regardless of whether the surrounding code is
//! inside an `async` context, so there is no executor to park on.
//!
//! ```
//! use corvid_channel::{Channel, Timeout};
//!
//! let ch: Channel<i32> = Channel::new(4);
//! ch.send(7, 4, Timeout::Blocking).unwrap();
//! assert_eq!(ch.recv(Timeout::Blocking).unwrap(), 7);
//! ```

pub mod channel;
pub mod error;
pub mod parallel;
pub mod pool;
pub mod pubsub;
pub mod pushpull;
pub mod queue;
pub mod reqrep;
pub mod stats;
pub mod timeout;

pub use channel::Channel;
pub use error::ChannelError;
pub use parallel::{parallel_for, parallel_reduce};
pub use pool::{ThreadPool, MAX_WORKERS};
pub use pubsub::PubSub;
pub use pushpull::PushPull;
pub use queue::Queue;
pub use reqrep::{ReqRep, Token};
pub use stats::{ChannelStats, ChannelStatsSnapshot};
pub use timeout::Timeout;
