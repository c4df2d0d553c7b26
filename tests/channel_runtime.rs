//! Cross-module exercises of the channel runtime: thread pool workers
//! feeding a shared channel, pub/sub fan-out, and priority ordering under
//! genuine concurrency rather than single-threaded unit tests.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use corvid_channel::{Channel, ChannelError, PubSub, ThreadPool, Timeout};

#[test]
fn thread_pool_workers_feed_a_shared_bounded_channel() {
    let pool = ThreadPool::new(4);
    let ch: Arc<Channel<i32>> = Arc::new(Channel::new(8));

    for i in 0..20 {
        let ch = ch.clone();
        pool.submit(move || {
            ch.send(i, 4, Timeout::Blocking).unwrap();
        });
    }
    pool.wait_all();
    pool.shutdown();

    let mut received = Vec::new();
    while let Ok(v) = ch.recv(Timeout::NonBlocking) {
        received.push(v);
    }
    received.sort();
    assert_eq!(received, (0..20).collect::<Vec<_>>());
}

#[test]
fn close_unblocks_a_receiver_blocked_on_an_empty_channel() {
    let ch: Arc<Channel<i32>> = Arc::new(Channel::new(1));
    let reader = ch.clone();
    let handle = thread::spawn(move || reader.recv(Timeout::Blocking));

    thread::sleep(Duration::from_millis(20));
    ch.close();

    assert_eq!(handle.join().unwrap().unwrap_err(), ChannelError::Closed);
}

#[test]
fn priority_channel_delivers_highest_priority_first_under_concurrent_senders() {
    let ch: Arc<Channel<&'static str>> = Arc::new(Channel::new_priority(16));
    let senders: Vec<_> = [("low", 0i64), ("high", 10), ("mid", 5)]
        .into_iter()
        .map(|(label, priority)| {
            let ch = ch.clone();
            thread::spawn(move || ch.send_with_priority(label, priority, 0, Timeout::Blocking).unwrap())
        })
        .collect();
    for s in senders {
        s.join().unwrap();
    }

    assert_eq!(ch.recv(Timeout::Blocking).unwrap(), "high");
    assert_eq!(ch.recv(Timeout::Blocking).unwrap(), "mid");
    assert_eq!(ch.recv(Timeout::Blocking).unwrap(), "low");
}

#[test]
fn pubsub_fan_out_reaches_every_matching_subscriber_concurrently() {
    let hub: Arc<PubSub<i32>> = Arc::new(PubSub::new());
    let a = hub.subscribe("sensors.", 4);
    let b = hub.subscribe("sensors.", 4);
    let publisher = hub.clone();
    let handle = thread::spawn(move || publisher.publish("sensors.temp", 42, Timeout::Blocking));

    assert_eq!(handle.join().unwrap(), 2);
    assert_eq!(a.recv(Timeout::Blocking).unwrap(), 42);
    assert_eq!(b.recv(Timeout::Blocking).unwrap(), 42);
}
