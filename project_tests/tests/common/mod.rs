#![allow(dead_code)]

use std::time::Duration;

use lib_ducq::session::{SubscriptionSession, Transport};
use lib_ducq::Snapshot;

pub const WAIT: Duration = Duration::from_secs(5);

/// Follows `session` until `done` holds for its snapshot.
pub async fn wait_for<T, F>(session: &mut SubscriptionSession<T>, done: F) -> Snapshot
where
    T: Transport,
    F: Fn(&Snapshot) -> bool,
{
    tokio::time::timeout(WAIT, async {
        loop {
            let snapshot = session.snapshot();
            if done(&snapshot) {
                return snapshot;
            }
            if session.next_change().await.is_none() {
                let snapshot = session.snapshot();
                assert!(done(&snapshot), "session ended early: {:?}", texts(&snapshot));
                return snapshot;
            }
        }
    })
    .await
    .expect("timed out waiting for the session")
}

pub fn texts(snapshot: &Snapshot) -> Vec<String> {
    snapshot.iter().map(|frame| frame.text.clone()).collect()
}

pub fn contains(snapshot: &Snapshot, text: &str) -> bool {
    snapshot.iter().any(|frame| frame.text == text)
}

/// A localhost port nobody listens on.
pub fn closed_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
