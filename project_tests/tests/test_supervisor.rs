mod common;

use std::time::Duration;

use common::{contains, WAIT};
use lib_ducq::session::{Greeting, SessionSupervisor, WsConnector};
use lib_ducq::Snapshot;
use project_tests::DummyBus;

async fn next_change(supervisor: &mut SessionSupervisor<WsConnector>) -> Snapshot {
    tokio::time::timeout(WAIT, supervisor.next_change())
        .await
        .expect("timed out waiting for the supervisor")
}

#[tokio::test]
async fn test_port_change_reconnects_with_current_greeting() {
    let first = DummyBus::local().await.unwrap();
    let second = DummyBus::local().await.unwrap();

    let mut supervisor = SessionSupervisor::new(WsConnector, first.endpoint(), Greeting::default());
    supervisor.set_active(true).unwrap();
    let snapshot = next_change(&mut supervisor).await;
    assert!(contains(&snapshot, "ACK *\n"));

    // Greeting edits wait for the next connection.
    supervisor.set_greeting(Greeting::subscribe("chat"));
    assert!(!supervisor.set_endpoint(first.endpoint()).unwrap());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(first.greetings(), vec!["subscribe *\n"]);

    assert!(supervisor.set_endpoint(second.endpoint()).unwrap());
    assert!(supervisor.snapshot().is_empty());
    let snapshot = next_change(&mut supervisor).await;
    assert!(contains(&snapshot, "ACK chat\n"));
    assert_eq!(second.greetings(), vec!["subscribe chat\n"]);
    assert_eq!(first.greetings().len(), 1);
}

#[tokio::test]
async fn test_toggle_off_stops_updates() {
    let bus = DummyBus::local().await.unwrap();
    let mut supervisor = SessionSupervisor::new(WsConnector, bus.endpoint(), Greeting::default()).with_capacity(4);
    supervisor.set_active(true).unwrap();
    next_change(&mut supervisor).await;

    bus.publish("chat", "one");
    let snapshot = next_change(&mut supervisor).await;
    assert!(contains(&snapshot, "publish chat\none"));

    supervisor.set_active(false).unwrap();
    assert!(supervisor.session().is_none());
    bus.publish("chat", "two");
    let waited = tokio::time::timeout(Duration::from_millis(100), supervisor.next_change()).await;
    assert!(waited.is_err());

    // Turning it back on starts from an empty buffer with a new greeting.
    supervisor.set_active(true).unwrap();
    let snapshot = next_change(&mut supervisor).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(bus.greetings().len(), 2);
}
