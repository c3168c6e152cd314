mod common;

use std::time::Duration;

use common::{closed_port, contains, texts, wait_for};
use lib_ducq::session::endpoint::MONITOR_ROUTE;
use lib_ducq::session::{Endpoint, Greeting, SessionState, SubscriptionSession, WsConnector};
use lib_ducq::{Level, MessageView, MonitorView, Projection};
use project_tests::DummyBus;

fn open(endpoint: Endpoint, greeting: Greeting, capacity: usize) -> SubscriptionSession<lib_ducq::session::WsTransport> {
    SubscriptionSession::open(&WsConnector, endpoint, greeting, capacity).unwrap()
}

#[tokio::test]
async fn test_greeting_sent_once_and_acknowledged() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::default(), 10);
    assert_eq!(session.state(), SessionState::Connecting);

    let snapshot = wait_for(&mut session, |s| contains(s, "ACK *\n")).await;
    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(bus.greetings(), vec!["subscribe *\n"]);

    let rows = MessageView.project(&snapshot);
    assert_eq!(rows[0].level, Level::Protocol);
    assert_eq!(rows[0].command, "ACK");
    assert_eq!(rows[0].route, "*");
}

#[tokio::test]
async fn test_published_messages_are_classified_newest_first() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::default(), 10);
    wait_for(&mut session, |s| !s.is_empty()).await;

    bus.publish("chat", "first");
    bus.publish("news", "second\nline");
    let snapshot = wait_for(&mut session, |s| s.len() == 3).await;

    let rows = MessageView.project(&snapshot);
    assert_eq!(rows[0].level, Level::Message);
    assert_eq!((rows[0].route.as_str(), rows[0].payload.as_str()), ("news", "second\nline"));
    assert_eq!((rows[1].route.as_str(), rows[1].payload.as_str()), ("chat", "first"));
    assert_eq!(rows[2].command, "ACK");
}

#[tokio::test]
async fn test_route_subscription_filters() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::subscribe("chat"), 10);
    wait_for(&mut session, |s| contains(s, "ACK chat\n")).await;

    bus.publish("news", "skipped");
    bus.publish("chat", "kept");
    let snapshot = wait_for(&mut session, |s| s.len() == 2).await;
    assert_eq!(texts(&snapshot), vec!["ACK chat\n", "publish chat\nkept"]);
}

#[tokio::test]
async fn test_monitor_route_receives_log_records() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::subscribe(MONITOR_ROUTE), 10);
    wait_for(&mut session, |s| contains(s, "ACK __MONITOR__\n")).await;

    bus.log(Level::Warn, "publish", "node-1", "chat", "slow consumer");
    bus.deliver(MONITOR_ROUTE, "garbage");
    let snapshot = wait_for(&mut session, |s| contains(s, "garbage")).await;

    let rows = MonitorView.project(&snapshot);
    assert_eq!(rows[0].level, Level::Error);
    assert_eq!(rows[0].location, "self");
    assert_eq!(rows[0].details, "garbage");

    let warn = rows.iter().find(|r| r.level == Level::Warn).expect("warn row");
    assert_eq!(
        (warn.command.as_str(), warn.location.as_str(), warn.route.as_str(), warn.details.as_str()),
        ("publish", "node-1", "chat", "slow consumer")
    );
    let ack = rows.iter().find(|r| r.command == "ACK").expect("ack row");
    assert_eq!(ack.level, Level::Protocol);
}

#[tokio::test]
async fn test_bus_close_is_visible_and_terminal() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::default(), 10);
    wait_for(&mut session, |s| !s.is_empty()).await;

    bus.close_all(1000, "bye");
    let snapshot = wait_for(&mut session, |s| contains(s, "connection closed.\n1000 bye")).await;
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.next_change().await, None);

    bus.publish("chat", "late");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.snapshot(), snapshot);
}

#[tokio::test]
async fn test_unreachable_bus_fails_session() {
    let mut session = open(Endpoint::new("127.0.0.1", closed_port()), Greeting::default(), 10);
    let snapshot = wait_for(&mut session, |s| !s.is_empty()).await;

    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot[0].text.starts_with("connection error.\n"));

    let rows = MessageView.project(&snapshot);
    assert_eq!(rows[0].command, "connection");
    assert_eq!(rows[0].route, "error.");
}

#[tokio::test]
async fn test_buffer_keeps_the_most_recent_frames() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::default(), 3);
    wait_for(&mut session, |s| !s.is_empty()).await;

    for n in 1..=5 {
        bus.publish("chat", &n.to_string());
    }
    let snapshot = wait_for(&mut session, |s| contains(s, "publish chat\n5")).await;
    assert_eq!(texts(&snapshot), vec!["publish chat\n3", "publish chat\n4", "publish chat\n5"]);
    assert_eq!(session.buffer().total_appended(), 6);
}

#[tokio::test]
async fn test_teardown_ignores_late_frames() {
    let bus = DummyBus::local().await.unwrap();
    let mut session = open(bus.endpoint(), Greeting::default(), 10);
    let before = wait_for(&mut session, |s| !s.is_empty()).await;

    session.close();
    bus.publish("chat", "late");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.next_change().await, None);
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn test_sessions_do_not_share_buffers() {
    let bus = DummyBus::local().await.unwrap();
    let mut messages = open(bus.endpoint(), Greeting::default(), 10);
    let mut monitor = open(bus.endpoint(), Greeting::subscribe(MONITOR_ROUTE), 10);
    wait_for(&mut messages, |s| !s.is_empty()).await;
    wait_for(&mut monitor, |s| contains(s, "ACK __MONITOR__\n")).await;

    bus.publish("chat", "hello");
    let monitor_snapshot = wait_for(&mut monitor, |s| s.iter().any(|f| f.text.starts_with("INFO,publish,"))).await;
    let message_snapshot = wait_for(&mut messages, |s| contains(s, "publish chat\nhello")).await;

    assert!(!contains(&monitor_snapshot, "publish chat\nhello"));
    assert!(!message_snapshot.iter().any(|f| f.text.starts_with("INFO,")));
}
