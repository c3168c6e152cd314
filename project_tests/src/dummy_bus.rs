//! # Dummy Bus
//!
//! A small local websocket bus, good enough to drive the monitor:
//!
//! - the first text frame of a connection is its greeting
//!   (`"<command> <route>\n<payload>"`), answered with `"ACK <route>\n"`;
//! - `publish` delivers `"publish <route>\n<payload>"` to subscribers of that
//!   route and of `*`;
//! - everything the bus does is reported as a CSV log record
//!   (`LEVEL,command,location,route,details`) to `__MONITOR__` subscribers.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use lib_ducq::session::endpoint::MONITOR_ROUTE;
use lib_ducq::session::Endpoint;
use lib_ducq::Level;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tokio_util::sync::CancellationToken;

const WILDCARD_ROUTE: &str = "*";
const BUS_LOCATION: &str = "dummy_bus";
const EVENT_BACKLOG: usize = 256;

#[derive(Debug, Clone)]
enum BusEvent {
    Deliver { route: String, text: String },
    Log(String),
    Close { code: u16, reason: String },
}

#[derive(Debug)]
struct Shared {
    events: broadcast::Sender<BusEvent>,
    greetings: Mutex<Vec<String>>,
}

pub struct DummyBus {
    addr: SocketAddr,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    accept_loop: JoinHandle<()>,
}

impl DummyBus {
    /// Binds `addr` and starts accepting connections.
    pub async fn start(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {}", addr))?;
        let addr = listener.local_addr()?;
        let (events, _) = broadcast::channel(EVENT_BACKLOG);
        let shared = Arc::new(Shared {
            events,
            greetings: Mutex::new(Vec::new()),
        });
        let cancel = CancellationToken::new();

        log::info!("Dummy bus listening on {}", addr);
        let accept_loop = tokio::spawn(accept_loop(listener, Arc::clone(&shared), cancel.clone()));

        Ok(Self {
            addr,
            shared,
            cancel,
            accept_loop,
        })
    }

    /// On a free localhost port.
    pub async fn local() -> Result<Self> {
        Self::start("127.0.0.1:0").await
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.addr.ip().to_string(), self.addr.port())
    }

    /// Every greeting received so far, in arrival order.
    pub fn greetings(&self) -> Vec<String> {
        self.shared.greetings.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn publish(&self, route: &str, payload: &str) {
        self.emit(BusEvent::Deliver {
            route: route.to_string(),
            text: format!("publish {}\n{}", route, payload),
        });
        self.log(Level::Info, "publish", BUS_LOCATION, route, payload);
    }

    /// Sends a raw frame to subscribers of `route` and `*`.
    pub fn deliver(&self, route: &str, text: &str) {
        self.emit(BusEvent::Deliver {
            route: route.to_string(),
            text: text.to_string(),
        });
    }

    /// Reports a log record to `__MONITOR__` subscribers.
    pub fn log(&self, level: Level, command: &str, location: &str, route: &str, details: &str) {
        self.emit(BusEvent::Log(log_record(level, command, location, route, details)));
    }

    /// Closes every open connection with `code` and `reason`.
    pub fn close_all(&self, code: u16, reason: &str) {
        self.emit(BusEvent::Close {
            code,
            reason: reason.to_string(),
        });
    }

    /// Stops accepting and drops every connection.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        let _ = (&mut self.accept_loop).await;
    }

    fn emit(&self, event: BusEvent) {
        // No receivers just means nobody is connected.
        let _ = self.shared.events.send(event);
    }
}

impl Drop for DummyBus {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn log_record(level: Level, command: &str, location: &str, route: &str, details: &str) -> String {
    format!("{},{},{},{},{}", level.as_str(), command, location, route, details)
}

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("Dummy bus stopped.");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let shared = Arc::clone(&shared);
                    let cancel = cancel.child_token();
                    tokio::spawn(async move {
                        if let Err(e) = serve_client(stream, peer, shared, cancel).await {
                            log::warn!("Client {} dropped: {:#}", peer, e);
                        }
                    });
                }
                Err(e) => log::error!("Failed to accept a connection: {}", e),
            }
        }
    }
}

fn routed_to(subscription: &str, route: &str) -> bool {
    subscription == route || (subscription == WILDCARD_ROUTE && route != MONITOR_ROUTE)
}

async fn serve_client(stream: TcpStream, peer: SocketAddr, shared: Arc<Shared>, cancel: CancellationToken) -> Result<()> {
    let ws_stream = accept_async(stream).await.context("websocket handshake failed")?;
    let (mut write, mut read) = ws_stream.split();

    let greeting = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => break text.as_str().to_string(),
            Some(Ok(Message::Close(_))) | None => return Ok(()),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    };
    log::info!("Greeting from {}: {:?}", peer, greeting);

    let head = greeting.split('\n').next().unwrap_or_default();
    let (command, route) = head.split_once(' ').unwrap_or((head, WILDCARD_ROUTE));
    let (command, route) = (command.to_string(), route.to_string());

    if let Ok(mut greetings) = shared.greetings.lock() {
        greetings.push(greeting.clone());
    }

    // Subscribe before acknowledging so nothing published after the ack is missed.
    let mut events = shared.events.subscribe();
    let _ = shared.events.send(BusEvent::Log(log_record(
        Level::Info,
        &command,
        &peer.to_string(),
        &route,
        "subscribed",
    )));
    write.send(Message::Text(format!("ACK {}\n", route).into())).await?;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.close().await;
                return Ok(());
            }
            event = events.recv() => match event {
                Ok(BusEvent::Deliver { route: target, text }) => {
                    if routed_to(&route, &target) {
                        write.send(Message::Text(text.into())).await?;
                    }
                }
                Ok(BusEvent::Log(text)) => {
                    if route == MONITOR_ROUTE {
                        write.send(Message::Text(text.into())).await?;
                    }
                }
                Ok(BusEvent::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.into(),
                    };
                    write.send(Message::Close(Some(frame))).await?;
                    return Ok(());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Client {} lagged, {} events skipped", peer, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => log::debug!("{} sent {:?}", peer, text.as_str()),
                Some(Ok(Message::Close(_))) | None => {
                    log::info!("Client {} left", peer);
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
        }
    }
}
