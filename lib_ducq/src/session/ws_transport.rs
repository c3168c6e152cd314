//! # WebSocket Transport
//!
//! `tokio-tungstenite` implementation of the transport seam. Each connection runs
//! in its own task which only forwards socket events into the session queue and
//! writes queued outbound frames; all state decisions stay with the session.
//!
//! Closing (explicitly or by dropping the `WsTransport`) cancels the task at its
//! next await point. Nothing is reported after that.

use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::state::TransportEvent;
use super::transport::{Connector, EventSender, Transport};
use crate::error::{DucqError, Result};

/// Close code reported when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;
/// Close code reported when the peer's close frame carried no code.
const NO_STATUS: u16 = 1005;
/// How long teardown waits on the close handshake of a stalled peer.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Transport = WsTransport;

    fn connect(&self, address: &Url, events: EventSender) -> WsTransport {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(run_socket(address.to_string(), events, outbound_rx, cancel.clone()));

        WsTransport {
            outbound: outbound_tx,
            cancel,
        }
    }
}

/// Handle on one websocket connection task.
#[derive(Debug)]
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl Transport for WsTransport {
    fn send(&mut self, text: String) -> Result<()> {
        self.outbound
            .send(text)
            .map_err(|_| DucqError::Transport("websocket task is gone".to_string()))
    }

    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_socket(
    address: String,
    events: EventSender,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    log::info!("webSocket connection to '{}'...", address);

    let connected = tokio::select! {
        _ = cancel.cancelled() => {
            log::debug!("Connection to '{}' cancelled before open.", address);
            return;
        }
        result = connect_async(address.as_str()) => result,
    };

    let ws_stream = match connected {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            log::error!("Failed to connect to '{}': {}", address, e);
            let _ = events.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    log::info!("webSocket open: '{}'", address);
    if events.send(TransportEvent::Open).is_err() {
        // Session already gone.
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("Closing webSocket '{}'.", address);
                if !close_within(&mut write, CLOSE_TIMEOUT).await {
                    log::warn!("webSocket '{}' did not finish closing within {:?}.", address, CLOSE_TIMEOUT);
                }
                return;
            }
            Some(text) = outbound.recv() => {
                log::debug!("sending {:?} ({} bytes)", text, text.len());
                if let Err(e) = write.send(WsMessage::Text(text.into())).await {
                    log::error!("Failed to send on '{}': {}", address, e);
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    return;
                }
            }
            msg = read.next() => {
                let event = match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        log::trace!("webSocket message: {}", text.as_str());
                        TransportEvent::Message(text.as_str().to_string())
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        log::trace!("webSocket binary message: {} bytes", data.len());
                        TransportEvent::Message(String::from_utf8_lossy(&data).into_owned())
                    }
                    Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) | Some(Ok(WsMessage::Frame(_))) => {
                        continue;
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|cf| (u16::from(cf.code), cf.reason.as_str().to_string()))
                            .unwrap_or((NO_STATUS, String::new()));
                        log::info!("webSocket close: '{}' ({} {})", address, code, reason);
                        let _ = events.send(TransportEvent::Close { code, reason });
                        return;
                    }
                    Some(Err(e)) => {
                        log::error!("webSocket error on '{}': {}", address, e);
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                        return;
                    }
                    None => {
                        log::warn!("webSocket '{}' ended without a close frame.", address);
                        let _ = events.send(TransportEvent::Close {
                            code: ABNORMAL_CLOSURE,
                            reason: "stream ended".to_string(),
                        });
                        return;
                    }
                };

                if events.send(event).is_err() {
                    return;
                }
            }
        }
    }
}

/// Closes `write`, giving up after `limit`. `false` when the peer stalled.
async fn close_within<S>(write: &mut S, limit: Duration) -> bool
where
    S: Sink<WsMessage> + Unpin,
{
    // A close error still ends the handshake.
    tokio::time::timeout(limit, write.close()).await.is_ok()
}
