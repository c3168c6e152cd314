//! In-memory transport used by the session and supervisor tests.

use std::sync::{Arc, Mutex};

use url::Url;

use super::state::TransportEvent;
use super::transport::{Connector, EventSender, Transport};
use crate::error::{DucqError, Result};

#[derive(Debug, Default)]
pub(crate) struct Wire {
    /// Addresses passed to `connect`, in order.
    pub connects: Vec<String>,
    /// Event queue of the most recent connection.
    pub events: Option<EventSender>,
    /// Outbound frames of every connection.
    pub sent: Vec<String>,
    /// Number of `close` calls.
    pub closes: usize,
    /// Makes `send` fail.
    pub refuse_sends: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockConnector {
    pub wire: Arc<Mutex<Wire>>,
}

impl MockConnector {
    /// Pushes `event` into the queue of the latest connection.
    pub fn emit(&self, event: TransportEvent) {
        let wire = self.wire.lock().unwrap();
        let events = wire.events.as_ref().expect("no connection yet");
        let _ = events.send(event);
    }

    pub fn sent(&self) -> Vec<String> {
        self.wire.lock().unwrap().sent.clone()
    }

    pub fn connects(&self) -> Vec<String> {
        self.wire.lock().unwrap().connects.clone()
    }

    pub fn closes(&self) -> usize {
        self.wire.lock().unwrap().closes
    }
}

#[derive(Debug)]
pub(crate) struct MockTransport {
    wire: Arc<Mutex<Wire>>,
}

impl Transport for MockTransport {
    fn send(&mut self, text: String) -> Result<()> {
        let mut wire = self.wire.lock().unwrap();
        if wire.refuse_sends {
            return Err(DucqError::Transport("send refused".to_string()));
        }
        wire.sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        self.wire.lock().unwrap().closes += 1;
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn connect(&self, address: &Url, events: EventSender) -> MockTransport {
        let mut wire = self.wire.lock().unwrap();
        wire.connects.push(address.to_string());
        wire.events = Some(events);
        MockTransport {
            wire: Arc::clone(&self.wire),
        }
    }
}
