//! # Subscription Session
//!
//! Binds one transport, one event queue and one `EventBuffer` together and runs
//! the state machine over them. Events are handled strictly one at a time, in
//! the order the transport delivered them.
//!
//! Once the session is `Closed` or `Failed` its queue is shut and anything the
//! transport still had in flight is discarded.

use tokio::sync::mpsc;

use super::endpoint::{Endpoint, Greeting};
use super::state::{Effect, SessionState, TransportEvent};
use super::transport::{Connector, Transport};
use crate::core::event_buffer::{EventBuffer, Snapshot};
use crate::error::Result;
use crate::frames::RawFrame;

/// Close code used when the transport vanished without reporting anything.
const TRANSPORT_GONE: u16 = 1006;

pub struct SubscriptionSession<T: Transport> {
    endpoint: Endpoint,
    greeting: Greeting,
    state: SessionState,
    buffer: EventBuffer,
    transport: Option<T>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl<T: Transport> SubscriptionSession<T> {
    /// Starts connecting to `endpoint`. The session begins in `Connecting`;
    /// `greeting` is sent once the transport reports it is open.
    pub fn open<C>(connector: &C, endpoint: Endpoint, greeting: Greeting, capacity: usize) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let address = endpoint.address()?;
        let buffer = EventBuffer::with_capacity(capacity)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        log::info!("Opening session '{}' on {}", greeting.caption(), address);
        let transport = connector.connect(&address, events_tx);

        Ok(Self {
            endpoint,
            greeting,
            state: SessionState::Connecting,
            buffer,
            transport: Some(transport),
            events: events_rx,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn greeting(&self) -> &Greeting {
        &self.greeting
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    pub fn snapshot(&self) -> Snapshot {
        self.buffer.snapshot()
    }

    /// Applies one transport event. Returns `true` when the buffer changed.
    pub fn handle_event(&mut self, event: TransportEvent) -> bool {
        let (next, effect) = self.state.on_event(event);
        if next != self.state {
            log::info!("Session '{}' on {}: {} -> {}", self.greeting.caption(), self.endpoint, self.state, next);
            self.state = next;
        }

        let changed = match effect {
            Effect::None => false,
            Effect::SendGreeting => self.send_greeting(),
            Effect::Append(text) => {
                log::debug!("Session on {} received {:?}", self.endpoint, text);
                self.buffer.append(RawFrame::now(text));
                true
            }
        };

        if !self.state.is_live() {
            self.release();
        }
        changed
    }

    /// Waits until the buffer changes and returns its new snapshot.
    ///
    /// Returns `None` once the session is closed or failed.
    pub async fn next_change(&mut self) -> Option<Snapshot> {
        while self.state.is_live() {
            let event = match self.events.recv().await {
                Some(event) => event,
                // The transport dropped its end without saying goodbye.
                None => TransportEvent::Close {
                    code: TRANSPORT_GONE,
                    reason: "transport gone".to_string(),
                },
            };
            if self.handle_event(event) {
                return Some(self.snapshot());
            }
        }
        None
    }

    /// Tears the session down: closes the transport and ignores whatever it
    /// still delivers. Nothing is appended to the buffer.
    pub fn close(&mut self) {
        if self.state.is_live() {
            log::info!("Tearing down session '{}' on {}", self.greeting.caption(), self.endpoint);
        }
        self.state = match self.state {
            SessionState::Failed => SessionState::Failed,
            _ => SessionState::Closed,
        };
        self.release();
    }

    fn send_greeting(&mut self) -> bool {
        let frame = self.greeting.to_frame();
        log::debug!("sending {:?} ({} bytes)", frame, frame.len());

        let sent = match self.transport.as_mut() {
            Some(transport) => transport.send(frame),
            None => return false,
        };
        match sent {
            Ok(()) => false,
            Err(e) => {
                log::error!("Failed to send greeting on {}: {}", self.endpoint, e);
                self.handle_event(TransportEvent::Error(e.to_string()))
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.events.close();
    }
}

impl<T: Transport> Drop for SubscriptionSession<T> {
    fn drop(&mut self) {
        self.release();
    }
}
