//! # Session Supervisor
//!
//! Holds the input-form side of a panel: an endpoint, a greeting and an
//! "active" toggle. It keeps at most one `SubscriptionSession` around and
//! rebuilds it only when
//!
//! - the toggle goes from `false` to `true`, or
//! - the endpoint (`host`, `port`) changes while active.
//!
//! Greeting edits are stored and used by the next connection; they never
//! disturb a running one.

use super::endpoint::{Endpoint, Greeting};
use super::subscription::SubscriptionSession;
use super::transport::Connector;
use crate::core::event_buffer::{Snapshot, DEFAULT_CAPACITY};
use crate::error::Result;

pub struct SessionSupervisor<C: Connector> {
    connector: C,
    endpoint: Endpoint,
    greeting: Greeting,
    capacity: usize,
    active: bool,
    session: Option<SubscriptionSession<C::Transport>>,
}

impl<C: Connector> SessionSupervisor<C> {
    /// Inactive supervisor with the default buffer capacity.
    pub fn new(connector: C, endpoint: Endpoint, greeting: Greeting) -> Self {
        Self {
            connector,
            endpoint,
            greeting,
            capacity: DEFAULT_CAPACITY,
            active: false,
            session: None,
        }
    }

    /// Buffer capacity for sessions built from now on.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn greeting(&self) -> &Greeting {
        &self.greeting
    }

    pub fn session(&self) -> Option<&SubscriptionSession<C::Transport>> {
        self.session.as_ref()
    }

    /// Buffer contents of the current session, empty when there is none.
    pub fn snapshot(&self) -> Snapshot {
        self.session.as_ref().map(SubscriptionSession::snapshot).unwrap_or_default()
    }

    pub fn set_active(&mut self, active: bool) -> Result<()> {
        match (self.active, active) {
            (false, true) => {
                self.active = true;
                if let Err(e) = self.connect() {
                    self.active = false;
                    return Err(e);
                }
            }
            (true, false) => {
                self.active = false;
                self.teardown();
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns `true` when an active session was rebuilt for the new endpoint.
    pub fn set_endpoint(&mut self, endpoint: Endpoint) -> Result<bool> {
        if endpoint == self.endpoint {
            return Ok(false);
        }
        log::info!("Endpoint changed: {} -> {}", self.endpoint, endpoint);
        self.endpoint = endpoint;

        if !self.active {
            return Ok(false);
        }
        if let Err(e) = self.connect() {
            self.active = false;
            return Err(e);
        }
        Ok(true)
    }

    /// Stored for the next connection only.
    pub fn set_greeting(&mut self, greeting: Greeting) {
        if self.active && greeting != self.greeting {
            log::debug!("Greeting '{}' takes effect on the next connection.", greeting.caption());
        }
        self.greeting = greeting;
    }

    /// Applies both halves of an input-form update at once.
    pub fn reconfigure(&mut self, endpoint: Endpoint, greeting: Greeting) -> Result<bool> {
        self.set_greeting(greeting);
        self.set_endpoint(endpoint)
    }

    /// Waits for the next buffer change of the current session.
    ///
    /// Pends forever while there is no live session, so it can sit in a
    /// `select!` next to other inputs.
    pub async fn next_change(&mut self) -> Snapshot {
        if let Some(session) = self.session.as_mut() {
            if let Some(snapshot) = session.next_change().await {
                return snapshot;
            }
        }
        std::future::pending().await
    }

    fn connect(&mut self) -> Result<()> {
        self.teardown();
        let session =
            SubscriptionSession::open(&self.connector, self.endpoint.clone(), self.greeting.clone(), self.capacity)?;
        self.session = Some(session);
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}
