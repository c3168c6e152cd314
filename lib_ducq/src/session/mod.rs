//! # Subscription Sessions
//!
//! A session owns one live connection to the bus and the bounded buffer fed by
//! it. Its lifecycle is an explicit state machine:
//!
//! ```text
//! Closed -> Connecting -> Open -> Closed | Failed
//! ```
//!
//! - **`state`**: the pure transition function and the transport events driving it.
//! - **`endpoint`**: where to connect (`host`, `port`) and what to say (`Greeting`).
//! - **`transport`**: the `Connector` / `Transport` seam, so the state machine runs
//!   without a network in tests.
//! - **`ws_transport`**: the websocket implementation of that seam.
//! - **`subscription`**: `SubscriptionSession`, state machine + buffer + event queue.
//! - **`supervisor`**: keeps at most one session alive, reconnecting only when
//!   the endpoint changes.
//!
//! There is no retry policy. Closed and failed sessions stay that way until the
//! supervisor builds a new one.

pub mod endpoint;
pub mod state;
pub mod subscription;
pub mod supervisor;
pub mod transport;
pub mod ws_transport;

#[cfg(test)]
pub(crate) mod testing;

pub use endpoint::{Endpoint, Greeting};
pub use state::{Effect, SessionState, TransportEvent};
pub use subscription::SubscriptionSession;
pub use supervisor::SessionSupervisor;
pub use transport::{Connector, Transport};
pub use ws_transport::{WsConnector, WsTransport};
