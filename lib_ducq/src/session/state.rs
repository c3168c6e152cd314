//! # Session State Machine
//!
//! Pure transition function from `(state, transport event)` to
//! `(next state, effect)`. The session applies the effect; nothing here touches
//! the network or the buffer.
//!
//! | From              | Event        | To         | Effect                  |
//! |-------------------|--------------|------------|-------------------------|
//! | Connecting        | Open         | Open       | send the greeting       |
//! | Open              | Message      | Open       | append the text         |
//! | Connecting / Open | Close        | Closed     | append a closure notice |
//! | Connecting / Open | Error        | Failed     | append an error notice  |
//! | Closed / Failed   | anything     | unchanged  | none (late event)       |
//!
//! Anything not listed leaves the state alone with no effect.

use std::fmt;

/// First line of the frame synthesized when the bus closes the connection.
pub const CLOSED_NOTICE: &str = "connection closed.";
/// First line of the frame synthesized when the transport fails.
pub const ERROR_NOTICE: &str = "connection error.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Closed,
    Connecting,
    Open,
    Failed,
}

impl SessionState {
    /// `true` while the transport may still deliver events.
    pub fn is_live(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Open)
    }

    pub fn on_event(self, event: TransportEvent) -> (SessionState, Effect) {
        use SessionState::*;

        match (self, event) {
            (Connecting, TransportEvent::Open) => (Open, Effect::SendGreeting),
            (Open, TransportEvent::Message(text)) => (Open, Effect::Append(text)),
            (Connecting | Open, TransportEvent::Close { code, reason }) => {
                (Closed, Effect::Append(closed_notice(code, &reason)))
            }
            (Connecting | Open, TransportEvent::Error(error)) => {
                (Failed, Effect::Append(format!("{}\n{}", ERROR_NOTICE, error)))
            }
            (state, _) => (state, Effect::None),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Closed => "CLOSED",
            SessionState::Connecting => "CONNECTING",
            SessionState::Open => "OPEN",
            SessionState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// What the transport reports, one event at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake done; the connection accepts frames.
    Open,
    /// Inbound text frame.
    Message(String),
    /// The connection ended. `1005` when the peer sent no code.
    Close { code: u16, reason: String },
    Error(String),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    SendGreeting,
    /// Append a frame with this text to the buffer.
    Append(String),
}

fn closed_notice(code: u16, reason: &str) -> String {
    if reason.is_empty() {
        format!("{}\n{}", CLOSED_NOTICE, code)
    } else {
        format!("{}\n{} {}", CLOSED_NOTICE, code, reason)
    }
}
