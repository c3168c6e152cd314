//! # Transport Seam
//!
//! A session never talks to a socket directly. It asks a [`Connector`] for a
//! [`Transport`] and hands it the sending half of its event queue; the
//! transport reports `Open`, `Message`, `Close` and `Error` through that queue
//! and accepts outbound frames through [`Transport::send`].

use tokio::sync::mpsc;
use url::Url;

use super::state::TransportEvent;
use crate::error::Result;

/// Sending half of a session's event queue.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// One live connection, as seen by its session.
pub trait Transport {
    /// Queues one outbound text frame.
    fn send(&mut self, text: String) -> Result<()>;

    /// Shuts the connection down. Pending sends may be dropped. Idempotent.
    fn close(&mut self);
}

/// Opens transports.
pub trait Connector {
    type Transport: Transport;

    /// Starts connecting to `address`. Progress and inbound frames are reported
    /// through `events`, in delivery order.
    fn connect(&self, address: &Url, events: EventSender) -> Self::Transport;
}
