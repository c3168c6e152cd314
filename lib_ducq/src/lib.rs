//! # lib_ducq
//!
//! Client side building blocks for watching a live ducq message bus: raw frames
//! come in over a websocket, land in a bounded buffer, and are re-classified into
//! typed rows every time the buffer changes.
//!
//! The always-on modules (`frames`, `core`, `views`, `error`) have no I/O. The
//! folder modules behind features pull in the heavier stacks:
//!
//! - **`session`**: websocket transport, subscription state machine, supervisor.
//! - **`configs`**: layered client configuration.
//! - **`loggers`**: fern based logging setup.
//! - **`render`**: terminal table output.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Error type shared by every module of the crate.
pub mod error;
/// Raw frames, levels and the two classifiers.
pub mod frames;
/// Bounded, insertion-ordered frame storage.
pub mod core;
/// Message and Monitor projections plus the grid model handed to renderers.
pub mod views;

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "render")]
pub mod render;
#[cfg(feature = "session")]
pub mod session;

// Re-export the everyday types
pub use error::{DucqError, Result};
pub use frames::{Level, LogRecord, MessageRecord, RawFrame};
pub use frames::classify::{classify_log, classify_message};
pub use self::core::event_buffer::{EventBuffer, Snapshot, DEFAULT_CAPACITY};
pub use views::{GridModel, MessageView, MonitorView, Projection};
