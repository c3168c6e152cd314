//! # Frames and Classified Records
//!
//! A `RawFrame` is one text message as it arrived from the bus, stamped with its
//! arrival time. Frames are never parsed in place: every projection derives a
//! fresh `MessageRecord` or `LogRecord` from them through the classifiers in
//! [`classify`].
//!
//! The bus multiplexes two sub-formats over a single channel:
//!
//! - **protocol messages**: `"<command> <route>\n<payload>"`
//! - **log records**: `"<LEVEL>,<command>,<location>,<route>,<details>"`
//!
//! There is no framing byte telling them apart, so the classifiers fall back
//! on the shape of the first token.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pure classification functions for both wire sub-formats.
pub mod classify;

/// # RawFrame
///
/// One inbound text frame. Immutable once created; only eviction from the
/// buffer destroys it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFrame {
    /// When the session received the frame. Doubles as the row key.
    pub arrived_at: DateTime<Utc>,
    /// The frame payload, untouched.
    pub text: String,
}

impl RawFrame {
    /// Stamps `text` with the current time.
    pub fn now(text: impl Into<String>) -> Self {
        Self::at(Utc::now(), text)
    }

    pub fn at(arrived_at: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            arrived_at,
            text: text.into(),
        }
    }
}

/// # Level
///
/// Severity/kind tag of a classified record. Every frame maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
    /// Bus protocol traffic (all upper-case command).
    Protocol,
    /// Application message (mixed or lower-case command).
    Message,
}

impl Level {
    /// Every level, in display order.
    pub const ALL: [Level; 6] = [
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Debug,
        Level::Protocol,
        Level::Message,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
            Level::Protocol => "PROTOCOL",
            Level::Message => "MESSAGE",
        }
    }

    /// Parses the leading field of a log record. Only the four log severities
    /// are accepted; `PROTOCOL` and `MESSAGE` never appear on the wire.
    pub fn from_log_field(field: &str) -> Option<Self> {
        match field {
            "INFO" => Some(Level::Info),
            "WARN" => Some(Level::Warn),
            "ERROR" => Some(Level::Error),
            "DEBUG" => Some(Level::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # MessageRecord
///
/// A frame read as a protocol message. Produced by the Message projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: DateTime<Utc>,
    pub level: Level,
    pub command: String,
    pub route: String,
    pub payload: String,
}

/// # LogRecord
///
/// A frame read as a bus log line. Produced by the Monitor projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub id: DateTime<Utc>,
    pub level: Level,
    pub command: String,
    /// Where the event happened; `"self"` when the frame was a plain message.
    pub location: String,
    pub route: String,
    pub details: String,
}
