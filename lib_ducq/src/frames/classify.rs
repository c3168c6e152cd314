//! # Frame Classifier
//!
//! Both functions are pure and total: any text, including the empty string,
//! yields a record carrying one of the six levels.
//!
//! ## Message form
//! `"<command> <route>\n<payload>"`. A frame missing the space, the newline, the
//! command or the route is an `ERROR` and keeps its whole text as payload. An
//! all upper-case command marks bus `PROTOCOL` traffic, anything else is a
//! `MESSAGE`.
//!
//! ## Log form
//! `"<LEVEL>,<command>,<location>,<route>,<details>"`. If the first field is not
//! one of `INFO`/`WARN`/`ERROR`/`DEBUG` the frame is re-read as a message and
//! reported with location `"self"`.
//!
//! Known limitation: the discrimination is purely shape based. A message whose
//! command happens to read `INFO,...` is taken for a log line.

use super::{Level, LogRecord, MessageRecord, RawFrame};

/// Location reported for frames that fell back to the message form.
pub const SELF_LOCATION: &str = "self";

const LOG_SEPARATOR: char = ',';

/// Reads `frame` as a protocol message.
pub fn classify_message(frame: &RawFrame) -> MessageRecord {
    let text = frame.text.as_str();

    let parsed = text
        .split_once(' ')
        .and_then(|(command, rest)| rest.split_once('\n').map(|(route, payload)| (command, route, payload)))
        .filter(|(command, route, _)| !command.is_empty() && !route.is_empty());

    match parsed {
        Some((command, route, payload)) => {
            let level = if command == command.to_uppercase() {
                Level::Protocol
            } else {
                Level::Message
            };
            MessageRecord {
                id: frame.arrived_at,
                level,
                command: command.to_string(),
                route: route.to_string(),
                payload: payload.to_string(),
            }
        }
        None => MessageRecord {
            id: frame.arrived_at,
            level: Level::Error,
            command: String::new(),
            route: String::new(),
            payload: text.to_string(),
        },
    }
}

/// Reads `frame` as a bus log line, falling back to the message form.
pub fn classify_log(frame: &RawFrame) -> LogRecord {
    let text = frame.text.as_str();

    // Degenerate frames cannot hold a separator.
    if text.chars().count() <= 1 {
        return LogRecord {
            id: frame.arrived_at,
            level: Level::Error,
            command: String::new(),
            location: String::new(),
            route: String::new(),
            details: String::new(),
        };
    }

    let fields: Vec<&str> = text.split(LOG_SEPARATOR).collect();
    let field = |index: usize| fields.get(index).copied().unwrap_or_default().to_string();

    match fields.first().copied().and_then(Level::from_log_field) {
        Some(level) => LogRecord {
            id: frame.arrived_at,
            level,
            command: field(1),
            location: field(2),
            route: field(3),
            details: field(4),
        },
        None => {
            let message = classify_message(frame);
            LogRecord {
                id: message.id,
                level: message.level,
                command: message.command,
                location: SELF_LOCATION.to_string(),
                route: message.route,
                details: message.payload,
            }
        }
    }
}
