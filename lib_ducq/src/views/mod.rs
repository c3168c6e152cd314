//! # Projection Views
//!
//! A projection turns a buffer [`Snapshot`] into the rows a rendering surface
//! shows. Two projections exist:
//!
//! - **`MessageView`**: generic message grid (`command / route / payload`),
//!   built on [`classify_message`].
//! - **`MonitorView`**: bus log grid (`command / location / route / details`),
//!   built on [`classify_log`].
//!
//! Projections are pure and always recompute every row from the snapshot.
//! Rows come out most recent first.

use serde::Serialize;

use crate::core::event_buffer::Snapshot;
use crate::frames::classify::{classify_log, classify_message};
use crate::frames::{Level, LogRecord, MessageRecord, RawFrame};

/// Grid model handed to rendering surfaces.
pub mod grid;

pub use grid::{row_class, ColumnSpec, ColumnWidth, GridModel};

/// A classified record as seen by a rendering surface.
pub trait GridRow {
    fn level(&self) -> Level;

    /// Cell text for the column named `field`, `None` for unknown columns.
    fn cell(&self, field: &str) -> Option<&str>;
}

impl GridRow for MessageRecord {
    fn level(&self) -> Level {
        self.level
    }

    fn cell(&self, field: &str) -> Option<&str> {
        match field {
            "command" => Some(self.command.as_str()),
            "route" => Some(self.route.as_str()),
            "payload" => Some(self.payload.as_str()),
            _ => None,
        }
    }
}

impl GridRow for LogRecord {
    fn level(&self) -> Level {
        self.level
    }

    fn cell(&self, field: &str) -> Option<&str> {
        match field {
            "command" => Some(self.command.as_str()),
            "location" => Some(self.location.as_str()),
            "route" => Some(self.route.as_str()),
            "details" => Some(self.details.as_str()),
            _ => None,
        }
    }
}

/// Maps an ordered frame window to an ordered row sequence.
pub trait Projection {
    type Row: GridRow + Serialize + Clone;

    /// Short name used in logs and captions.
    fn name(&self) -> &'static str;

    fn columns(&self) -> &'static [ColumnSpec];

    fn classify(&self, frame: &RawFrame) -> Self::Row;

    /// Every frame of `snapshot`, most recent first.
    fn project(&self, snapshot: &Snapshot) -> Vec<Self::Row> {
        snapshot.newest_first().map(|frame| self.classify(frame)).collect()
    }

    /// Rows plus everything a rendering surface needs to draw them.
    fn grid(&self, snapshot: &Snapshot) -> GridModel<Self::Row> {
        GridModel::new(self.project(snapshot), self.columns())
    }
}

const MESSAGE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::fixed("command", "command", 12),
    ColumnSpec::flex("route", "route", 0.25),
    ColumnSpec::flex("payload", "payload", 0.50),
];

const MONITOR_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::fixed("command", "command", 12),
    ColumnSpec::flex("location", "location", 0.25),
    ColumnSpec::flex("route", "route", 0.25),
    ColumnSpec::flex("details", "details", 0.50),
];

/// Generic message grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageView;

impl Projection for MessageView {
    type Row = MessageRecord;

    fn name(&self) -> &'static str {
        "messages"
    }

    fn columns(&self) -> &'static [ColumnSpec] {
        MESSAGE_COLUMNS
    }

    fn classify(&self, frame: &RawFrame) -> MessageRecord {
        classify_message(frame)
    }
}

/// Bus monitor / log grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorView;

impl Projection for MonitorView {
    type Row = LogRecord;

    fn name(&self) -> &'static str {
        "monitor"
    }

    fn columns(&self) -> &'static [ColumnSpec] {
        MONITOR_COLUMNS
    }

    fn classify(&self, frame: &RawFrame) -> LogRecord {
        classify_log(frame)
    }
}
