//! # Core Storage Module
//!
//! Holds the one piece of state a monitoring session accumulates: the bounded
//! window of raw frames. Everything displayed is recomputed from a snapshot of
//! this window, so it is the only place where ordering and memory footprint are
//! enforced.

/// Fixed-capacity FIFO of raw frames with immutable snapshots.
pub mod event_buffer;

pub use event_buffer::{EventBuffer, Snapshot};
