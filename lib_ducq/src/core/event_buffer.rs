//! # Bounded Event Buffer
//!
//! Insertion-ordered store of `RawFrame`s with a capacity fixed at construction.
//! When a new frame would exceed the capacity the oldest one is evicted first,
//! so a reader can never observe more than `capacity` frames.
//!
//! Readers never borrow the live storage. `snapshot()` copies the current window
//! into a shared, immutable [`Snapshot`] which stays valid (and unchanged) while
//! the buffer keeps moving.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{DucqError, Result};
use crate::frames::RawFrame;

/// Window size used when none is configured.
pub const DEFAULT_CAPACITY: usize = 10;

/// # Event Buffer
#[derive(Debug, Clone)]
pub struct EventBuffer {
    frames: VecDeque<RawFrame>,
    capacity: usize,
    /// Frames ever appended, evicted ones included.
    total_appended: u64,
}

impl EventBuffer {
    /// Creates a buffer holding the default 10 frames.
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(DEFAULT_CAPACITY),
            capacity: DEFAULT_CAPACITY,
            total_appended: 0,
        }
    }

    /// Creates a buffer holding at most `capacity` frames.
    ///
    /// A zero capacity could never show anything and is rejected.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DucqError::Config("buffer capacity must be at least 1".to_string()));
        }
        Ok(Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
            total_appended: 0,
        })
    }

    /// Appends `frame` at the end, evicting the oldest frame first when full.
    ///
    /// Returns the evicted frame, if any.
    pub fn append(&mut self, frame: RawFrame) -> Option<RawFrame> {
        let evicted = if self.frames.len() >= self.capacity {
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(frame);
        self.total_appended += 1;
        evicted
    }

    /// Point-in-time copy of the window, oldest frame first.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frames: self.frames.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// # Snapshot
///
/// Immutable, cheaply clonable view of a buffer at one point in time. Frames are
/// ordered oldest first; projections walk it backwards for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    frames: Arc<[RawFrame]>,
}

impl Snapshot {
    /// Frames from the most recent to the oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &RawFrame> {
        self.frames.iter().rev()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            frames: Arc::from(Vec::new()),
        }
    }
}

impl Deref for Snapshot {
    type Target = [RawFrame];

    fn deref(&self) -> &Self::Target {
        &self.frames
    }
}
