//! # Terminal Rendering
//!
//! A rendering surface for [`GridModel`](crate::views::GridModel)s: a fixed
//! width text table with one colour scheme per level.

/// Column layout, cell fitting and the colored table writer.
pub mod table;

pub use table::{column_widths, TableRenderer};
