use serde::Serialize;

use super::GridRow;
use crate::frames::Level;

/// Prefix of the presentation category attached to each row.
pub const ROW_CLASS_PREFIX: &str = "log--";

/// How much horizontal room a column gets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ColumnWidth {
    /// Exactly this many characters.
    Fixed(usize),
    /// Share of the room left after fixed columns.
    Flex(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSpec {
    /// Record field shown in this column.
    pub field: &'static str,
    pub header: &'static str,
    pub width: ColumnWidth,
}

impl ColumnSpec {
    pub const fn fixed(field: &'static str, header: &'static str, chars: usize) -> Self {
        Self {
            field,
            header,
            width: ColumnWidth::Fixed(chars),
        }
    }

    pub const fn flex(field: &'static str, header: &'static str, share: f32) -> Self {
        Self {
            field,
            header,
            width: ColumnWidth::Flex(share),
        }
    }
}

/// Presentation category for a row of the given level, e.g. `log--WARN`.
pub fn row_class(level: Level) -> String {
    format!("{}{}", ROW_CLASS_PREFIX, level.as_str())
}

/// # Grid Model
///
/// The sole input of a rendering surface: rows (most recent first), their
/// column layout, and a row classifier. Surfaces only read it.
#[derive(Debug, Clone, Serialize)]
pub struct GridModel<R> {
    pub rows: Vec<R>,
    #[serde(skip)]
    pub columns: &'static [ColumnSpec],
}

impl<R: GridRow> GridModel<R> {
    pub fn new(rows: Vec<R>, columns: &'static [ColumnSpec]) -> Self {
        Self { rows, columns }
    }

    /// Presentation category of `row`.
    pub fn row_class(&self, row: &R) -> String {
        row_class(row.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_class_per_level() {
        let classes: Vec<String> = Level::ALL.iter().map(|l| row_class(*l)).collect();
        assert_eq!(
            classes,
            vec!["log--INFO", "log--WARN", "log--ERROR", "log--DEBUG", "log--PROTOCOL", "log--MESSAGE"]
        );
    }
}
