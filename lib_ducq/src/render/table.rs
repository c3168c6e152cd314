use std::io::{self, Write};

use colored::*;

use crate::frames::Level;
use crate::views::{ColumnSpec, ColumnWidth, GridModel, GridRow};

const SEPARATOR: &str = " | ";
const MIN_FLEX_WIDTH: usize = 4;
const ELLIPSIS: char = '…';

/// Draws grid models as text tables.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    /// Total line width in characters.
    pub width: usize,
    /// Emit ANSI colours; off for pipes and tests.
    pub colors: bool,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self {
            width: 120,
            colors: true,
        }
    }
}

impl TableRenderer {
    pub fn new(width: usize, colors: bool) -> Self {
        Self { width, colors }
    }

    /// Caption line, header line, then one line per row in model order.
    pub fn render<R: GridRow, W: Write>(&self, out: &mut W, caption: &str, grid: &GridModel<R>) -> io::Result<()> {
        let widths = column_widths(grid.columns, self.width);

        let caption = if self.colors { caption.bold().to_string() } else { caption.to_string() };
        writeln!(out, "{}", caption)?;

        let header = self.line(grid.columns.iter().map(|c| c.header), &widths);
        let header = if self.colors { header.underline().to_string() } else { header };
        writeln!(out, "{}", header)?;

        for row in &grid.rows {
            let line = self.line(grid.columns.iter().map(|c| row.cell(c.field).unwrap_or("")), &widths);
            writeln!(out, "{}", self.paint(row.level(), line))?;
        }
        Ok(())
    }

    fn line<'a>(&self, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
        cells
            .zip(widths)
            .map(|(text, width)| fit(text, *width))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    fn paint(&self, level: Level, line: String) -> String {
        if !self.colors {
            return line;
        }
        let painted = match level {
            Level::Info => line.white().on_blue(),
            Level::Warn => line.black().on_yellow(),
            Level::Error => line.bright_white().on_red(),
            Level::Debug => line.black().on_green(),
            Level::Protocol => line.dimmed(),
            Level::Message => line.normal(),
        };
        painted.to_string()
    }
}

/// Character width of each column for a table `total` characters wide.
///
/// Fixed columns get their size. The room left after fixed columns and
/// separators is split between flex columns in proportion to their shares,
/// never below a small minimum.
pub fn column_widths(columns: &[ColumnSpec], total: usize) -> Vec<usize> {
    let separators = SEPARATOR.chars().count() * columns.len().saturating_sub(1);
    let fixed: usize = columns
        .iter()
        .filter_map(|c| match c.width {
            ColumnWidth::Fixed(n) => Some(n),
            ColumnWidth::Flex(_) => None,
        })
        .sum();
    let shares: f32 = columns
        .iter()
        .filter_map(|c| match c.width {
            ColumnWidth::Flex(share) => Some(share),
            ColumnWidth::Fixed(_) => None,
        })
        .sum();
    let room = total.saturating_sub(fixed + separators) as f32;

    columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fixed(n) => n,
            ColumnWidth::Flex(share) if shares > 0.0 => ((room * share / shares) as usize).max(MIN_FLEX_WIDTH),
            ColumnWidth::Flex(_) => MIN_FLEX_WIDTH,
        })
        .collect()
}

/// One-line cell text exactly `width` characters wide.
fn fit(text: &str, width: usize) -> String {
    let flat: String = text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
    let len = flat.chars().count();
    if len <= width {
        return format!("{}{}", flat, " ".repeat(width - len));
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = flat.chars().take(width - 1).collect();
    cut.push(ELLIPSIS);
    cut
}
