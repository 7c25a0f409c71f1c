// Licensed under the Apache-2.0 license

//! Minimal CSV reader for the board and AF tables.
//!
//! Cells are separated by commas and may be wrapped in double quotes, in
//! which case `""` stands for a literal quote. Cell text is trimmed and
//! blank lines are skipped.

use crate::error::{PinGenError, Result};
use winnow::ascii::space0;
use winnow::combinator::{alt, cut_err, delimited, preceded, repeat, separated, terminated};
use winnow::prelude::*;
use winnow::token::{none_of, take_till};

/// A non-blank CSV line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub cells: Vec<String>,
}

impl CsvRow {
    /// Cell at `column`, or an empty string past the end of the row.
    pub fn cell_or_empty(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// Cell at `column`, failing if the row is too short.
    pub fn cell(&self, path: &str, column: usize) -> Result<&str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| PinGenError::MissingColumn {
                path: path.to_string(),
                line: self.line,
                column,
            })
    }
}

fn quoted_cell(input: &mut &str) -> ModalResult<String> {
    preceded(
        '"',
        cut_err(terminated(
            repeat(0.., alt(("\"\"".value('"'), none_of('"')))),
            '"',
        )),
    )
    .parse_next(input)
}

fn bare_cell(input: &mut &str) -> ModalResult<String> {
    take_till(0.., ',').map(str::to_string).parse_next(input)
}

fn cell(input: &mut &str) -> ModalResult<String> {
    delimited(space0, alt((quoted_cell, bare_cell)), space0)
        .map(|text: String| text.trim().to_string())
        .parse_next(input)
}

fn row(input: &mut &str) -> ModalResult<Vec<String>> {
    separated(1.., cell, ',').parse_next(input)
}

/// Split CSV text into rows. `path` is only used for diagnostics.
pub fn parse_csv(path: &str, text: &str) -> Result<Vec<CsvRow>> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cells = row.parse(line).map_err(|e| PinGenError::MalformedRow {
            path: path.to_string(),
            line: i + 1,
            message: e.to_string(),
        })?;
        rows.push(CsvRow { line: i + 1, cells });
    }
    Ok(rows)
}
