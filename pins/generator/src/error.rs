// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pin generation run.
///
/// None of these leave a partial artifact behind: generation happens in
/// memory and files are only persisted once every phase has succeeded.
#[derive(Error, Debug)]
pub enum PinGenError {
    /// A CPU pin name does not have the `P<port>_<index>` shape.
    #[error("malformed pin name '{name}': expected P<port>_<index>")]
    MalformedPinName { name: String },

    /// An AF column label does not match the column position.
    #[error("AF column header '{header}' does not match AF index {af_index} (expected 'ACT_{af_index}')")]
    MalformedAfHeader { header: String, af_index: usize },

    /// The AF table references a pin that the board table never declared.
    #[error("AF table references unknown pin '{name}'")]
    UnknownPin { name: String },

    /// A recognized peripheral token whose instance number cannot be parsed.
    #[error("malformed peripheral token '{token}' in column '{header}'")]
    MalformedPeripheralToken { token: String, header: String },

    /// A CSV line that could not be split into cells.
    #[error("{path}:{line}: malformed row: {message}")]
    MalformedRow {
        path: String,
        line: usize,
        message: String,
    },

    /// A row is too short to contain a required column.
    #[error("{path}:{line}: missing column {column}")]
    MissingColumn {
        path: String,
        line: usize,
        column: usize,
    },

    /// Two board rows declare the same board pin name.
    #[error("duplicate board pin name '{name}'")]
    DuplicateBoardName { name: String },

    #[error("formatting generated output failed")]
    Format(#[from] std::fmt::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PinGenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PinGenError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for pin generation.
pub type Result<T> = std::result::Result<T, PinGenError>;
