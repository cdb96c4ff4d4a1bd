//! Defines custom error types for the library.

use std::fmt;
use thiserror::Error;

/// Which input of a splice a marker lookup was performed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The document supplying the head (and usually the destination file).
    Template,
    /// The document supplying the tail.
    Fragment,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Template => f.write_str("template"),
            Role::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
/// Error type returned when a splice or truncate operation fails.
pub enum SpliceError {
    #[error("Marker {marker:?} was not found in the {role} document")]
    MarkerNotFound { role: Role, marker: String },

    #[error("Marker must not be empty.")]
    EmptyMarker,

    #[error("Failed to parse operations: {0}")]
    OperationParse(String),

    #[error("I/O error: {0}")]
    Io(String),
}
