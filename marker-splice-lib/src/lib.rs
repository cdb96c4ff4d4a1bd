//! `marker-splice-lib` exposes the marker-based text editing primitives that
//! power the `marker-splice` command-line tools.
//!
//! Documents are treated as opaque text. A marker is a literal substring used
//! purely as a cut point: [`splicer::splice`] joins the head of one document
//! with the tail of another, and [`splicer::truncate`] drops everything from
//! a marker onward. The file-level helpers below compute results without
//! writing them, leaving persistence to the caller.
//!
//! # Example
//!
//! ```rust
//! use marker_splice_lib::splicer::{splice, truncate};
//!
//! # fn demo() -> Result<(), marker_splice_lib::error::SpliceError> {
//! let joined = splice("A\nX:\nfoo\n", "B\nX:\nbar\n", "X:\n", "END\n")?;
//! assert_eq!(joined, "A\nX:\nbar\nEND\n");
//!
//! assert_eq!(truncate("Intro\n## Config\nmore", "## Config"), Some("Intro\n"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod locator;
pub mod splicer;
pub mod transaction;

use crate::error::SpliceError;
use crate::transaction::{
    PendingWrite, SpliceOperation, Staging, TruncateOperation, TruncateOutcome,
};
use std::path::Path;

/// Marker separating a CRD's header from its `versions:` list.
pub const DEFAULT_SPLICE_MARKER: &str = "\n  versions:\n";

/// Closes the conditional block opened at the top of the chart template.
pub const DEFAULT_SPLICE_TRAILER: &str = "{{- end }}\n";

/// Heading at which documents are cut.
pub const DEFAULT_TRUNCATE_MARKER: &str = "## Config";

/// Reads the template and fragment of `operation` and computes the spliced
/// result for its destination.
///
/// Both files are mandatory: a read failure yields [`SpliceError::Io`] and a
/// missing marker yields [`SpliceError::MarkerNotFound`] naming the document.
pub fn splice_files(operation: &SpliceOperation) -> Result<PendingWrite, SpliceError> {
    let mut staging = Staging::default();
    staging.splice(operation)?;

    staging
        .into_writes()
        .into_iter()
        .next()
        .ok_or_else(|| SpliceError::Io("splice produced no output".to_string()))
}

/// Reads `path` and computes its truncation at `marker`.
///
/// The pending write is only present when the marker was found. A file that
/// cannot be read is reported through [`TruncateOutcome::Unreadable`], not as
/// an error; the only error is an empty marker.
pub fn truncate_file(
    path: &Path,
    marker: &str,
) -> Result<(TruncateOutcome, Option<PendingWrite>), SpliceError> {
    let operation = TruncateOperation {
        file: path.to_path_buf(),
        marker: marker.to_string(),
        comment: None,
    };

    let mut staging = Staging::default();
    let outcome = staging.truncate(&operation)?;
    let write = staging.into_writes().into_iter().next();

    Ok((outcome, write))
}
