use crate::error::SpliceError;
use crate::locator::require_marker;
use crate::splicer::{splice, truncate};
use crate::{DEFAULT_SPLICE_MARKER, DEFAULT_SPLICE_TRAILER, DEFAULT_TRUNCATE_MARKER};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

fn default_splice_marker() -> String {
    DEFAULT_SPLICE_MARKER.to_string()
}

fn default_splice_trailer() -> String {
    DEFAULT_SPLICE_TRAILER.to_string()
}

fn default_truncate_marker() -> String {
    DEFAULT_TRUNCATE_MARKER.to_string()
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
/// A single file-level operation that can be staged by [`apply`].
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Splice the tail of a fragment onto the head of a template.
    Splice(SpliceOperation),
    /// Cut a file at a marker, leaving it alone when the marker is absent.
    Truncate(TruncateOperation),
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
/// Describes a splice between two files.
pub struct SpliceOperation {
    /// File supplying the head, through the first marker.
    pub template: PathBuf,
    /// File supplying the tail, after the first marker.
    pub fragment: PathBuf,
    #[serde(default = "default_splice_marker")]
    /// Literal marker shared by both files.
    pub marker: String,
    #[serde(default = "default_splice_trailer")]
    /// Text appended after the tail.
    pub trailer: String,
    #[serde(default)]
    /// Destination for the result. Defaults to the template itself.
    pub output: Option<PathBuf>,
    #[serde(default)]
    /// Optional human-readable note recorded alongside the operation.
    pub comment: Option<String>,
}

impl SpliceOperation {
    /// Builds a splice using the default marker and trailer.
    pub fn new(template: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            fragment: fragment.into(),
            marker: default_splice_marker(),
            trailer: default_splice_trailer(),
            output: None,
            comment: None,
        }
    }

    /// The path the spliced result is written to.
    pub fn destination(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.template)
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
/// Describes an in-place truncation of a file.
pub struct TruncateOperation {
    /// The file to cut.
    pub file: PathBuf,
    #[serde(default = "default_truncate_marker")]
    /// Literal marker; it and everything after it are removed.
    pub marker: String,
    #[serde(default)]
    /// Optional human-readable note recorded alongside the operation.
    pub comment: Option<String>,
}

impl TruncateOperation {
    /// Builds a truncation using the default marker.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            marker: default_truncate_marker(),
            comment: None,
        }
    }
}

/// What happened when a truncation was staged.
///
/// `MarkerAbsent` and `Unreadable` are both successful no-ops. Any failure to
/// open or read the source (missing file, permission denied, invalid UTF-8) is
/// folded into `Unreadable` and never reported as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TruncateOutcome {
    /// The marker was found and `removed_bytes` bytes were cut.
    Truncated { removed_bytes: usize },
    /// The file was read but does not contain the marker.
    MarkerAbsent,
    /// The file could not be read.
    Unreadable { reason: String },
}

/// A write that has been computed but not yet performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    /// Destination path.
    pub path: PathBuf,
    /// Content at `path` before any staged operation, empty if it did not exist.
    pub original: String,
    /// Content to write.
    pub rendered: String,
}

impl PendingWrite {
    /// Whether writing would leave the file byte-for-byte unchanged.
    pub fn is_unchanged(&self) -> bool {
        self.original == self.rendered
    }
}

/// Overlay of staged file contents used while executing a batch.
///
/// Reads consult staged writes first, so later operations observe the
/// results of earlier ones without anything touching the disk.
#[derive(Debug, Default)]
pub struct Staging {
    writes: Vec<PendingWrite>,
    index: HashMap<PathBuf, usize>,
}

impl Staging {
    fn read(&self, path: &Path) -> anyhow::Result<String> {
        if let Some(&slot) = self.index.get(path) {
            return Ok(self.writes[slot].rendered.clone());
        }

        fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))
    }

    /// Records `rendered` for `path`. `original` is only consulted the first
    /// time a path is staged.
    fn stage(&mut self, path: PathBuf, rendered: String, original: impl FnOnce() -> String) {
        if let Some(&slot) = self.index.get(&path) {
            self.writes[slot].rendered = rendered;
            return;
        }

        let original = original();
        self.index.insert(path.clone(), self.writes.len());
        self.writes.push(PendingWrite {
            path,
            original,
            rendered,
        });
    }

    /// Stages the result of a splice. Both inputs are mandatory, so read
    /// failures and missing markers are errors.
    pub fn splice(&mut self, operation: &SpliceOperation) -> Result<(), SpliceError> {
        let template = self
            .read(&operation.template)
            .map_err(|err| SpliceError::Io(format!("{err:#}")))?;
        let fragment = self
            .read(&operation.fragment)
            .map_err(|err| SpliceError::Io(format!("{err:#}")))?;

        let rendered = splice(&template, &fragment, &operation.marker, &operation.trailer)?;

        log::debug!(
            "spliced {} onto {} ({} bytes)",
            operation.fragment.display(),
            operation.template.display(),
            rendered.len()
        );

        let destination = operation.destination().to_path_buf();
        let in_place = operation.output.is_none();
        let existing = destination.clone();
        self.stage(destination, rendered, move || {
            if in_place {
                template
            } else {
                fs::read_to_string(&existing).unwrap_or_default()
            }
        });
        Ok(())
    }

    /// Stages the result of a truncation when the marker is present.
    pub fn truncate(
        &mut self,
        operation: &TruncateOperation,
    ) -> Result<TruncateOutcome, SpliceError> {
        let marker = require_marker(&operation.marker)?;

        let content = match self.read(&operation.file) {
            Ok(content) => content,
            Err(err) => {
                let reason = format!("{err:#}");
                log::debug!("leaving {} untouched: {reason}", operation.file.display());
                return Ok(TruncateOutcome::Unreadable { reason });
            }
        };

        let Some(kept) = truncate(&content, marker) else {
            log::debug!(
                "marker {marker:?} not found in {}, leaving it untouched",
                operation.file.display()
            );
            return Ok(TruncateOutcome::MarkerAbsent);
        };

        let removed_bytes = content.len() - kept.len();
        let kept = kept.to_string();
        self.stage(operation.file.clone(), kept, move || content);

        Ok(TruncateOutcome::Truncated { removed_bytes })
    }

    /// Consumes the overlay, yielding one write per distinct path in the
    /// order each path was first staged.
    pub fn into_writes(self) -> Vec<PendingWrite> {
        self.writes
    }
}

/// Executes `operations` in order against a fresh [`Staging`] overlay.
///
/// Nothing is written. If any operation fails, the error is returned and
/// no writes are produced, so callers can persist all or nothing.
pub fn apply(operations: Vec<Operation>) -> Result<Vec<PendingWrite>, SpliceError> {
    let mut staging = Staging::default();

    for (position, operation) in operations.iter().enumerate() {
        match operation {
            Operation::Splice(op) => staging.splice(op)?,
            Operation::Truncate(op) => {
                let outcome = staging.truncate(op)?;
                log::info!(
                    "operation {}: truncate {} -> {outcome:?}",
                    position + 1,
                    op.file.display()
                );
            }
        }
    }

    Ok(staging.into_writes())
}

/// Parses a list of operations from JSON or YAML.
pub fn parse_operations(data: &str) -> Result<Vec<Operation>, SpliceError> {
    serde_yaml::from_str(data).map_err(|err| SpliceError::OperationParse(err.to_string()))
}
