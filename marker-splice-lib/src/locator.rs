//! Contains the logic for finding a marker within a text document.

use crate::error::SpliceError;

/// Represents the location of a found marker, as byte offsets into the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Offset of the first byte of the marker.
    pub start: usize,
    /// Offset immediately after the last byte of the marker.
    pub end: usize,
}

/// Finds the first literal occurrence of `marker` in `haystack`.
///
/// Returns `None` when the marker does not occur. An empty marker never
/// matches; callers that need to reject it loudly should go through
/// [`require_marker`].
pub fn find_marker(haystack: &str, marker: &str) -> Option<MarkerMatch> {
    if marker.is_empty() {
        return None;
    }

    haystack.find(marker).map(|start| MarkerMatch {
        start,
        end: start + marker.len(),
    })
}

/// Rejects empty markers before any lookup is attempted.
pub fn require_marker(marker: &str) -> Result<&str, SpliceError> {
    if marker.is_empty() {
        Err(SpliceError::EmptyMarker)
    } else {
        Ok(marker)
    }
}
