//! Contains the pure text transformations: splicing two documents together
//! and truncating a document at a marker.

use crate::error::{Role, SpliceError};
use crate::locator::{find_marker, require_marker};

/// Joins the head of `template` (through the first `marker`) with the tail of
/// `fragment` (after its first `marker`), followed by `trailer`.
///
/// The template is checked first, so when both documents lack the marker the
/// error names the template.
pub fn splice(
    template: &str,
    fragment: &str,
    marker: &str,
    trailer: &str,
) -> Result<String, SpliceError> {
    let marker = require_marker(marker)?;

    let head_end = find_marker(template, marker)
        .ok_or_else(|| SpliceError::MarkerNotFound {
            role: Role::Template,
            marker: marker.to_string(),
        })?
        .end;
    let tail_start = find_marker(fragment, marker)
        .ok_or_else(|| SpliceError::MarkerNotFound {
            role: Role::Fragment,
            marker: marker.to_string(),
        })?
        .end;

    let head = &template[..head_end];
    let tail = &fragment[tail_start..];

    let mut output = String::with_capacity(head.len() + tail.len() + trailer.len());
    output.push_str(head);
    output.push_str(tail);
    output.push_str(trailer);
    Ok(output)
}

/// Returns the part of `document` that precedes the first `marker`, or
/// `None` when the marker is absent (or empty) and nothing should change.
pub fn truncate<'a>(document: &'a str, marker: &str) -> Option<&'a str> {
    find_marker(document, marker).map(|found| &document[..found.start])
}
