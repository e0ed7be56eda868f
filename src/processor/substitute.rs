//! This module contains the substitution engine. It rewrites a document's
//! citation markers into footnote references.
//!
//! Replacement is textual: every occurrence of a distinct marker substring
//! is replaced identically. A marker string appearing verbatim twice in a
//! document therefore gets the same references at both spots; that is
//! accepted behavior, not something to work around.

use crate::processor::marker::Marker;
use crate::processor::registry::Quad;
use slog::{debug, trace};

/// Replace every marker occurrence with its footnote references.
///
/// Each distinct marker substring becomes the concatenation of `[^id]`
/// references for its resolved keys, in key order, followed by a single
/// space and the marker's suffix text when there is any. A marker that
/// resolved to zero keys is left verbatim, keeping the affected text
/// visibly uncited.
pub fn substitute(text: &str, markers: &[Marker], quads: &[Quad]) -> String {
    debug!(
        slog_scope::logger(),
        "Replacing citation markers with footnote references..."
    );

    let mut output = text.to_string();
    let mut replaced: Vec<&str> = Vec::new();

    for marker in markers {
        if replaced.contains(&marker.text.as_str()) {
            continue;
        }
        replaced.push(&marker.text);

        let references: String = quads
            .iter()
            .filter(|q| q.marker == marker.text)
            .map(|q| format!("[^{}]", q.label))
            .collect();

        if references.is_empty() {
            // Every key in this marker failed to resolve.
            trace!(
                slog_scope::logger(),
                "Leaving unresolved marker {:?} in place",
                marker.text
            );
            continue;
        }

        let replacement = match &marker.suffix {
            Some(suffix) => format!("{} {}", references, suffix),
            None => references,
        };

        trace!(
            slog_scope::logger(),
            "Replacing {:?} with {:?}",
            marker.text,
            replacement
        );
        output = output.replace(&marker.text, &replacement);
    }

    output
}
