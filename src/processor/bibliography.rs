//! This module contains the bibliography assembler.
//!
//! Both listings are plain strings of `[^id]: rendered` lines joined by
//! newlines, with no header or footer decoration. Where the listings land
//! in a document is the command-substitution step's concern, not this
//! module's.

use crate::config::ProcConfig;
use crate::processor::registry::{Quad, ReferenceRegistry};

/// Assemble the per-document bibliography from the document's quads.
///
/// Deduplicates by footnote label, preserving first-occurrence order, so a
/// key cited several times on one document lists once.
pub fn document_bibliography(quads: &[Quad]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut listed: Vec<&str> = Vec::new();

    for quad in quads {
        if listed.contains(&quad.label.as_str()) {
            continue;
        }
        listed.push(&quad.label);
        lines.push(format!("[^{}]: {}", quad.label, quad.rendered));
    }

    lines.join("\n")
}

/// Assemble the full-corpus bibliography from the registry.
///
/// Every key seen so far in the generation, in footnote-id order, rendered
/// exactly as in the per-document listing.
pub fn full_bibliography(registry: &ReferenceRegistry, config: &ProcConfig) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (id, reference) in registry.iter() {
        lines.push(format!(
            "[^{}]: {}",
            config.footnote_label(id),
            reference.rendered
        ));
    }

    lines.join("\n")
}
