//! This module contains the plain rendering style for bibliography entries.
//!
//! An entry renders to a single Markdown line: authors, italicized title,
//! venue with volume/pages and the year, then any URL. Escaped punctuation
//! from the library source is normalized to literal characters, and any
//! internal line breaks collapse to single spaces so the rendered entry
//! stays on one footnote line.

use crate::library::{Entry, Name};
use lazy_static::lazy_static;
use regex::Regex;
use slog::trace;
use std::collections::HashMap;

lazy_static! {
    /// Regex for internal line breaks (and their surrounding whitespace).
    static ref LINE_BREAKS: Regex = Regex::new(r"[ \t]*[\r\n]+[ \t]*").unwrap();
}

/// The per-generation cache of rendered entries.
///
/// Populated lazily on first resolution of a key. Entries are immutable
/// once written; the whole cache is cleared when the generation turns over.
#[derive(Debug, Default)]
pub struct RenderedCache {
    rendered: HashMap<String, String>,
}

impl RenderedCache {
    pub fn new() -> RenderedCache {
        RenderedCache {
            rendered: HashMap::new(),
        }
    }

    /// The rendered text for a key, rendering on the first request.
    pub fn get_or_render(&mut self, key: &str, entry: &Entry) -> String {
        if let Some(text) = self.rendered.get(key) {
            return text.clone();
        }

        trace!(slog_scope::logger(), "Rendering entry {:?}", key);
        let text = render_entry(entry);
        self.rendered.insert(key.to_string(), text.clone());
        text
    }

    /// Clear the cache for a new generation.
    pub fn clear(&mut self) {
        self.rendered.clear();
    }
}

/// Render one entry into its plain display string.
pub fn render_entry(entry: &Entry) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(authors) = &entry.author {
        if !authors.is_empty() {
            parts.push(render_authors(authors));
        }
    }

    if let Some(title) = &entry.title {
        parts.push(format!("*{}*", title));
    }

    // The venue segment: container title, volume, pages, and year. A year
    // with no container attaches to whatever came before it.
    let year = entry
        .issued
        .as_ref()
        .and_then(|d| d.date_parts.as_ref())
        .and_then(|p| p.first())
        .and_then(|p| p.first())
        .copied();

    match &entry.container_title {
        Some(container) => {
            let mut venue = container.clone();
            if let Some(volume) = &entry.volume {
                venue.push(' ');
                venue.push_str(volume);
            }
            if let Some(page) = &entry.page {
                venue.push_str(", ");
                venue.push_str(page);
            }
            if let Some(year) = year {
                venue.push_str(&format!(" ({})", year));
            }
            parts.push(venue);
        }
        None => {
            if let Some(year) = year {
                match parts.last_mut() {
                    Some(last) => last.push_str(&format!(" ({})", year)),
                    None => parts.push(format!("({})", year)),
                }
            }
        }
    }

    if let Some(url) = &entry.url {
        parts.push(url.clone());
    }

    // Join the segments with periods, without doubling one that a segment
    // already ends with (author suffixes like "Jr.").
    let mut rendered = String::new();
    for part in parts {
        if !rendered.is_empty() {
            if !rendered.ends_with('.') {
                rendered.push('.');
            }
            rendered.push(' ');
        }
        rendered.push_str(&part);
    }
    if !rendered.ends_with('.') {
        rendered.push('.');
    }

    normalize(&rendered)
}

/// Render an entry's author list.
///
/// One author renders as "Given Family"; two are joined with an ampersand;
/// three or more are comma-separated with an ampersand before the last.
fn render_authors(authors: &[Name]) -> String {
    let names: Vec<String> = authors.iter().map(render_name).collect();

    match names.len() {
        1 => names[0].clone(),
        2 => format!("{} & {}", names[0], names[1]),
        _ => format!(
            "{} & {}",
            names[..names.len() - 1].join(", "),
            names[names.len() - 1]
        ),
    }
}

/// Render one name as "Given Family, Suffix".
fn render_name(name: &Name) -> String {
    let mut rendered = String::new();

    if let Some(given) = &name.given {
        rendered.push_str(given);
    }
    if let Some(family) = &name.family {
        if !rendered.is_empty() {
            rendered.push(' ');
        }
        rendered.push_str(family);
    }
    if let Some(suffix) = &name.suffix {
        rendered.push_str(", ");
        rendered.push_str(suffix);
    }

    rendered
}

/// Normalize a rendered entry.
///
/// Escape sequences for punctuation become their literal characters, and
/// internal line breaks collapse to single spaces.
fn normalize(rendered: &str) -> String {
    let rendered = LINE_BREAKS.replace_all(rendered, " ");
    rendered
        .replace("\\(", "(")
        .replace("\\)", ")")
        .replace("\\.", ".")
}
