//! This module contains the citation-marker scanner. It locates citation
//! markers in raw document text and extracts their keys and suffix text.
//!
//! Two marker syntaxes exist: the command form `\cite[note]{key1, key2}`
//! (the default) and the bracket form `[@key, suffix]`. Only the configured
//! syntax is scanned for; text in the other syntax is left alone. The
//! boundary rules are deliberately strict: anything malformed is not a
//! citation, so it never reaches the resolver and never changes the output.

use crate::config::MarkerSyntax;
use lazy_static::lazy_static;
use regex::Regex;
use slog::trace;

lazy_static! {
    /// Regex for a valid citation key.
    static ref KEY: Regex = Regex::new(r"^[\w.:-]+$").unwrap();
}

/// One located citation marker.
///
/// Holds the matched text span, the cited keys in order of appearance, and
/// any trimmed suffix/note text. Built fresh per parse of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub text: String,
    pub keys: Vec<String>,
    pub suffix: Option<String>,
}

impl Marker {
    fn new(text: &str, keys: Vec<String>, suffix: Option<String>) -> Marker {
        Marker {
            text: text.to_string(),
            keys,
            suffix,
        }
    }
}

/// A successful scan at one position: the marker's byte length plus its
/// extracted parts.
struct Scan {
    len: usize,
    keys: Vec<String>,
    suffix: Option<String>,
}

/// Locate every citation marker in a document.
///
/// Returns the maximal, non-overlapping marker substrings in left-to-right
/// order of their first character.
pub fn locate_markers(input: &str, syntax: MarkerSyntax) -> Vec<&str> {
    let mut markers = Vec::new();
    let mut i = 0;
    let bytes = input.as_bytes();

    while i < bytes.len() {
        match scan_at(input, i, syntax) {
            Some(scan) => {
                trace!(
                    slog_scope::logger(),
                    "Found citation marker {:?}",
                    &input[i..i + scan.len]
                );
                markers.push(&input[i..i + scan.len]);
                i += scan.len;
            }
            None => i += 1,
        }
    }

    markers
}

/// Extract the keys and suffix from one located marker substring.
///
/// A malformed marker yields an empty key list and no suffix, signalling
/// "not a citation" rather than an error.
pub fn extract_keys(marker: &str, syntax: MarkerSyntax) -> (Vec<String>, Option<String>) {
    match scan_at(marker, 0, syntax) {
        Some(scan) if scan.len == marker.len() => (scan.keys, scan.suffix),
        _ => (Vec::new(), None),
    }
}

/// Locate and extract in one pass, returning [`Marker`]s in document order.
pub fn parse_markers(input: &str, syntax: MarkerSyntax) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut i = 0;
    let bytes = input.as_bytes();

    while i < bytes.len() {
        match scan_at(input, i, syntax) {
            Some(scan) => {
                markers.push(Marker::new(
                    &input[i..i + scan.len],
                    scan.keys,
                    scan.suffix,
                ));
                i += scan.len;
            }
            None => i += 1,
        }
    }

    markers
}

/// Try to scan one marker starting at byte `start`.
fn scan_at(input: &str, start: usize, syntax: MarkerSyntax) -> Option<Scan> {
    match syntax {
        MarkerSyntax::Command => scan_command(input, start),
        MarkerSyntax::Bracket => scan_bracket(input, start),
    }
}

/// Scan a command-form marker: `\cite{key1, key2}` or
/// `\cite[note]{key1, key2}`.
///
/// The command name must be exactly `cite`; the optional bracketed note
/// must come before the braced key list; brackets and braces must be
/// balanced and contain no newlines. Anything else is not a marker.
fn scan_command(input: &str, start: usize) -> Option<Scan> {
    let bytes = input.as_bytes();

    // Byte-wise prefix check so the scanner can probe any byte offset, not
    // just character boundaries.
    if bytes.get(start) != Some(&b'\\') || bytes.get(start + 1..start + 5) != Some(&b"cite"[..]) {
        return None;
    }

    // The command name must end at `cite`. A longer name (e.g. `\citep`)
    // belongs to some other tool.
    let mut i = start + 5;
    let mut suffix = None;

    if bytes.get(i) == Some(&b'[') {
        // Optional note. No nesting, no newlines, and it must close.
        let note_start = i + 1;
        loop {
            i += 1;
            match bytes.get(i) {
                Some(b']') => break,
                Some(b'[') | Some(b'{') | Some(b'}') | Some(b'\n') | None => return None,
                Some(_) => {}
            }
        }
        let note = input[note_start..i].trim();
        if !note.is_empty() {
            suffix = Some(note.to_string());
        }
        i += 1;
    }

    // The braced key list is required.
    if bytes.get(i) != Some(&b'{') {
        return None;
    }
    let list_start = i + 1;
    loop {
        i += 1;
        match bytes.get(i) {
            Some(b'}') => break,
            Some(b'{') | Some(b'[') | Some(b']') | Some(b'\n') | None => return None,
            Some(_) => {}
        }
    }

    // Split the list on commas. Every segment must trim to a valid key;
    // an empty or invalid segment makes the whole marker a non-citation.
    let mut keys = Vec::new();
    for segment in input[list_start..i].split(',') {
        let key = segment.trim();
        if !KEY.is_match(key) {
            return None;
        }
        keys.push(key.to_string());
    }

    Some(Scan {
        len: i + 1 - start,
        keys,
        suffix,
    })
}

/// Scan a bracket-form marker: `[@key]` or `[@key, suffix]`.
///
/// Exactly one key, prefixed `@`. A leading `-` is the suppress-author
/// convention and is excluded, as are semicolon multi-key lists and
/// e-mail-like bracket text (where the `@` isn't the first character).
fn scan_bracket(input: &str, start: usize) -> Option<Scan> {
    let bytes = input.as_bytes();

    if bytes.get(start) != Some(&b'[') || bytes.get(start + 1) != Some(&b'@') {
        return None;
    }

    // The key runs until the first byte outside the key charset.
    let key_start = start + 2;
    let mut i = key_start;
    while i < bytes.len() && is_key_byte(bytes[i]) {
        i += 1;
    }
    if i == key_start {
        return None;
    }
    let key = &input[key_start..i];

    while bytes.get(i) == Some(&b' ') {
        i += 1;
    }

    match bytes.get(i) {
        // No suffix.
        Some(b']') => Some(Scan {
            len: i + 1 - start,
            keys: vec![key.to_string()],
            suffix: None,
        }),
        // A comma-introduced suffix, running to the closing bracket. An
        // `@` inside it means a multi-key list, which this form rejects.
        Some(b',') => {
            let suffix_start = i + 1;
            loop {
                i += 1;
                match bytes.get(i) {
                    Some(b']') => break,
                    Some(b'@') | Some(b'[') | Some(b'\n') | None => return None,
                    Some(_) => {}
                }
            }
            let suffix = input[suffix_start..i].trim();
            Some(Scan {
                len: i + 1 - start,
                keys: vec![key.to_string()],
                suffix: if suffix.is_empty() {
                    None
                } else {
                    Some(suffix.to_string())
                },
            })
        }
        _ => None,
    }
}

/// Whether a byte can appear in a citation key.
fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b':' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    mod command_form {
        use super::*;

        #[test]
        fn single_key() {
            let markers = parse_markers("Cite \\cite{smith2020} here.", MarkerSyntax::Command);
            assert_eq!(
                markers,
                vec![Marker::new("\\cite{smith2020}", vec!["smith2020".to_string()], None)]
            );
        }

        #[test]
        fn multiple_keys() {
            let markers = parse_markers("\\cite{smith2020,doe2021}", MarkerSyntax::Command);
            assert_eq!(markers.len(), 1);
            assert_eq!(
                markers[0].keys,
                vec!["smith2020".to_string(), "doe2021".to_string()]
            );
        }

        #[test]
        fn keys_are_trimmed() {
            let markers = parse_markers("\\cite{ smith2020 , doe2021 }", MarkerSyntax::Command);
            assert_eq!(
                markers[0].keys,
                vec!["smith2020".to_string(), "doe2021".to_string()]
            );
        }

        #[test]
        fn note_before_keys() {
            let markers =
                parse_markers("\\cite[Section 4]{smith2020}", MarkerSyntax::Command);
            assert_eq!(markers[0].suffix, Some("Section 4".to_string()));
            assert_eq!(markers[0].keys, vec!["smith2020".to_string()]);
        }

        #[test]
        fn note_is_trimmed() {
            let markers = parse_markers("\\cite[ p. 3 ]{smith2020}", MarkerSyntax::Command);
            assert_eq!(markers[0].suffix, Some("p. 3".to_string()));
        }

        #[test]
        fn empty_note_is_no_suffix() {
            let markers = parse_markers("\\cite[]{smith2020}", MarkerSyntax::Command);
            assert_eq!(markers[0].suffix, None);
        }

        #[test]
        fn markers_in_document_order() {
            let markers = parse_markers(
                "First \\cite{b}. Then \\cite{a}.",
                MarkerSyntax::Command,
            );
            assert_eq!(markers[0].keys, vec!["b".to_string()]);
            assert_eq!(markers[1].keys, vec!["a".to_string()]);
        }

        #[test]
        fn other_command_names_do_not_match() {
            assert!(parse_markers("\\citep{smith2020}", MarkerSyntax::Command).is_empty());
            assert!(parse_markers("\\fullcite{smith2020}", MarkerSyntax::Command).is_empty());
        }

        #[test]
        fn unbalanced_braces_do_not_match() {
            assert!(parse_markers("\\cite{smith2020", MarkerSyntax::Command).is_empty());
            assert!(parse_markers("\\cite[note{smith2020}", MarkerSyntax::Command).is_empty());
        }

        #[test]
        fn wrong_bracket_order_does_not_match() {
            // A note after the key list isn't a note at all.
            let markers = parse_markers("\\cite{smith2020}[note]", MarkerSyntax::Command);
            assert_eq!(markers.len(), 1);
            assert_eq!(markers[0].text, "\\cite{smith2020}");
            assert_eq!(markers[0].suffix, None);

            assert!(parse_markers("\\cite[note]", MarkerSyntax::Command).is_empty());
        }

        #[test]
        fn empty_or_invalid_key_segments_do_not_match() {
            assert!(parse_markers("\\cite{}", MarkerSyntax::Command).is_empty());
            assert!(parse_markers("\\cite{smith2020,}", MarkerSyntax::Command).is_empty());
            assert!(parse_markers("\\cite{smith 2020}", MarkerSyntax::Command).is_empty());
        }

        #[test]
        fn newlines_break_a_marker() {
            assert!(parse_markers("\\cite{smith2020,\ndoe2021}", MarkerSyntax::Command).is_empty());
        }

        #[test]
        fn bracket_form_passes_through() {
            assert!(parse_markers("[@smith2020, p. 123]", MarkerSyntax::Command).is_empty());
        }
    }

    mod bracket_form {
        use super::*;

        #[test]
        fn simple_cite() {
            let markers = parse_markers("Text with [@author] cite", MarkerSyntax::Bracket);
            assert_eq!(
                markers,
                vec![Marker::new("[@author]", vec!["author".to_string()], None)]
            );
        }

        #[test]
        fn cite_with_suffix() {
            let markers = parse_markers("Text with [@author, p. 123] cite", MarkerSyntax::Bracket);
            assert_eq!(
                markers,
                vec![Marker::new(
                    "[@author, p. 123]",
                    vec!["author".to_string()],
                    Some("p. 123".to_string())
                )]
            );
        }

        #[test]
        fn adjacent_cites_stay_separate() {
            let markers = parse_markers("[@author], xxxx [@author2]", MarkerSyntax::Bracket);
            assert_eq!(markers.len(), 2);
            assert_eq!(markers[0].text, "[@author]");
            assert_eq!(markers[1].text, "[@author2]");
        }

        #[test]
        fn negative_author_form_does_not_match() {
            assert!(parse_markers("[-@author]", MarkerSyntax::Bracket).is_empty());
        }

        #[test]
        fn semicolon_multi_key_does_not_match() {
            assert!(parse_markers("[@author; @doe]", MarkerSyntax::Bracket).is_empty());
        }

        #[test]
        fn email_like_text_does_not_match() {
            assert!(parse_markers("[mail@example.com]", MarkerSyntax::Bracket).is_empty());
            assert!(parse_markers("[mail @example.com]", MarkerSyntax::Bracket).is_empty());
        }

        #[test]
        fn complex_keys() {
            let markers = parse_markers("[@author1:1000xx]", MarkerSyntax::Bracket);
            assert_eq!(markers[0].keys, vec!["author1:1000xx".to_string()]);
        }

        #[test]
        fn command_form_passes_through() {
            assert!(parse_markers("\\cite{smith2020}", MarkerSyntax::Bracket).is_empty());
        }
    }

    mod extraction {
        use super::*;

        #[test]
        fn locate_and_extract_agree() {
            let input = "One \\cite[n]{a, b} and two \\cite{c}.";
            let located = locate_markers(input, MarkerSyntax::Command);
            assert_eq!(located, vec!["\\cite[n]{a, b}", "\\cite{c}"]);

            let (keys, suffix) = extract_keys(located[0], MarkerSyntax::Command);
            assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(suffix, Some("n".to_string()));
        }

        #[test]
        fn malformed_marker_extracts_nothing() {
            let (keys, suffix) = extract_keys("[-@author]", MarkerSyntax::Bracket);
            assert!(keys.is_empty());
            assert_eq!(suffix, None);

            let (keys, _) = extract_keys("\\cite{smith2020", MarkerSyntax::Command);
            assert!(keys.is_empty());
        }

        #[test]
        fn bracket_extract_strips_at_sign() {
            let (keys, _) = extract_keys("[@author]", MarkerSyntax::Bracket);
            assert_eq!(keys, vec!["author".to_string()]);
        }
    }
}
