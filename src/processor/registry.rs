//! This module contains the resolution and numbering engine.
//!
//! The engine owns the build-wide reference registry: every distinct key
//! resolved in the current generation, in first-encounter order, with its
//! footnote id and rendered text. Ids are the 1-based rank among all keys
//! seen so far across every document in the generation. Keys missing from
//! the library never enter the registry; each one warns at most once per
//! generation.

use crate::config::ProcConfig;
use crate::library::Library;
use crate::processor::marker::Marker;
use crate::processor::render::RenderedCache;
use slog::{trace, warn};
use std::collections::{HashMap, HashSet};

/// One resolved citation: the marker it came from, the key, the formatted
/// footnote label, and the rendered entry text. Recomputed per document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quad {
    pub marker: String,
    pub key: String,
    pub label: String,
    pub rendered: String,
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub key: String,
    pub rendered: String,
}

/// The build-wide reference registry.
///
/// Append-only within a generation. The id of a key is its 1-based position
/// in first-encounter order; ids strictly increase and are never reused.
#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    references: Vec<Reference>,
    ids: HashMap<String, usize>,
}

impl ReferenceRegistry {
    pub fn new() -> ReferenceRegistry {
        ReferenceRegistry {
            references: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// The footnote id assigned to a key, if it has been resolved.
    pub fn id_of(&self, key: &str) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// Append a key, assigning the next sequential id. Returns the id; a
    /// key already present keeps the id it was first given.
    fn insert(&mut self, key: &str, rendered: String) -> usize {
        if let Some(id) = self.id_of(key) {
            return id;
        }

        self.references.push(Reference {
            key: key.to_string(),
            rendered,
        });
        let id = self.references.len();
        self.ids.insert(key.to_string(), id);
        id
    }

    /// The registered references in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Reference)> {
        self.references.iter().enumerate().map(|(n, r)| (n + 1, r))
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Clear the registry for a new generation.
    pub fn clear(&mut self) {
        self.references.clear();
        self.ids.clear();
    }
}

/// Resolve one document's markers against the library and the registry.
///
/// Keys missing from the library are discarded (warning once per key per
/// generation); fresh keys are rendered and appended to the registry; the
/// result is the document's ordered, deduplicated quad list. Resolving the
/// same input twice in one generation returns identical quads and mutates
/// nothing.
pub fn resolve(
    markers: &[Marker],
    library: &Library,
    config: &ProcConfig,
    registry: &mut ReferenceRegistry,
    cache: &mut RenderedCache,
    warned: &mut HashSet<String>,
) -> Vec<Quad> {
    // Document-local candidate numbering, first-seen order within this
    // call. Informational only: the registry rank is what labels use.
    let mut local_order: Vec<&str> = Vec::new();
    for marker in markers {
        for key in &marker.keys {
            if !local_order.contains(&key.as_str()) {
                local_order.push(key);
            }
        }
    }
    trace!(
        slog_scope::logger(),
        "Document cites {} distinct key(s): {:?}",
        local_order.len(),
        local_order
    );

    let mut quads: Vec<Quad> = Vec::new();

    for marker in markers {
        for key in &marker.keys {
            let entry = match library.lookup(key) {
                Some(e) => e,
                None => {
                    // A missing key warns once per generation, no matter
                    // how many markers or documents cite it.
                    if !warned.contains(key) {
                        warn!(
                            slog_scope::logger(),
                            "Citation key {:?} not found in the library", key
                        );
                        warned.insert(key.clone());
                    }
                    continue;
                }
            };

            let rendered = cache.get_or_render(key, entry);
            let id = registry.insert(key, rendered.clone());

            let quad = Quad {
                marker: marker.text.clone(),
                key: key.clone(),
                label: config.footnote_label(id),
                rendered,
            };
            // Dedup by full tuple equality, first occurrence kept.
            if !quads.contains(&quad) {
                quads.push(quad);
            }
        }
    }

    quads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerSyntax;
    use crate::library::build_library;
    use crate::processor::marker::parse_markers;

    const TESTJSON: &str = r#"[{"id": "smith2020","author": [{"family": "Smith","given": "John"}],"container-title": "Example Journal","issued": {"date-parts": [[2020]]},"page": "101","title": "Example Title","type": "article-journal","volume": "15"},{"id": "doe2021","author": [{"family": "Doe","given": "Jane"}],"issued": {"date-parts": [[2021]]},"title": "Another Example Title","type": "book"},{"id": "roe2022","author": [{"family": "Roe","given": "Riley"}],"issued": {"date-parts": [[2022]]},"title": "A Third Example","type": "book"}]"#;

    struct Engine {
        registry: ReferenceRegistry,
        cache: RenderedCache,
        warned: HashSet<String>,
    }

    impl Engine {
        fn new() -> Engine {
            Engine {
                registry: ReferenceRegistry::new(),
                cache: RenderedCache::new(),
                warned: HashSet::new(),
            }
        }

        fn resolve(&mut self, text: &str) -> Vec<Quad> {
            let library = build_library(TESTJSON).unwrap();
            let config = ProcConfig::default();
            let markers = parse_markers(text, MarkerSyntax::Command);
            resolve(
                &markers,
                &library,
                &config,
                &mut self.registry,
                &mut self.cache,
                &mut self.warned,
            )
        }
    }

    #[test]
    fn first_seen_order_within_a_document() {
        let mut engine = Engine::new();
        let quads = engine.resolve("\\cite{doe2021} then \\cite{smith2020,doe2021}");

        assert_eq!(quads.len(), 3);
        assert_eq!(quads[0].key, "doe2021");
        assert_eq!(quads[0].label, "1");
        assert_eq!(quads[1].key, "smith2020");
        assert_eq!(quads[1].label, "2");
        assert_eq!(quads[2].key, "doe2021");
        assert_eq!(quads[2].label, "1");
    }

    #[test]
    fn ids_continue_across_documents() {
        let mut engine = Engine::new();
        engine.resolve("\\cite{smith2020}");
        let quads = engine.resolve("\\cite{doe2021} and \\cite{smith2020}");

        assert_eq!(quads[0].label, "2");
        assert_eq!(quads[1].label, "1");
        assert_eq!(engine.registry.len(), 2);
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut engine = Engine::new();
        let first = engine.resolve("\\cite{smith2020,doe2021}");
        let second = engine.resolve("\\cite{smith2020,doe2021}");

        assert_eq!(first, second);
        assert_eq!(engine.registry.len(), 2);
    }

    #[test]
    fn missing_keys_never_enter_the_registry() {
        let mut engine = Engine::new();
        let quads = engine.resolve("\\cite{missing2019,smith2020}");

        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].key, "smith2020");
        assert_eq!(quads[0].label, "1");
        assert_eq!(engine.registry.id_of("missing2019"), None);
    }

    #[test]
    fn missing_key_warns_once_per_generation() {
        let mut engine = Engine::new();
        engine.resolve("\\cite{missing2019}");
        engine.resolve("\\cite[p. 2]{missing2019}");

        assert_eq!(engine.warned.len(), 1);
        assert!(engine.warned.contains("missing2019"));
    }

    #[test]
    fn identical_quads_deduplicate() {
        let mut engine = Engine::new();
        let quads = engine.resolve("\\cite{smith2020} and again \\cite{smith2020}");

        assert_eq!(quads.len(), 1);
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut engine = Engine::new();
        engine.resolve("\\cite{smith2020}");
        engine.resolve("\\cite{doe2021}");

        engine.registry.clear();
        engine.cache.clear();
        engine.warned.clear();

        let quads = engine.resolve("\\cite{roe2022}");
        assert_eq!(quads[0].label, "1");
        assert_eq!(engine.registry.len(), 1);
    }

    #[test]
    fn rendered_text_is_stable_for_a_generation() {
        let mut engine = Engine::new();
        let first = engine.resolve("\\cite{smith2020}");
        let second = engine.resolve("\\cite[again]{smith2020}");

        assert_eq!(first[0].rendered, second[0].rendered);
    }
}
