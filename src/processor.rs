//! The bibnote document processor.
//!
//! A [`Processor`] holds one generation of build state: the reference
//! registry, the rendered-entry cache, and the warned-keys set. Documents
//! flow through it one at a time, sharing the generation so footnote ids
//! stay stable across the whole build. Reconfiguration is the only reset
//! point, and it clears all three structures together.

pub mod bibliography;
pub mod marker;
pub mod registry;
pub mod render;
pub mod substitute;

use crate::config::ProcConfig;
use crate::fs;
use crate::library::{self, Library};
use registry::{Quad, ReferenceRegistry};
use render::RenderedCache;
use slog::{debug, o};
use std::collections::HashSet;
use std::path::Path;
use std::time::SystemTime;

/// The citation processor and its generation-scoped state.
pub struct Processor {
    config: ProcConfig,
    library: Library,
    registry: ReferenceRegistry,
    cache: RenderedCache,
    warned: HashSet<String>,
    document_quads: Vec<Quad>,
    last_configured: SystemTime,
}

impl Processor {
    /// Create a processor with a freshly loaded library, starting the
    /// first generation.
    pub fn new(config: ProcConfig, library: Library) -> Processor {
        Processor {
            config,
            library,
            registry: ReferenceRegistry::new(),
            cache: RenderedCache::new(),
            warned: HashSet::new(),
            document_quads: Vec::new(),
            last_configured: SystemTime::now(),
        }
    }

    /// Reconfigure from a library file, renewing the generation only when
    /// the file changed.
    ///
    /// An unchanged library means numbering from the previous generation
    /// stays valid, so incremental rebuilds keep their footnote ids. A
    /// changed file reloads the library and clears the registry, cache,
    /// and warned set together; clearing them independently would let ids
    /// and warnings drift apart.
    pub fn reconfigure(&mut self, library_path: &Path) -> Result<(), String> {
        if !fs::modified_since(library_path, self.last_configured) {
            debug!(
                slog_scope::logger(),
                "Library unchanged; keeping the current generation"
            );
            return Ok(());
        }

        let contents = fs::load_file(library_path)?;
        let library = slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "build_library()")),
            || library::build_library(&contents),
        )?;

        self.library = library;
        self.registry.clear();
        self.cache.clear();
        self.warned.clear();
        self.document_quads.clear();
        self.last_configured = SystemTime::now();

        debug!(slog_scope::logger(), "New generation started");
        Ok(())
    }

    /// Process one document's text.
    ///
    /// Locates and extracts markers, resolves them against the library and
    /// the registry, substitutes footnote references, and inserts the
    /// bibliography listings at their command tokens. Processing the same
    /// text twice in one generation yields identical output.
    pub fn process_document(&mut self, text: &str) -> String {
        debug!(slog_scope::logger(), "Processing document...");

        // Locate the markers and extract their keys.
        let markers = slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "parse_markers()")),
            || marker::parse_markers(text, self.config.syntax),
        );

        // Resolve the keys and assign footnote ids.
        let quads = slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "resolve()")),
            || {
                registry::resolve(
                    &markers,
                    &self.library,
                    &self.config,
                    &mut self.registry,
                    &mut self.cache,
                    &mut self.warned,
                )
            },
        );

        // Rewrite the markers into footnote references.
        let mut output = slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "substitute()")),
            || substitute::substitute(text, &markers, &quads),
        );

        // Insert the bibliography listings at their command tokens.
        if self.config.bib_by_default {
            output.push('\n');
            output.push_str(&self.config.bib_command);
        }
        output = output.replace(
            &self.config.bib_command,
            &bibliography::document_bibliography(&quads),
        );
        output = output.replace(
            &self.config.full_bib_command,
            &bibliography::full_bibliography(&self.registry, &self.config),
        );

        self.document_quads = quads;

        debug!(slog_scope::logger(), "Document processed");
        output
    }

    /// The bibliography for the most recently processed document.
    pub fn document_bibliography(&self) -> String {
        bibliography::document_bibliography(&self.document_quads)
    }

    /// The full-corpus bibliography: every key seen so far this
    /// generation, in footnote-id order.
    pub fn full_bibliography(&self) -> String {
        bibliography::full_bibliography(&self.registry, &self.config)
    }
}
