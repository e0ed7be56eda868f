//! The structures and functions for configuration. Must be accessible to main.

/// The overall options.
pub struct BibnoteConfig<'a> {
    pub inputs: Vec<&'a str>,
    pub library: &'a str,
    pub output: Option<&'a str>,
    pub proc_config: ProcConfig,
}

impl BibnoteConfig<'_> {
    pub fn new<'a>(
        inputs: Vec<&'a str>,
        library: &'a str,
        output: Option<&'a str>,
        proc_config: ProcConfig,
    ) -> BibnoteConfig<'a> {
        BibnoteConfig {
            inputs,
            library,
            output,
            proc_config,
        }
    }
}

/// The citation-marker syntax for a build.
///
/// Only one syntax is canonical per build. Markers in the other syntax pass
/// through the processor untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSyntax {
    /// `\cite[note]{key1, key2}` (the default)
    Command,
    /// `[@key, suffix]`
    Bracket,
}

/// Processor configuration.
///
/// These values are consumed as already validated; [`ProcConfig::new`] is
/// the only way to build them, and it rejects a footnote template missing
/// the `{number}` placeholder.
#[derive(Debug, Clone)]
pub struct ProcConfig {
    pub syntax: MarkerSyntax,
    footnote_format: String,
    pub bib_command: String,
    pub full_bib_command: String,
    pub bib_by_default: bool,
}

impl ProcConfig {
    pub fn new(
        syntax: MarkerSyntax,
        footnote_format: &str,
        bib_command: &str,
        full_bib_command: &str,
        bib_by_default: bool,
    ) -> Result<ProcConfig, String> {
        if !footnote_format.contains("{number}") {
            return Err(
                "the footnote format must include a `{number}` placeholder".to_string()
            );
        }

        Ok(ProcConfig {
            syntax,
            footnote_format: footnote_format.to_string(),
            bib_command: bib_command.to_string(),
            full_bib_command: full_bib_command.to_string(),
            bib_by_default,
        })
    }

    /// Build a footnote label from the template and a footnote id.
    pub fn footnote_label(&self, number: usize) -> String {
        self.footnote_format
            .replace("{number}", &number.to_string())
    }
}

impl Default for ProcConfig {
    /// The default configuration: command syntax, bare numbers, and the
    /// `\bibliography`/`\full_bibliography` command tokens.
    fn default() -> ProcConfig {
        // The default format contains the placeholder, so this can't fail.
        ProcConfig::new(
            MarkerSyntax::Command,
            "{number}",
            "\\bibliography",
            "\\full_bibliography",
            true,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label() {
        let config = ProcConfig::default();
        assert_eq!(config.footnote_label(1), "1");
        assert_eq!(config.footnote_label(42), "42");
    }

    #[test]
    fn custom_label() {
        let config = ProcConfig::new(
            MarkerSyntax::Command,
            "ref-{number}",
            "\\bibliography",
            "\\full_bibliography",
            true,
        )
        .unwrap();
        assert_eq!(config.footnote_label(3), "ref-3");
    }

    #[test]
    /// A template without the placeholder is a fatal configuration error.
    fn missing_placeholder() {
        let result = ProcConfig::new(
            MarkerSyntax::Command,
            "ref-",
            "\\bibliography",
            "\\full_bibliography",
            true,
        );
        assert!(result.unwrap_err().contains("{number}"));
    }
}
