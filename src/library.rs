//! The module contains functionality related to the bibliography entry
//! database.

use serde::Deserialize;
use slog::debug;
use std::collections::HashMap;

/// Struct holding metadata for one bibliography entry in a CSL JSON file.
///
/// This struct holds the data for each entry deserialized from a CSL JSON
/// library. Note, this struct holds only the data that bibnote's plain
/// rendering style uses. Any other data is discarded.
///
/// Based on the [JSON schema for CSL data].
///
/// [JSON schema for CSL data]:
/// (https://github.com/citation-style-language/schema/blob/master/schemas/input/csl-data.json).
#[derive(Debug, Deserialize)]
pub struct Entry {
    pub id: String, // The only non-optional field
    pub author: Option<Vec<Name>>,
    pub issued: Option<Date>,
    #[serde(rename(deserialize = "container-title"))]
    pub container_title: Option<String>,
    pub page: Option<String>,
    pub title: Option<String>,
    #[serde(rename(deserialize = "URL"))]
    pub url: Option<String>,
    pub volume: Option<String>,
}

/// Struct holding the CSL JSON `name-variable` data.
#[derive(Debug, Deserialize)]
pub struct Name {
    pub family: Option<String>,
    pub given: Option<String>,
    pub suffix: Option<String>,
}

/// Struct holding the CSL JSON `date-variable` data.
///
/// Note, `date-parts` data is a collection of collections of one-to-three
/// integers indicating the year, month, and day.
#[derive(Debug, Deserialize)]
pub struct Date {
    #[serde(rename(deserialize = "date-parts"))]
    pub date_parts: Option<Vec<Vec<u32>>>,
}

/// The keyed entry database.
///
/// Entries are owned here and referenced everywhere else by key. The
/// processor never copies or mutates an entry; it only looks keys up.
#[derive(Debug)]
pub struct Library {
    entries: HashMap<String, Entry>,
}

impl Library {
    /// Look a citation key up, returning the entry if the library has it.
    pub fn lookup(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// The number of entries in the library.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deserialize the CSL JSON library.
///
/// Deserialize a string of JSON into a [`Library`] keyed by each entry's id.
pub fn build_library(csl_string: &str) -> Result<Library, String> {
    debug!(slog_scope::logger(), "Starting CSL JSON parsing...");
    let entries: Vec<Entry> = match serde_json::from_str(csl_string) {
        Ok(r) => r,
        Err(e) => {
            let err_msg = format!("error deserializing the CSL JSON library: {}", e);
            return Err(err_msg);
        }
    };
    debug!(slog_scope::logger(), "CSL JSON parsed");

    let entries = entries.into_iter().map(|e| (e.id.clone(), e)).collect();
    Ok(Library { entries })
}
