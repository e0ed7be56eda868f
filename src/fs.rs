//! Functions for interacting with the file system.

use ansi_term::Color;
use slog::debug;
use std::{fs, path::Path, time::SystemTime};

/// Load a file into a string.
///
/// This function is used to load both the markdown and CSL JSON files into
/// strings, which can then be passed to the main function.
pub fn load_file(path: &Path) -> Result<String, String> {
    debug!(
        slog_scope::logger(),
        "Loading file {}...",
        path.to_string_lossy()
    );

    match fs::read_to_string(path) {
        Ok(r) => {
            debug!(
                slog_scope::logger(),
                "File {} loaded.",
                path.to_string_lossy()
            );
            Ok(r)
        }
        Err(e) => {
            let err_msg = format!("error reading the file {}: {}", path.to_string_lossy(), e);
            Err(err_msg)
        }
    }
}

/// Save a string in a file.
///
/// This function saves the provided string to a file. It is used when
/// outputting the processed Markdown.
pub fn save_file(path: &Path, output: &str) -> Result<(), String> {
    debug!(slog_scope::logger(), "Saving {}...", path.to_string_lossy());
    eprintln!(
        "{} Saving {}...",
        Color::Green.paint("INFO"),
        Color::Blue.paint(path.to_string_lossy())
    );

    match fs::write(path, output) {
        Ok(_) => {
            debug!(
                slog_scope::logger(),
                "File {} saved.",
                path.to_string_lossy()
            );
            Ok(())
        }
        Err(e) => {
            let err_msg = format!("error writing the file {}: {}", path.to_string_lossy(), e);
            Err(err_msg)
        }
    }
}

/// Whether a file has been modified since a given instant.
///
/// This is the staleness signal for the processor's generation: a library
/// file that hasn't changed since the last configuration doesn't warrant a
/// reload or a numbering reset. A file whose metadata can't be read is
/// reported as modified so the caller falls back to reloading.
pub fn modified_since(path: &Path, instant: SystemTime) -> bool {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => mtime >= instant,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    mod test_load_file {
        use super::*;

        #[test]
        fn fail_load() {
            let file = "./tests/does-not-exist.md";
            let load_result = load_file(Path::new(file));
            assert!(load_result
                .unwrap_err()
                .contains("error reading the file"));
        }

        #[test]
        fn roundtrip() {
            let dir = std::env::temp_dir();
            let file = dir.join("bibnote-fs-roundtrip.md");
            save_file(&file, "# Test Document\n").unwrap();
            let load_result = load_file(&file);
            assert!(load_result.unwrap().contains("Test Document"));
            let _ = fs::remove_file(&file);
        }
    }

    mod test_modified_since {
        use super::*;

        #[test]
        fn missing_file_counts_as_modified() {
            assert!(modified_since(
                Path::new("./tests/does-not-exist.md"),
                SystemTime::now()
            ));
        }

        #[test]
        fn old_file_is_not_modified() {
            let dir = std::env::temp_dir();
            let file = dir.join("bibnote-fs-mtime.md");
            fs::write(&file, "contents").unwrap();
            let later = SystemTime::now() + Duration::from_secs(3600);
            assert!(!modified_since(&file, later));
            let _ = fs::remove_file(&file);
        }
    }
}
