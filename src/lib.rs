//! Contains the main bibnote function. Loads the bibliography library,
//! runs every document through one shared processor generation, and writes
//! the results.

pub mod config;
mod fs;
pub mod library;
pub mod processor;

use ansi_term::Color;
use config::BibnoteConfig;
use fs::{load_file, save_file};
use processor::Processor;
use slog::{debug, error, o};
use std::{path::Path, process};

/// The main bibnote function.
pub fn bibnote(config: BibnoteConfig) -> Result<(), String> {
    eprintln!("{} Starting bibnote...", Color::Green.paint("INFO"));

    // Load the CSL JSON library.
    let library_string = match slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "load_file()")),
        || load_file(Path::new(config.library)),
    ) {
        Ok(l) => l,
        Err(e) => {
            error!(slog_scope::logger(), "Library load error: {}", e);
            eprintln!("{} Library load error: {}", Color::Red.paint("ERRO"), e);
            process::exit(1);
        }
    };

    let library = match slog_scope::scope(
        &slog_scope::logger().new(o!("fn" => "build_library()")),
        || library::build_library(&library_string),
    ) {
        Ok(l) => l,
        Err(e) => {
            error!(slog_scope::logger(), "Library parse error: {}", e);
            eprintln!("{} Library parse error: {}", Color::Red.paint("ERRO"), e);
            process::exit(1);
        }
    };

    debug!(
        slog_scope::logger(),
        "Library loaded with {} entries",
        library.len()
    );

    // One processor for the whole build, so footnote ids stay stable
    // across every document.
    let mut processor = Processor::new(config.proc_config, library);

    for input in &config.inputs {
        let input_path = Path::new(input);

        let text = match slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "load_file()")),
            || load_file(input_path),
        ) {
            Ok(t) => t,
            Err(e) => {
                error!(slog_scope::logger(), "Markdown load error: {}", e);
                eprintln!("{} Markdown load error: {}", Color::Red.paint("ERRO"), e);
                process::exit(1);
            }
        };

        eprintln!(
            "{} Processing {}...",
            Color::Green.paint("INFO"),
            Color::Blue.paint(*input)
        );

        let output = slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "process_document()")),
            || processor.process_document(&text),
        );

        match config.output {
            Some(dir) => {
                // Write the processed document under the output directory,
                // keeping the input's file name.
                let file_name = match input_path.file_name() {
                    Some(n) => n,
                    None => {
                        eprintln!(
                            "{} Invalid input file name: {}",
                            Color::Red.paint("ERRO"),
                            input
                        );
                        process::exit(1);
                    }
                };
                let output_path = Path::new(dir).join(file_name);
                if let Err(e) = save_file(&output_path, &output) {
                    error!(slog_scope::logger(), "Markdown save error: {}", e);
                    eprintln!("{} Markdown save error: {}", Color::Red.paint("ERRO"), e);
                    process::exit(1);
                }
            }
            None => println!("{}", output),
        }
    }

    eprintln!("{} Done", Color::Green.paint("INFO"));
    Ok(())
}
