//! `main.rs` contains the command-line interface for bibnote. It collects
//! the values and options, sets up the logger for debug builds, assembles
//! the configuration, and passes the configuration to the main function.
#[macro_use]
extern crate slog;

use ansi_term::Color;
use bibnote::config::{BibnoteConfig, MarkerSyntax, ProcConfig};
use clap::{crate_version, App, Arg};
use slog::{debug, Drain, Level};
use std::{fs::OpenOptions, process, sync::Mutex};

fn main() -> Result<(), String> {
    // Get the command-line arguments and options
    let matches = App::new("bibnote")
        .version(crate_version!())
        .about("A citation pre-processor for Markdown documentation")
        .arg(
            Arg::with_name("library")
                .value_name("LIBRARY FILE")
                .help("The bibliography library file in CSL JSON format")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::with_name("inputs")
                .value_name("INPUT FILES")
                .help("The Markdown files to process, in build order")
                .index(2)
                .multiple_values(true)
                .required(true),
        )
        .arg(
            Arg::with_name("output")
                .short('o')
                .long("output")
                .value_name("DIRECTORY")
                .help("The directory for processed output (blank outputs to terminal)"),
        )
        .arg(
            Arg::with_name("syntax")
                .short('x')
                .long("syntax")
                .value_name("SYNTAX")
                .help("The citation-marker syntax: \"command\" or \"bracket\"")
                .default_value("command"),
        )
        .arg(
            Arg::with_name("footnote_format")
                .short('f')
                .long("footnote-format")
                .value_name("FORMAT")
                .help("The footnote-label format; must include {number}")
                .default_value("{number}"),
        )
        .arg(
            Arg::with_name("bib_command")
                .long("bib-command")
                .value_name("COMMAND")
                .help("The command marking where a page's bibliography goes")
                .default_value("\\bibliography"),
        )
        .arg(
            Arg::with_name("full_bib_command")
                .long("full-bib-command")
                .value_name("COMMAND")
                .help("The command marking where the full bibliography goes")
                .default_value("\\full_bibliography"),
        )
        .arg(
            Arg::with_name("no_default_bib")
                .short('n')
                .long("no-default-bib")
                .takes_value(false)
                .help("Don't append the bibliography command to every page"),
        )
        .arg(
            Arg::with_name("debug")
                .short('d')
                .long("debug")
                .takes_value(false)
                .help("Outputs debug log to bibnote-log.json")
                .hidden_short_help(true)
                .hidden_long_help(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short('v')
                .long("verbose")
                .value_name("NUMBER")
                .help("Verbosity level between 0 and 5")
                .hidden_short_help(true)
                .hidden_long_help(true)
                .default_value("1"),
        )
        .get_matches();

    // Setup the logger.
    //
    // If the debug flag is set, the log is output to a file
    // `bibnote-log.json`. Otherwise, all logging goes to the terminal.
    let debug = matches.is_present("debug");
    let min_log_level = match matches.value_of("verbose").unwrap() {
        "0" => Level::Critical,
        "1" => Level::Error,
        "2" => Level::Warning,
        "3" => Level::Info,
        "4" => Level::Debug,
        "5" => Level::Trace,
        _ => Level::Info,
    };

    let term_decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::CompactFormat::new(term_decorator).build().fuse();
    let term_drain = term_drain.filter_level(min_log_level).fuse();

    let _guard: slog_scope::GlobalLoggerGuard = if debug {
        // Setup the file AND terminal loggers
        let log_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("./bibnote-log.json")
            .unwrap();
        let file_drain = slog_json::Json::new(log_file)
            .set_pretty(true)
            .add_default_keys()
            .build()
            .fuse();
        let file_drain = file_drain.filter_level(Level::Trace).fuse();
        let dual_logger = slog::Logger::root(
            Mutex::new(slog::Duplicate(term_drain, file_drain)).fuse(),
            o!("version" => crate_version!()),
        );
        slog_scope::set_global_logger(dual_logger)
    } else {
        // Setup just the terminal logger
        let term_logger = slog::Logger::root(
            Mutex::new(term_drain).fuse(),
            o!("version" => crate_version!()),
        );
        slog_scope::set_global_logger(term_logger)
    };

    debug!(slog_scope::logger(), "Logger setup");

    // Setup the configuration variables.
    //
    // Files
    let library = matches.value_of("library").unwrap();
    let inputs: Vec<&str> = matches.values_of("inputs").unwrap().collect();
    let output = matches.value_of("output");

    // Processor options
    let syntax = match matches.value_of("syntax").unwrap() {
        "command" => MarkerSyntax::Command,
        "bracket" => MarkerSyntax::Bracket,
        s => {
            eprintln!(
                "{} The syntax must be \"command\" or \"bracket\". You used {}",
                Color::Red.paint("ERRO"),
                Color::Blue.paint(s)
            );
            process::exit(1);
        }
    };
    let footnote_format = matches.value_of("footnote_format").unwrap();
    let bib_command = matches.value_of("bib_command").unwrap();
    let full_bib_command = matches.value_of("full_bib_command").unwrap();
    let bib_by_default = !matches.is_present("no_default_bib");

    // Configuration errors are fatal; report and exit before any document
    // is touched.
    let proc_config = match ProcConfig::new(
        syntax,
        footnote_format,
        bib_command,
        full_bib_command,
        bib_by_default,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} Configuration error: {}", Color::Red.paint("ERRO"), e);
            process::exit(1);
        }
    };

    let config = BibnoteConfig::new(inputs, library, output, proc_config);

    // Run the program.
    let _ = bibnote::bibnote(config);

    Ok(())
}
