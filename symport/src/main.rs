//! # symport - Main Entry Point
//!
//! Parses arguments, loads the program database, streams the symbol file
//! through the importer and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use symport::cli::Args;
use symport::import::Importer;
use symport::preflight::{check_program_paths, check_symbol_file, SymbolFileStatus};
use symport::program::ProgramDatabase;
use symport::symfile::open_symbol_file;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOINPUT: i32 = 66;
const EXIT_INTERRUPTED: i32 = 130;

/// How a run ended without an error
enum RunStatus {
    Completed,
    NoFileSelected,
    Interrupted,
}

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(RunStatus::Completed) => EXIT_SUCCESS,
        Ok(RunStatus::NoFileSelected) => EXIT_NOINPUT,
        Ok(RunStatus::Interrupted) => EXIT_INTERRUPTED,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run() -> Result<RunStatus> {
    let args = Args::parse();
    let options = args.import_options();
    let output = args.output_path();

    let symfile = match check_symbol_file(args.symfile.as_deref()) {
        SymbolFileStatus::Ready => args.symfile.clone().context("symbol file path missing")?,
        SymbolFileStatus::NotSelected => {
            println!("No file selected.");
            return Ok(RunStatus::NoFileSelected);
        }
        SymbolFileStatus::Unreadable(reason) => {
            println!("No file selected. ({reason})");
            return Ok(RunStatus::NoFileSelected);
        }
    };

    check_program_paths(&args.program, &output, options.report_only)?;

    let mut program = ProgramDatabase::load(&args.program)?;
    let input = open_symbol_file(&symfile)
        .with_context(|| format!("Failed to open {}", symfile.display()))?;

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        warn!("Ctrl-C handler not installed, import cannot be interrupted: {e}");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = Importer::new(options)
        .with_cancel_flag(cancel)
        .run_stream(input, &mut program, &mut out)?;

    if summary.cancelled {
        writeln!(out, "Interrupted after {} lines, statistics are partial", summary.lines)?;
    }
    writeln!(out, "Done: {}", summary.stats)?;
    out.flush()?;

    info!(
        "{} lines read ({} directives, {} not symbol lines)",
        summary.lines, summary.directives, summary.malformed
    );

    // Changes applied before an interrupt are kept and saved
    if options.report_only {
        info!("Report-only run, {} left untouched", args.program.display());
    } else {
        program.save(&output).context("Failed to write program database")?;
    }

    if let Some(path) = args.stats_json {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &summary.stats)
            .context("Failed to write statistics")?;
        writer.flush()?;
    }

    if summary.cancelled {
        Ok(RunStatus::Interrupted)
    } else {
        Ok(RunStatus::Completed)
    }
}
