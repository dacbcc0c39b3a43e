//! Pre-flight checks for symport
//!
//! Validates the input paths before a run starts so that a bad invocation
//! fails with one clear message instead of a half-finished import.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;

/// Outcome of looking for the symbol file
#[derive(Debug, PartialEq, Eq)]
pub enum SymbolFileStatus {
    Ready,
    NotSelected,
    Unreadable(String),
}

/// Check that a symbol file was given and can be opened
pub fn check_symbol_file(path: Option<&Path>) -> SymbolFileStatus {
    let Some(path) = path else {
        return SymbolFileStatus::NotSelected;
    };
    if path.is_dir() {
        return SymbolFileStatus::Unreadable(format!("{} is a directory", path.display()));
    }
    match File::open(path) {
        Ok(_) => SymbolFileStatus::Ready,
        Err(e) => SymbolFileStatus::Unreadable(format!("{}: {e}", path.display())),
    }
}

/// Check the program database exists and the output location is writable
pub fn check_program_paths(program: &Path, output: &Path, report_only: bool) -> Result<()> {
    if !program.exists() {
        bail!(
            "Program database not found: {}\n\n\
             Export one from your analysis tool or pass --program <FILE>",
            program.display()
        );
    }
    File::open(program)
        .with_context(|| format!("Cannot read program database {}", program.display()))?;

    if report_only {
        return Ok(());
    }

    let parent = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    if !parent.is_dir() {
        bail!("Output directory does not exist: {}", parent.display());
    }
    Ok(())
}
