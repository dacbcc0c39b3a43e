//! CLI argument definitions

use crate::import::ImportOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "symport",
    about = "Rename functions and symbols in a program database from a .sym file",
    after_help = "\
EXAMPLES:
    symport game.sym --program game.json                 Apply names in place
    symport game.sym --program game.json --report-only   Show what would change
    symport game.sym --program game.json -o named.json   Write to a new database"
)]
pub struct Args {
    /// Symbol file to import (address/name per line)
    #[arg(value_name = "SYMFILE")]
    pub symfile: Option<PathBuf>,

    /// Program database (JSON) to rename into
    #[arg(short, long, value_name = "FILE")]
    pub program: PathBuf,

    /// Where to write the updated database (defaults to --program)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not create labels where nothing exists at an address
    #[arg(long)]
    pub no_create_labels: bool,

    /// Log intended actions without changing anything
    #[arg(long, visible_alias = "dry-run")]
    pub report_only: bool,

    /// Also write the run statistics as JSON
    #[arg(long, value_name = "FILE")]
    pub stats_json: Option<PathBuf>,

    /// Suppress the per-symbol action log
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            create_label_if_missing: !self.no_create_labels,
            report_only: self.report_only,
            log_actions: !self.quiet,
        }
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.program.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["symport", "game.sym", "--program", "game.json"]);
        let options = args.import_options();
        assert!(options.create_label_if_missing);
        assert!(!options.report_only);
        assert!(options.log_actions);
        assert_eq!(args.output_path(), PathBuf::from("game.json"));
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "symport",
            "--program",
            "game.json",
            "--dry-run",
            "--no-create-labels",
            "-q",
            "-o",
            "named.json",
        ]);
        assert!(args.symfile.is_none());
        let options = args.import_options();
        assert!(!options.create_label_if_missing);
        assert!(options.report_only);
        assert!(!options.log_actions);
        assert_eq!(args.output_path(), PathBuf::from("named.json"));
    }

    #[test]
    fn test_program_is_required() {
        assert!(Args::try_parse_from(["symport", "game.sym"]).is_err());
    }
}
