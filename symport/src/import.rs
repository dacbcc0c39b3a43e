//! Import pipeline
//!
//! Streams a symbol file through the parser and the resolver, one record
//! at a time, writing the action log as it goes. Directive records are
//! never resolved. A cancel flag is polled between records; whatever was
//! tallied up to that point is still returned.

use crate::domain::ImportError;
use crate::program::ProgramModel;
use crate::resolver::{Mode, RenameResolver, RunStatistics};
use crate::symfile::RecordStream;
use log::{debug, info};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Create a primary label when nothing exists at an address
    pub create_label_if_missing: bool,
    /// Decide and log everything, mutate nothing
    pub report_only: bool,
    /// Write one action-log line per decision
    pub log_actions: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { create_label_if_missing: true, report_only: false, log_actions: true }
    }
}

impl ImportOptions {
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.report_only {
            Mode::ReportOnly
        } else {
            Mode::Apply
        }
    }
}

/// Everything a finished (or cancelled) run knows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub stats: RunStatistics,
    pub lines: u64,
    pub directives: u64,
    pub malformed: u64,
    pub cancelled: bool,
}

pub struct Importer {
    options: ImportOptions,
    resolver: RenameResolver,
    cancel: Option<Arc<AtomicBool>>,
}

impl Importer {
    #[must_use]
    pub fn new(options: ImportOptions) -> Self {
        let resolver = RenameResolver::new(options.mode(), options.create_label_if_missing);
        Self { options, resolver, cancel: None }
    }

    /// Stop before the next record once `flag` is set
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Import every symbol record from `input` into `model`.
    ///
    /// # Errors
    /// Only I/O failures reading `input` or writing `out` end the run;
    /// rejected renames and labels are tallied instead.
    pub fn run<R, M, W>(
        &self,
        input: R,
        model: &mut M,
        out: &mut W,
    ) -> Result<ImportSummary, ImportError>
    where
        R: BufRead,
        M: ProgramModel,
        W: Write,
    {
        self.run_stream(RecordStream::new(input), model, out)
    }

    /// Same as [`Importer::run`], over an already opened record stream
    ///
    /// # Errors
    /// See [`Importer::run`].
    pub fn run_stream<R, M, W>(
        &self,
        mut stream: RecordStream<R>,
        model: &mut M,
        out: &mut W,
    ) -> Result<ImportSummary, ImportError>
    where
        R: BufRead,
        M: ProgramModel,
        W: Write,
    {
        let mut stats = RunStatistics::new();
        let mut cancelled = false;

        info!(
            "Importing symbols (create labels: {}, report only: {})",
            self.options.create_label_if_missing, self.options.report_only
        );

        loop {
            if self.cancelled() {
                info!("Import cancelled after {} lines", stream.counts().lines);
                cancelled = true;
                break;
            }

            let Some(record) = stream.next() else { break };
            let record = record?;
            if !record.is_symbol() {
                debug!("{}: directive {} ignored", record.address, record.name);
                continue;
            }

            let outcome = self.resolver.resolve(&record, model, &mut stats);
            if self.options.log_actions && !outcome.is_silent() {
                writeln!(out, "{outcome}")?;
            }
        }

        let counts = stream.counts();
        Ok(ImportSummary {
            stats,
            lines: counts.lines,
            directives: counts.directives,
            malformed: counts.malformed,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ProgramDatabase, SourceType};
    use std::io::Cursor;

    fn db() -> ProgramDatabase {
        let mut db = ProgramDatabase::new("test").with_block("ram", 0x0200_0000, 0x1000);
        db.add_function("FUN_02000000", 0x0200_0000, 0x10, SourceType::Analysis);
        db
    }

    #[test]
    fn test_run_writes_action_log() {
        let mut db = db();
        let mut out = Vec::new();
        let input = "02000000 Start\n02000000 .arm\n02000101 Helper\n";

        let summary =
            Importer::new(ImportOptions::default()).run(Cursor::new(input), &mut db, &mut out).unwrap();

        let log = String::from_utf8(out).unwrap();
        assert_eq!(
            log,
            "[renamed-func] FUN_02000000 -> Start at 02000000\n\
             [labeled] Helper at 02000100\n"
        );
        assert_eq!(summary.stats.renamed_fn, 1);
        assert_eq!(summary.stats.labeled, 1);
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.directives, 1);
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_quiet_run_writes_nothing() {
        let mut db = db();
        let mut out = Vec::new();
        let options = ImportOptions { log_actions: false, ..ImportOptions::default() };

        let summary =
            Importer::new(options).run(Cursor::new("02000100 Foo\n"), &mut db, &mut out).unwrap();

        assert!(out.is_empty());
        assert_eq!(summary.stats.labeled, 1);
    }

    #[test]
    fn test_cancel_flag_stops_between_records() {
        let mut db = db();
        let mut out = Vec::new();
        let flag = Arc::new(AtomicBool::new(true));

        let summary = Importer::new(ImportOptions::default())
            .with_cancel_flag(Arc::clone(&flag))
            .run(Cursor::new("02000000 Start\n02000100 Foo\n"), &mut db, &mut out)
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.stats, RunStatistics::default());
        assert!(db.function_named("FUN_02000000").is_some());
    }

    /// Raises the cancel flag as soon as the first action-log line is written
    struct CancelOnWrite {
        flag: Arc<AtomicBool>,
        written: Vec<u8>,
    }

    impl Write for CancelOnWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.flag.store(true, Ordering::Relaxed);
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cancel_mid_run_keeps_partial_statistics() {
        let mut db = db();
        let flag = Arc::new(AtomicBool::new(false));
        let mut out = CancelOnWrite { flag: Arc::clone(&flag), written: Vec::new() };
        let input = "02000000 Start\n02000100 Foo\n02000200 Bar\n";

        let summary = Importer::new(ImportOptions::default())
            .with_cancel_flag(flag)
            .run(Cursor::new(input), &mut db, &mut out)
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.lines, 1);
        assert_eq!(
            summary.stats,
            RunStatistics { renamed_fn: 1, renamed_sym: 0, labeled: 0, collisions: 0, skipped: 0 }
        );
        // Work done before the cancel stays applied
        assert!(db.function_named("Start").is_some());
        assert!(db.symbols_named("Foo").is_empty());
        assert_eq!(
            String::from_utf8(out.written).unwrap(),
            "[renamed-func] FUN_02000000 -> Start at 02000000\n"
        );
    }

    #[test]
    fn test_options_mode() {
        assert_eq!(ImportOptions::default().mode(), Mode::Apply);
        let options = ImportOptions { report_only: true, ..ImportOptions::default() };
        assert_eq!(options.mode(), Mode::ReportOnly);
    }
}
