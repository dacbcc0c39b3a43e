//! Run counters

use super::outcome::Outcome;
use serde::Serialize;
use std::fmt;

/// The five counters every run reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub renamed_fn: u64,
    pub renamed_sym: u64,
    pub labeled: u64,
    pub collisions: u64,
    pub skipped: u64,
}

impl RunStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one record's outcome
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::FunctionRenamed { .. } => self.renamed_fn += 1,
            Outcome::SymbolRenamed { .. } => self.renamed_sym += 1,
            Outcome::Labeled { .. } => self.labeled += 1,
            Outcome::FunctionRenameFailed { .. } | Outcome::SymbolRenameFailed { .. } => {
                self.collisions += 1;
            }
            Outcome::BadAddress { .. }
            | Outcome::LabelFailed { .. }
            | Outcome::NothingToRename { .. } => self.skipped += 1,
            Outcome::AlreadyNamed { .. } => {}
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "renamed_fn={}, renamed_sym={}, labeled={}, collisions={}, skipped={}",
            self.renamed_fn, self.renamed_sym, self.labeled, self.collisions, self.skipped
        )
    }
}
