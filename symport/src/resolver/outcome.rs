//! Per-record decisions and their action-log rendering

use crate::domain::{ModelError, NormalizedAddress};
use std::fmt;

/// What kind of entity a record matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Function,
    PrimarySymbol,
    SecondarySymbol,
}

/// Terminal decision for one symbol record.
///
/// `applied` is false when running in report-only mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    BadAddress { at: NormalizedAddress, name: String, reason: ModelError },
    AlreadyNamed { at: NormalizedAddress, name: String, kind: EntityKind },
    FunctionRenamed { at: NormalizedAddress, old: String, new: String, applied: bool },
    FunctionRenameFailed { at: NormalizedAddress, name: String, reason: ModelError },
    SymbolRenamed { at: NormalizedAddress, old: String, new: String, applied: bool, secondary: bool },
    SymbolRenameFailed { at: NormalizedAddress, name: String, reason: ModelError, secondary: bool },
    Labeled { at: NormalizedAddress, name: String, applied: bool },
    LabelFailed { at: NormalizedAddress, name: String, reason: ModelError },
    NothingToRename { at: NormalizedAddress, name: String },
}

impl Outcome {
    /// Already-satisfied records produce no action-log line
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Outcome::AlreadyNamed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BadAddress { at, name, .. } => write!(f, "[skip] bad address {at} {name}"),
            Outcome::AlreadyNamed { at, name, .. } => write!(f, "[unchanged] {name} at {at}"),
            Outcome::FunctionRenamed { at, old, new, applied } => {
                let tag = if *applied { "renamed-func" } else { "would rename-func" };
                write!(f, "[{tag}] {old} -> {new} at {at}")
            }
            Outcome::FunctionRenameFailed { at, name, reason } => {
                write!(f, "[func rename failed] {name} at {at} ({reason})")
            }
            Outcome::SymbolRenamed { at, old, new, applied, secondary } => {
                let star = if *secondary { "*" } else { "" };
                let tag = if *applied { "renamed-sym" } else { "would rename-sym" };
                write!(f, "[{tag}{star}] {old} -> {new} at {at}")
            }
            Outcome::SymbolRenameFailed { at, name, reason, secondary } => {
                let star = if *secondary { "*" } else { "" };
                write!(f, "[sym{star} rename failed] {name} at {at} ({reason})")
            }
            Outcome::Labeled { at, name, applied } => {
                let tag = if *applied { "labeled" } else { "would label" };
                write!(f, "[{tag}] {name} at {at}")
            }
            Outcome::LabelFailed { at, name, reason } => {
                write!(f, "[label failed] {name} at {at} ({reason})")
            }
            Outcome::NothingToRename { at, name } => {
                write!(f, "[skip] nothing to rename at {at} for {name}")
            }
        }
    }
}
