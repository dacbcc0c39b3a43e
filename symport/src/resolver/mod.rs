//! # Rename Resolution
//!
//! Decides, for one `(address, name)` binding, which existing entity gets
//! the name. The decision is a strict fallback chain; the first step that
//! finds something owns the record and nothing after it runs:
//!
//! ```text
//! normalize + resolve address ──invalid──► skipped
//!          │
//!          ▼
//! 1. function at / containing ──► rename function   (fail: collision)
//!          │ none
//!          ▼
//! 2. primary symbol at        ──► rename symbol     (fail: collision)
//!          │ none
//!          ▼
//! 3. any symbol at            ──► rename first one  (fail: collision)
//!          │ none
//!          ▼
//! 4. create label (if enabled) ──► labeled          (fail / disabled: skipped)
//! ```
//!
//! At most one mutation happens per record. A rejected rename is terminal:
//! a function-level collision never spills over onto a symbol at the same
//! address.

pub mod outcome;
#[allow(clippy::module_inception)]
pub mod resolver;
pub mod stats;

pub use outcome::{EntityKind, Outcome};
pub use resolver::{Mode, RenameResolver};
pub use stats::RunStatistics;
