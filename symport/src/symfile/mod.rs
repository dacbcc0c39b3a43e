//! # Symbol File Input
//!
//! Reads debugger-exported `.sym` maps (no$gba style): one
//! `address name` binding per line.
//!
//! ```text
//! 02000000 Start
//! 02000000 .arm           <- directive, never applied
//! 0200000D Helper         <- odd address, applied at 0200000C
//! ; anything else         <- dropped silently
//! ```
//!
//! - **`parser`**: pure per-line parsing into [`SymbolRecord`]
//! - **`reader`**: streams records out of a file or any `BufRead`

pub mod parser;
pub mod reader;

pub use parser::{parse_line, RecordKind, SymbolRecord, DIRECTIVE_MARKER};
pub use reader::{open_symbol_file, LineCounts, RecordStream};
