//! # symport - Symbol Map Importer
//!
//! symport merges a debugger-exported symbol map (`.sym`, one
//! `address name` pair per line) into a program database that already
//! holds functions and symbols from earlier analysis. It only ever
//! *renames*: it never creates functions, never touches instruction or
//! data definitions, and creates a label only when nothing at all exists
//! at an address and label creation is enabled.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   lines   ┌──────────────┐  records  ┌──────────────┐
//! │  .sym file   │──────────▶│    Parser    │──────────▶│   Importer   │
//! └──────────────┘           │  (symfile)   │           │   (import)   │
//!                            └──────────────┘           └──────┬───────┘
//!                                                              │ symbol records
//!                                                              ▼
//! ┌──────────────┐  lookups / renames / labels   ┌──────────────────────┐
//! │ ProgramModel │◀─────────────────────────────│   RenameResolver     │
//! │  (program)   │                               │     (resolver)       │
//! └──────────────┘                               └──────────┬───────────┘
//!                                                           │ Outcome
//!                                                           ▼
//!                                         action log + RunStatistics summary
//! ```
//!
//! ## Module Structure
//!
//! - [`symfile`]: line parser and streaming reader for `.sym` files
//! - [`resolver`]: the fallback chain (function → primary symbol →
//!   any symbol → new label), per-record [`resolver::Outcome`]s and the
//!   five [`resolver::RunStatistics`] counters
//! - [`program`]: the [`program::ProgramModel`] capability trait and the
//!   JSON-backed [`program::ProgramDatabase`]
//! - [`import`]: drives a whole file through the resolver
//! - [`domain`]: address newtypes and error enums
//! - [`cli`], [`preflight`]: command-line surface
//!
//! ## Addresses
//!
//! Symbol maps for ARM targets mark Thumb code by setting bit 0 of the
//! address. Every lookup uses the address with bit 0 cleared, so
//! `0200000D Helper` names whatever lives at `0200000C`.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Preview
//! symport game.sym --program game.json --report-only
//!
//! # Apply, writing a new database
//! symport game.sym --program game.json --output game.named.json
//! ```

pub mod cli;
pub mod domain;
pub mod import;
pub mod preflight;
pub mod program;
pub mod resolver;
pub mod symfile;
