//! # Program Model Capability Interface
//!
//! The importer never owns the program it renames into. It sees the host's
//! analysis database only through [`ProgramModel`]: a handful of lookups by
//! address and two mutations (rename, create label).
//!
//! ```text
//!   resolve_address("0200000C") ──► Location
//!                                      │
//!        ┌───────────────┬─────────────┼──────────────┐
//!        ▼               ▼             ▼              ▼
//!   function_at   function_containing  primary_symbol_at  symbols_at
//!        │               │             │              │
//!        └───────► rename(entity, name, Imported) ◄───┘
//!                                      │
//!                  create_label(loc, name, primary, Imported)
//! ```
//!
//! Handles returned by lookups are snapshots: a name plus an id the model
//! can map back to its own entity. They are only valid until the next
//! mutation.
//!
//! [`database::ProgramDatabase`] is the bundled implementation, a JSON
//! document holding the address space, memory blocks, functions and symbols.

pub mod database;

pub use database::ProgramDatabase;

use crate::domain::{ModelError, SymbolName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved address in the program's address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(pub u32);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Where a name came from.
///
/// Everything this crate writes is tagged [`SourceType::Imported`] so that
/// the host can tell it apart from analysis or hand-made names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Default,
    Analysis,
    Imported,
    UserDefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub usize);

/// Snapshot of a function found by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub id: FunctionId,
    pub name: String,
    pub entry: Location,
}

/// Snapshot of a symbol found by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub id: SymbolId,
    pub name: String,
    pub address: Location,
    pub primary: bool,
}

/// Anything that can be renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Function(FunctionId),
    Symbol(SymbolId),
}

/// Read/write access to a host program's named entities.
///
/// Implementations must not create or destroy functions as a side effect of
/// any method here.
pub trait ProgramModel {
    /// Turn an 8-digit hex string into a location.
    ///
    /// # Errors
    /// [`ModelError::InvalidAddress`] if the string does not name an address
    /// in this program's address space.
    fn resolve_address(&self, hex: &str) -> Result<Location, ModelError>;

    /// Function whose entry point is exactly `loc`
    fn function_at(&self, loc: Location) -> Option<FunctionRef>;

    /// Function whose body contains `loc`
    fn function_containing(&self, loc: Location) -> Option<FunctionRef>;

    /// The primary symbol bound to `loc`
    fn primary_symbol_at(&self, loc: Location) -> Option<SymbolRef>;

    /// Every symbol bound to `loc`, primary or not, in model order
    fn symbols_at(&self, loc: Location) -> Vec<SymbolRef>;

    /// Rename a function or symbol.
    ///
    /// # Errors
    /// Any [`ModelError`] the host raises, typically a name collision.
    fn rename(
        &mut self,
        entity: Entity,
        new_name: &SymbolName,
        source: SourceType,
    ) -> Result<(), ModelError>;

    /// Create a label at `loc`.
    ///
    /// # Errors
    /// Any [`ModelError`] the host raises, e.g. `loc` is outside memory.
    fn create_label(
        &mut self,
        loc: Location,
        name: &SymbolName,
        primary: bool,
        source: SourceType,
    ) -> Result<(), ModelError>;
}
