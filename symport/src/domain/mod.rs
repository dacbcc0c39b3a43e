//! Domain model for symport
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time separation of raw and normalized addresses
//! - Names that are valid identifiers by construction
//! - Self-documenting function signatures
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{HexAddress, NormalizedAddress, SymbolName};

pub use errors::{ImportError, ModelError};
