//! Address and name newtypes
//!
//! A symbol file carries raw addresses whose low bit may be a mode flag
//! (e.g. Thumb interworking). The resolver must only ever look up the
//! cleared value, so the two forms get distinct types.

use super::errors::ModelError;
use std::fmt;
use std::str::FromStr;

/// Raw address exactly as written in a symbol file (8 hex digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexAddress(pub u32);

impl HexAddress {
    /// Clear bit 0, yielding the address the resolver operates on.
    #[must_use]
    pub fn normalize(self) -> NormalizedAddress {
        NormalizedAddress(self.0 & !1)
    }
}

impl fmt::Display for HexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl FromStr for HexAddress {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16).map(HexAddress)
    }
}

/// Even-aligned address derived from a [`HexAddress`].
///
/// Always displayed as 8 uppercase hex digits, which is also the form
/// handed to [`crate::program::ProgramModel::resolve_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedAddress(u32);

impl NormalizedAddress {
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Normalizing an already normalized address is a no-op.
    #[must_use]
    pub fn normalize(self) -> NormalizedAddress {
        HexAddress(self.0).normalize()
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Identifier to apply to a program entity (non-empty, no whitespace)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolName(String);

impl SymbolName {
    /// # Errors
    /// [`ModelError::InvalidName`] if `name` is empty or contains whitespace
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidName(name));
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SymbolName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolName::new(s)
    }
}

impl PartialEq<str> for SymbolName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SymbolName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<SymbolName> for String {
    fn eq(&self, other: &SymbolName) -> bool {
        *self == other.0
    }
}
