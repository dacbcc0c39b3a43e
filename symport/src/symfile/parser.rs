//! Line parser for `.sym` files

use crate::domain::{HexAddress, SymbolName};
use once_cell::sync::Lazy;
use regex::Regex;

/// Names starting with this character carry metadata, not a binding.
pub const DIRECTIVE_MARKER: char = '.';

static SYMBOL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<addr>[0-9A-Fa-f]{8})\s+(?P<name>\S+)")
        .expect("valid symbol line regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Directive,
    Symbol,
}

/// One parsed line of a symbol file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    pub kind: RecordKind,
    pub address: HexAddress,
    pub name: SymbolName,
}

impl SymbolRecord {
    #[must_use]
    pub fn is_symbol(&self) -> bool {
        self.kind == RecordKind::Symbol
    }
}

/// Parse a single line.
///
/// Returns `None` for anything that is not an 8-digit hex address followed
/// by whitespace and a name token. Text after the name is ignored.
#[must_use]
pub fn parse_line(line: &str) -> Option<SymbolRecord> {
    let caps = SYMBOL_LINE.captures(line)?;
    let address = caps["addr"].parse::<HexAddress>().ok()?;
    let name = SymbolName::new(&caps["name"]).ok()?;

    let kind =
        if name.as_str().starts_with(DIRECTIVE_MARKER) { RecordKind::Directive } else { RecordKind::Symbol };

    Some(SymbolRecord { kind, address, name })
}
