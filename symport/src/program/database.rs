//! JSON-backed program database
//!
//! A flat, serializable stand-in for a disassembler's program database:
//!
//! ```json
//! {
//!   "name": "game.nds",
//!   "address_space": { "start": 0, "end": 4294967295 },
//!   "memory_blocks": [ { "name": "main_ram", "start": 33554432, "size": 4194304 } ],
//!   "functions": [ { "name": "FUN_02000000", "entry": 33554432, "size": 16, "source": "analysis" } ],
//!   "symbols": [ { "name": "DAT_02000100", "address": 33554688, "primary": true } ]
//! }
//! ```
//!
//! Names are unique across functions and symbols; that is what makes a
//! rename "collide".

use super::{
    Entity, FunctionId, FunctionRef, Location, ProgramModel, SourceType, SymbolId, SymbolRef,
};
use crate::domain::{ImportError, ModelError, SymbolName};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Inclusive range of valid addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSpace {
    pub start: u32,
    pub end: u32,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self { start: 0, end: u32::MAX }
    }
}

impl AddressSpace {
    #[must_use]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }
}

/// Initialized memory; labels can only be created in here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub name: String,
    pub start: u32,
    pub size: u32,
}

impl MemoryBlock {
    #[must_use]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && u64::from(addr - self.start) < u64::from(self.size)
    }
}

/// Half-open run of addresses `[start, start + size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyRange {
    pub start: u32,
    pub size: u32,
}

impl BodyRange {
    #[must_use]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && u64::from(addr - self.start) < u64::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub entry: u32,
    pub size: u32,
    /// Explicit body for functions with gaps (padding, literal pools).
    /// Empty means `[entry, entry + size)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<BodyRange>,
    #[serde(default)]
    pub source: SourceType,
}

impl FunctionEntry {
    /// Distance from the entry to the end of the body
    fn span(&self) -> u64 {
        let end = self
            .body
            .iter()
            .map(|r| u64::from(r.start) + u64::from(r.size))
            .max()
            .unwrap_or(u64::from(self.entry) + u64::from(self.size.max(1)));
        end.saturating_sub(u64::from(self.entry))
    }

    /// A zero-sized function still owns its entry.
    #[must_use]
    pub fn contains(&self, addr: u32) -> bool {
        if self.body.is_empty() {
            BodyRange { start: self.entry, size: self.size.max(1) }.contains(addr)
        } else {
            addr == self.entry || self.body.iter().any(|r| r.contains(addr))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub address: u32,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub source: SourceType,
}

/// Lookup tables rebuilt on load and kept in step with every mutation
#[derive(Debug, Clone, Default)]
struct Index {
    /// How many functions and symbols carry each name
    names: HashMap<String, usize>,
    functions_by_entry: BTreeMap<u32, Vec<usize>>,
    symbols_by_address: BTreeMap<u32, Vec<usize>>,
    /// Widest function extent; bounds the `function_containing` scan
    max_span: u64,
}

impl Index {
    fn add_name(&mut self, name: &str) {
        *self.names.entry(name.to_string()).or_default() += 1;
    }

    fn remove_name(&mut self, name: &str) {
        if let Some(count) = self.names.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                self.names.remove(name);
            }
        }
    }

    fn add_function(&mut self, idx: usize, f: &FunctionEntry) {
        self.add_name(&f.name);
        self.functions_by_entry.entry(f.entry).or_default().push(idx);
        self.max_span = self.max_span.max(f.span());
    }

    fn add_symbol(&mut self, idx: usize, s: &SymbolEntry) {
        self.add_name(&s.name);
        self.symbols_by_address.entry(s.address).or_default().push(idx);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramDatabase {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_space: AddressSpace,
    #[serde(default)]
    pub memory_blocks: Vec<MemoryBlock>,
    #[serde(default)]
    functions: Vec<FunctionEntry>,
    #[serde(default)]
    symbols: Vec<SymbolEntry>,
    #[serde(skip)]
    index: Index,
}

impl PartialEq for ProgramDatabase {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.address_space == other.address_space
            && self.memory_blocks == other.memory_blocks
            && self.functions == other.functions
            && self.symbols == other.symbols
    }
}

impl Eq for ProgramDatabase {}

impl ProgramDatabase {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Load a database from a JSON file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid database
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ImportError::ProgramLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let db = Self::from_reader(BufReader::new(file)).map_err(|e| {
            ImportError::ProgramLoad { path: path.to_path_buf(), reason: e.to_string() }
        })?;

        info!(
            "Loaded program '{}': {} blocks, {} functions, {} symbols",
            db.name,
            db.memory_blocks.len(),
            db.functions.len(),
            db.symbols.len()
        );
        Ok(db)
    }

    /// Parse a database from JSON
    ///
    /// # Errors
    /// Returns an error if the input is not a valid database
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ImportError> {
        let mut db: Self = serde_json::from_reader(reader)?;
        db.reindex();
        Ok(db)
    }

    /// Write the database back as pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ImportError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        info!("Saved program '{}' to {}", self.name, path.as_ref().display());
        Ok(())
    }

    /// # Errors
    /// Returns an error if serialization or the write fails
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ImportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    fn reindex(&mut self) {
        let mut index = Index::default();
        for (i, f) in self.functions.iter().enumerate() {
            index.add_function(i, f);
        }
        for (i, s) in self.symbols.iter().enumerate() {
            index.add_symbol(i, s);
        }
        self.index = index;
    }

    #[must_use]
    pub fn with_block(mut self, name: &str, start: u32, size: u32) -> Self {
        self.memory_blocks.push(MemoryBlock { name: name.to_string(), start, size });
        self
    }

    pub fn add_function(&mut self, name: &str, entry: u32, size: u32, source: SourceType) {
        self.push_function(FunctionEntry {
            name: name.to_string(),
            entry,
            size,
            body: Vec::new(),
            source,
        });
    }

    /// Add a function whose body is the given `(start, size)` runs.
    ///
    /// Runs are expected to lie at or after `entry`.
    pub fn add_function_with_body(
        &mut self,
        name: &str,
        entry: u32,
        body: &[(u32, u32)],
        source: SourceType,
    ) {
        let body: Vec<BodyRange> =
            body.iter().map(|&(start, size)| BodyRange { start, size }).collect();
        let end = body.iter().map(|r| u64::from(r.start) + u64::from(r.size)).max();
        let size = end.map_or(0, |end| {
            u32::try_from(end.saturating_sub(u64::from(entry))).unwrap_or(u32::MAX)
        });
        self.push_function(FunctionEntry { name: name.to_string(), entry, size, body, source });
    }

    pub fn add_symbol(&mut self, name: &str, address: u32, primary: bool, source: SourceType) {
        let entry = SymbolEntry { name: name.to_string(), address, primary, source };
        self.index.add_symbol(self.symbols.len(), &entry);
        self.symbols.push(entry);
    }

    fn push_function(&mut self, entry: FunctionEntry) {
        self.index.add_function(self.functions.len(), &entry);
        self.functions.push(entry);
    }

    #[must_use]
    pub fn functions(&self) -> &[FunctionEntry] {
        &self.functions
    }

    #[must_use]
    pub fn symbols(&self) -> &[SymbolEntry] {
        &self.symbols
    }

    #[must_use]
    pub fn function_named(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn symbols_named(&self, name: &str) -> Vec<&SymbolEntry> {
        self.symbols.iter().filter(|s| s.name == name).collect()
    }

    fn in_memory(&self, addr: u32) -> bool {
        self.memory_blocks.iter().any(|b| b.contains(addr))
    }

    fn current_name(&self, entity: Entity) -> Option<&str> {
        match entity {
            Entity::Function(FunctionId(i)) => self.functions.get(i).map(|f| f.name.as_str()),
            Entity::Symbol(SymbolId(i)) => self.symbols.get(i).map(|s| s.name.as_str()),
        }
    }

    fn name_taken(&self, name: &str, except: Option<Entity>) -> bool {
        let holders = self.index.names.get(name).copied().unwrap_or(0);
        let own = usize::from(except.and_then(|e| self.current_name(e)) == Some(name));
        holders > own
    }

    fn check_name(&self, name: &SymbolName, except: Option<Entity>) -> Result<(), ModelError> {
        if self.name_taken(name.as_str(), except) {
            return Err(ModelError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn function_ref(&self, idx: usize) -> FunctionRef {
        let f = &self.functions[idx];
        FunctionRef { id: FunctionId(idx), name: f.name.clone(), entry: Location(f.entry) }
    }

    fn symbol_ref(&self, idx: usize) -> SymbolRef {
        let s = &self.symbols[idx];
        SymbolRef {
            id: SymbolId(idx),
            name: s.name.clone(),
            address: Location(s.address),
            primary: s.primary,
        }
    }

    fn symbol_indices_at(&self, addr: u32) -> &[usize] {
        self.index.symbols_by_address.get(&addr).map_or(&[][..], Vec::as_slice)
    }
}

impl ProgramModel for ProgramDatabase {
    fn resolve_address(&self, hex: &str) -> Result<Location, ModelError> {
        let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
        if digits.is_empty() || digits.len() > 8 {
            return Err(ModelError::InvalidAddress(hex.to_string()));
        }
        let addr = u32::from_str_radix(digits, 16)
            .map_err(|_| ModelError::InvalidAddress(hex.to_string()))?;
        if !self.address_space.contains(addr) {
            return Err(ModelError::InvalidAddress(hex.to_string()));
        }
        Ok(Location(addr))
    }

    fn function_at(&self, loc: Location) -> Option<FunctionRef> {
        let idx = *self.index.functions_by_entry.get(&loc.0)?.first()?;
        Some(self.function_ref(idx))
    }

    fn function_containing(&self, loc: Location) -> Option<FunctionRef> {
        // Walk entries downward from `loc`; the nearest entry wins when bodies overlap
        let lowest = u64::from(loc.0).saturating_sub(self.index.max_span);
        let lowest = u32::try_from(lowest).unwrap_or(0);
        self.index
            .functions_by_entry
            .range(lowest..=loc.0)
            .rev()
            .flat_map(|(_, indices)| indices.iter().copied())
            .find(|&i| self.functions[i].contains(loc.0))
            .map(|i| self.function_ref(i))
    }

    fn primary_symbol_at(&self, loc: Location) -> Option<SymbolRef> {
        self.symbol_indices_at(loc.0)
            .iter()
            .copied()
            .find(|&i| self.symbols[i].primary)
            .map(|i| self.symbol_ref(i))
    }

    fn symbols_at(&self, loc: Location) -> Vec<SymbolRef> {
        self.symbol_indices_at(loc.0).iter().map(|&i| self.symbol_ref(i)).collect()
    }

    fn rename(
        &mut self,
        entity: Entity,
        new_name: &SymbolName,
        source: SourceType,
    ) -> Result<(), ModelError> {
        self.check_name(new_name, Some(entity))?;
        let (name, slot_source) = match entity {
            Entity::Function(FunctionId(i)) => {
                let f = self
                    .functions
                    .get_mut(i)
                    .ok_or_else(|| ModelError::UnknownEntity(format!("function #{i}")))?;
                (&mut f.name, &mut f.source)
            }
            Entity::Symbol(SymbolId(i)) => {
                let s = self
                    .symbols
                    .get_mut(i)
                    .ok_or_else(|| ModelError::UnknownEntity(format!("symbol #{i}")))?;
                (&mut s.name, &mut s.source)
            }
        };
        let old = std::mem::replace(name, new_name.to_string());
        *slot_source = source;

        self.index.remove_name(&old);
        self.index.add_name(new_name.as_str());
        Ok(())
    }

    fn create_label(
        &mut self,
        loc: Location,
        name: &SymbolName,
        primary: bool,
        source: SourceType,
    ) -> Result<(), ModelError> {
        if !self.in_memory(loc.0) {
            return Err(ModelError::NotInMemory(loc.0));
        }
        self.check_name(name, None)?;
        if primary {
            if let Some(indices) = self.index.symbols_by_address.get(&loc.0) {
                for &i in indices {
                    self.symbols[i].primary = false;
                }
            }
        }
        self.add_symbol(name.as_str(), loc.0, primary, source);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> SymbolName {
        SymbolName::new(s).unwrap()
    }

    fn sample() -> ProgramDatabase {
        let mut db = ProgramDatabase::new("test").with_block("ram", 0x0200_0000, 0x1000);
        db.add_function("FUN_02000000", 0x0200_0000, 0x10, SourceType::Analysis);
        db.add_function("FUN_02000100", 0x0200_0100, 0x40, SourceType::Analysis);
        db.add_symbol("DAT_02000200", 0x0200_0200, true, SourceType::Default);
        db.add_symbol("alias", 0x0200_0200, false, SourceType::UserDefined);
        db
    }

    #[test]
    fn test_resolve_address() {
        let mut db = sample();
        assert_eq!(db.resolve_address("0200000C").unwrap(), Location(0x0200_000C));
        assert_eq!(db.resolve_address("0x0200000c").unwrap(), Location(0x0200_000C));
        assert!(db.resolve_address("").is_err());
        assert!(db.resolve_address("123456789").is_err());
        assert!(db.resolve_address("nothex").is_err());

        db.address_space = AddressSpace { start: 0x0200_0000, end: 0x02FF_FFFF };
        assert!(db.resolve_address("02000000").is_ok());
        assert_eq!(
            db.resolve_address("08000000"),
            Err(ModelError::InvalidAddress("08000000".to_string()))
        );
    }

    #[test]
    fn test_function_lookup() {
        let db = sample();
        assert_eq!(db.function_at(Location(0x0200_0000)).unwrap().name, "FUN_02000000");
        assert!(db.function_at(Location(0x0200_0004)).is_none());
        assert_eq!(db.function_containing(Location(0x0200_0004)).unwrap().name, "FUN_02000000");
        assert!(db.function_containing(Location(0x0200_0010)).is_none());
        assert_eq!(db.function_containing(Location(0x0200_013F)).unwrap().name, "FUN_02000100");
    }

    #[test]
    fn test_function_containing_prefers_nearest_entry() {
        let mut db = sample();
        db.add_function("inner", 0x0200_0120, 0x8, SourceType::Analysis);
        assert_eq!(db.function_containing(Location(0x0200_0124)).unwrap().name, "inner");
        assert_eq!(db.function_containing(Location(0x0200_0130)).unwrap().name, "FUN_02000100");
    }

    #[test]
    fn test_function_body_with_gap() {
        let mut db = sample();
        db.add_function_with_body(
            "gappy",
            0x0200_0400,
            &[(0x0200_0400, 0xC), (0x0200_040E, 0x2)],
            SourceType::Analysis,
        );
        assert_eq!(db.function_named("gappy").unwrap().size, 0x10);
        assert_eq!(db.function_containing(Location(0x0200_0408)).unwrap().name, "gappy");
        assert!(db.function_containing(Location(0x0200_040C)).is_none());
        assert_eq!(db.function_containing(Location(0x0200_040E)).unwrap().name, "gappy");
    }

    #[test]
    fn test_symbol_lookup() {
        let db = sample();
        let primary = db.primary_symbol_at(Location(0x0200_0200)).unwrap();
        assert_eq!(primary.name, "DAT_02000200");
        assert!(primary.primary);

        let all: Vec<String> =
            db.symbols_at(Location(0x0200_0200)).into_iter().map(|s| s.name).collect();
        assert_eq!(all, vec!["DAT_02000200", "alias"]);
        assert!(db.symbols_at(Location(0x0200_0300)).is_empty());
    }

    #[test]
    fn test_rename_rejects_duplicates() {
        let mut db = sample();
        let f = db.function_at(Location(0x0200_0100)).unwrap();

        assert_eq!(
            db.rename(Entity::Function(f.id), &name("FUN_02000000"), SourceType::Imported),
            Err(ModelError::DuplicateName("FUN_02000000".to_string()))
        );
        assert_eq!(
            db.rename(Entity::Function(f.id), &name("alias"), SourceType::Imported),
            Err(ModelError::DuplicateName("alias".to_string()))
        );
        assert!(matches!(
            db.rename(Entity::Symbol(SymbolId(99)), &name("x"), SourceType::Imported),
            Err(ModelError::UnknownEntity(_))
        ));

        // Renaming to its own name is not a collision
        db.rename(Entity::Function(f.id), &name("FUN_02000100"), SourceType::Imported).unwrap();
        db.rename(Entity::Function(f.id), &name("Update"), SourceType::Imported).unwrap();
        let renamed = db.function_named("Update").unwrap();
        assert_eq!(renamed.source, SourceType::Imported);
    }

    #[test]
    fn test_rename_releases_old_name() {
        let mut db = sample();
        let f = db.function_at(Location(0x0200_0000)).unwrap();
        let g = db.function_at(Location(0x0200_0100)).unwrap();

        db.rename(Entity::Function(f.id), &name("Main"), SourceType::Imported).unwrap();
        // The old name is free again, the new one is not
        db.rename(Entity::Function(g.id), &name("FUN_02000000"), SourceType::Imported).unwrap();
        assert_eq!(
            db.rename(Entity::Function(g.id), &name("Main"), SourceType::Imported),
            Err(ModelError::DuplicateName("Main".to_string()))
        );

        db.create_label(Location(0x0200_0300), &name("Table"), true, SourceType::Imported)
            .unwrap();
        assert_eq!(
            db.create_label(Location(0x0200_0304), &name("Table"), true, SourceType::Imported),
            Err(ModelError::DuplicateName("Table".to_string()))
        );
    }

    #[test]
    fn test_lookups_on_large_database() {
        let mut db = ProgramDatabase::new("big").with_block("rom", 0x0800_0000, 0x0100_0000);
        for i in 0..20_000u32 {
            db.add_function(&format!("FUN_{i}"), 0x0800_0000 + i * 0x20, 0x20, SourceType::Analysis);
            db.add_symbol(&format!("DAT_{i}"), 0x0880_0000 + i * 4, true, SourceType::Default);
        }
        // One wide function early on must still be found from far away
        db.add_function("huge", 0x0870_0000, 0x8_0000, SourceType::Analysis);

        for i in (0..20_000u32).step_by(997) {
            let f = db.function_containing(Location(0x0800_0000 + i * 0x20 + 0x1E)).unwrap();
            assert_eq!(f.name, format!("FUN_{i}"));
            let s = db.primary_symbol_at(Location(0x0880_0000 + i * 4)).unwrap();
            assert_eq!(s.name, format!("DAT_{i}"));
        }
        assert_eq!(db.function_containing(Location(0x0877_FFF0)).unwrap().name, "huge");
        assert!(db.function_containing(Location(0x0878_0000)).is_none());

        let f = db.function_at(Location(0x0800_0000)).unwrap();
        assert_eq!(
            db.rename(Entity::Function(f.id), &name("DAT_19999"), SourceType::Imported),
            Err(ModelError::DuplicateName("DAT_19999".to_string()))
        );
    }

    #[test]
    fn test_create_label() {
        let mut db = sample();
        db.create_label(Location(0x0200_0200), &name("Table"), true, SourceType::Imported)
            .unwrap();

        let primary = db.primary_symbol_at(Location(0x0200_0200)).unwrap();
        assert_eq!(primary.name, "Table");
        assert_eq!(db.symbols_at(Location(0x0200_0200)).len(), 3);
        assert_eq!(db.symbols_named("Table")[0].source, SourceType::Imported);

        assert_eq!(
            db.create_label(Location(0x0300_0000), &name("Nowhere"), true, SourceType::Imported),
            Err(ModelError::NotInMemory(0x0300_0000))
        );
        assert!(db.symbols_named("Nowhere").is_empty());
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let json = r#"{
            "name": "game",
            "memory_blocks": [{ "name": "ram", "start": 33554432, "size": 256 }],
            "functions": [{ "name": "f", "entry": 33554432, "size": 16 }]
        }"#;
        let db = ProgramDatabase::from_reader(json.as_bytes()).unwrap();
        assert_eq!(db.address_space, AddressSpace::default());
        assert_eq!(db.functions()[0].source, SourceType::Default);
        assert!(db.symbols().is_empty());
        assert_eq!(db.function_at(Location(33_554_432)).unwrap().name, "f");

        let mut out = Vec::new();
        db.to_writer(&mut out).unwrap();
        let reparsed = ProgramDatabase::from_reader(out.as_slice()).unwrap();
        assert_eq!(reparsed, db);
    }

    #[test]
    fn test_load_reports_path() {
        let err = ProgramDatabase::load("/nonexistent/program.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/program.json"));
    }
}
