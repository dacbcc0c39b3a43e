use super::outcome::{EntityKind, Outcome};
use super::stats::RunStatistics;
use crate::domain::{ModelError, NormalizedAddress, SymbolName};
use crate::program::{Entity, Location, ProgramModel, SourceType};
use crate::symfile::SymbolRecord;
use log::{debug, warn};

/// Whether the resolver may touch the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Apply,
    /// Every lookup and decision runs; mutations are only reported
    ReportOnly,
}

/// The record being resolved, with its address already normalized and resolved
struct Target<'r> {
    at: NormalizedAddress,
    loc: Location,
    name: &'r SymbolName,
}

/// One step of the fallback chain. `None` hands the record to the next step.
type MatchStrategy<M> = fn(&RenameResolver, &mut M, &Target<'_>) -> Option<Outcome>;

/// Applies symbol-file names to existing program entities
#[derive(Debug, Clone, Copy)]
pub struct RenameResolver {
    mode: Mode,
    create_label_if_missing: bool,
}

impl RenameResolver {
    #[must_use]
    pub fn new(mode: Mode, create_label_if_missing: bool) -> Self {
        Self { mode, create_label_if_missing }
    }

    /// Resolve one symbol record against `model` and tally the result.
    ///
    /// Never fails: host rejections become [`Outcome`] variants.
    pub fn resolve<M: ProgramModel>(
        &self,
        record: &SymbolRecord,
        model: &mut M,
        stats: &mut RunStatistics,
    ) -> Outcome {
        let outcome = self.decide(record, model);
        stats.record(&outcome);
        outcome
    }

    fn decide<M: ProgramModel>(&self, record: &SymbolRecord, model: &mut M) -> Outcome {
        let at = record.address.normalize();
        let name = &record.name;

        let loc = match model.resolve_address(&at.to_string()) {
            Ok(loc) => loc,
            Err(reason) => {
                debug!("{at}: unresolvable ({reason})");
                return Outcome::BadAddress { at, name: name.to_string(), reason };
            }
        };
        let target = Target { at, loc, name };

        let chain: [MatchStrategy<M>; 4] = [
            Self::match_function,
            Self::match_primary_symbol,
            Self::match_any_symbol,
            Self::create_missing_label,
        ];

        chain
            .iter()
            .find_map(|strategy| strategy(self, &mut *model, &target))
            .unwrap_or_else(|| Outcome::NothingToRename { at, name: name.to_string() })
    }

    fn match_function<M: ProgramModel>(
        &self,
        model: &mut M,
        t: &Target<'_>,
    ) -> Option<Outcome> {
        let func = model.function_at(t.loc).or_else(|| model.function_containing(t.loc))?;
        debug!("{}: function {} (entry {})", t.at, func.name, func.entry);

        if func.name == *t.name {
            return Some(already_named(t, EntityKind::Function));
        }

        Some(match self.rename(model, Entity::Function(func.id), t.name) {
            Ok(applied) => Outcome::FunctionRenamed {
                at: t.at,
                old: func.name,
                new: t.name.to_string(),
                applied,
            },
            Err(reason) => {
                warn!("Function rename {} -> {} at {} rejected: {reason}", func.name, t.name, t.at);
                Outcome::FunctionRenameFailed { at: t.at, name: t.name.to_string(), reason }
            }
        })
    }

    fn match_primary_symbol<M: ProgramModel>(
        &self,
        model: &mut M,
        t: &Target<'_>,
    ) -> Option<Outcome> {
        let sym = model.primary_symbol_at(t.loc)?;
        debug!("{}: primary symbol {}", t.at, sym.name);

        if sym.name == *t.name {
            return Some(already_named(t, EntityKind::PrimarySymbol));
        }
        Some(self.rename_symbol(model, t, Entity::Symbol(sym.id), sym.name, false))
    }

    fn match_any_symbol<M: ProgramModel>(
        &self,
        model: &mut M,
        t: &Target<'_>,
    ) -> Option<Outcome> {
        let symbols = model.symbols_at(t.loc);
        if symbols.iter().any(|s| s.name == *t.name) {
            return Some(already_named(t, EntityKind::SecondarySymbol));
        }

        let first = symbols.into_iter().next()?;
        debug!("{}: secondary symbol {}", t.at, first.name);
        Some(self.rename_symbol(model, t, Entity::Symbol(first.id), first.name, true))
    }

    fn create_missing_label<M: ProgramModel>(
        &self,
        model: &mut M,
        t: &Target<'_>,
    ) -> Option<Outcome> {
        if !self.create_label_if_missing {
            return None;
        }

        let result = match self.mode {
            Mode::ReportOnly => Ok(false),
            Mode::Apply => {
                model.create_label(t.loc, t.name, true, SourceType::Imported).map(|()| true)
            }
        };

        Some(match result {
            Ok(applied) => Outcome::Labeled { at: t.at, name: t.name.to_string(), applied },
            Err(reason) => {
                warn!("Label {} at {} rejected: {reason}", t.name, t.at);
                Outcome::LabelFailed { at: t.at, name: t.name.to_string(), reason }
            }
        })
    }

    fn rename_symbol<M: ProgramModel>(
        &self,
        model: &mut M,
        t: &Target<'_>,
        entity: Entity,
        old: String,
        secondary: bool,
    ) -> Outcome {
        match self.rename(model, entity, t.name) {
            Ok(applied) => Outcome::SymbolRenamed {
                at: t.at,
                old,
                new: t.name.to_string(),
                applied,
                secondary,
            },
            Err(reason) => {
                warn!("Symbol rename {old} -> {} at {} rejected: {reason}", t.name, t.at);
                Outcome::SymbolRenameFailed {
                    at: t.at,
                    name: t.name.to_string(),
                    reason,
                    secondary,
                }
            }
        }
    }

    /// Returns whether the rename was actually applied
    fn rename<M: ProgramModel>(
        &self,
        model: &mut M,
        entity: Entity,
        name: &SymbolName,
    ) -> Result<bool, ModelError> {
        match self.mode {
            Mode::ReportOnly => Ok(false),
            Mode::Apply => model.rename(entity, name, SourceType::Imported).map(|()| true),
        }
    }
}

fn already_named(t: &Target<'_>, kind: EntityKind) -> Outcome {
    debug!("{}: already named {}", t.at, t.name);
    Outcome::AlreadyNamed { at: t.at, name: t.name.to_string(), kind }
}
