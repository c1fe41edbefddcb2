//! Roster loading: units and trait breakpoint tables from delimited files.
//!
//! Units file, one unit per line: `name, cost, trait1, ..., traitN`.
//! Breakpoints file, one trait per line: `trait, bp1, bp2, ..., bpM`.
//! Neither file has a header row; fields are comma-separated and
//! whitespace-trimmed. Every trait carried by a unit must have a breakpoint
//! row and every breakpoint row must match a trait some unit carries.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

pub type UnitId = u16;
pub type TraitId = u16;

/// One parsed line of the units file, traits still by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub name: String,
    pub cost: u32,
    pub traits: Vec<String>,
}

/// One parsed line of the breakpoints file. The implied breakpoint `0` is
/// added during [Roster::build], not here, so the record mirrors the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRecord {
    pub trait_name: String,
    pub breakpoints: Vec<u32>,
}

#[derive(Debug)]
pub enum RosterError {
    Read { path: String, source: std::io::Error },
    Csv { path: String, source: csv::Error },
    EmptyUnitName { line: usize },
    DuplicateUnit { name: String },
    InvalidCost { unit: String, raw: String },
    EmptyTrait { unit: String },
    EmptyTraitName { line: usize },
    DuplicateBreakpointRow { trait_name: String },
    InvalidBreakpoint { trait_name: String, raw: String },
    MissingBreakpoints { trait_name: String },
    UnusedBreakpointTrait { trait_name: String },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "failed to read '{path}': {source}"),
            Self::Csv { path, source } => write!(f, "failed to parse '{path}': {source}"),
            Self::EmptyUnitName { line } => write!(f, "units line {line}: missing unit name"),
            Self::DuplicateUnit { name } => write!(f, "duplicate unit '{name}'"),
            Self::InvalidCost { unit, raw } => {
                write!(f, "unit '{unit}': cost '{raw}' is not a non-negative integer")
            }
            Self::EmptyTrait { unit } => write!(f, "unit '{unit}': empty trait slot"),
            Self::EmptyTraitName { line } => {
                write!(f, "breakpoints line {line}: missing trait name")
            }
            Self::DuplicateBreakpointRow { trait_name } => {
                write!(f, "duplicate breakpoint row for trait '{trait_name}'")
            }
            Self::InvalidBreakpoint { trait_name, raw } => {
                write!(
                    f,
                    "trait '{trait_name}': breakpoint '{raw}' is not a non-negative integer"
                )
            }
            Self::MissingBreakpoints { trait_name } => {
                write!(f, "trait '{trait_name}' has no breakpoint row")
            }
            Self::UnusedBreakpointTrait { trait_name } => {
                write!(f, "breakpoint row '{trait_name}' matches no unit trait")
            }
        }
    }
}

/// A unit after id assignment. Trait ids are deduplicated and sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    pub cost: u32,
    pub traits: Vec<TraitId>,
}

/// Immutable roster model: dense unit and trait ids with the lookups the
/// search needs. Unit ids follow file order; trait ids follow sorted
/// trait-name order so both are stable for a given pair of input files.
#[derive(Debug, Clone)]
pub struct Roster {
    units: Vec<Unit>,
    trait_names: Vec<String>,
    breakpoints: Vec<HashSet<u32>>,
}

impl Roster {
    pub fn load(
        units_path: impl AsRef<Path>,
        breakpoints_path: impl AsRef<Path>,
    ) -> Result<Self, RosterError> {
        let units = load_units(units_path)?;
        let table = load_breakpoints(breakpoints_path)?;
        Self::build(units, table)
    }

    /// Assigns dense ids and cross-checks the two files. Fails on any
    /// consistency hole rather than dropping or inventing traits.
    pub fn build(
        units: Vec<UnitRecord>,
        table: Vec<BreakpointRecord>,
    ) -> Result<Self, RosterError> {
        let mut vocabulary = BTreeSet::new();
        for record in &units {
            for trait_name in &record.traits {
                if trait_name.is_empty() {
                    return Err(RosterError::EmptyTrait {
                        unit: record.name.clone(),
                    });
                }
                vocabulary.insert(trait_name.clone());
            }
        }

        let mut sets: HashMap<String, HashSet<u32>> = HashMap::new();
        for record in table {
            // A team fielding zero units of a trait satisfies it, so 0 is a
            // member of every breakpoint set regardless of the source file.
            let mut set: HashSet<u32> = record.breakpoints.iter().copied().collect();
            set.insert(0);
            if sets.insert(record.trait_name.clone(), set).is_some() {
                return Err(RosterError::DuplicateBreakpointRow {
                    trait_name: record.trait_name,
                });
            }
        }

        for trait_name in &vocabulary {
            if !sets.contains_key(trait_name) {
                return Err(RosterError::MissingBreakpoints {
                    trait_name: trait_name.clone(),
                });
            }
        }
        for trait_name in sets.keys() {
            if !vocabulary.contains(trait_name) {
                return Err(RosterError::UnusedBreakpointTrait {
                    trait_name: trait_name.clone(),
                });
            }
        }

        let trait_names: Vec<String> = vocabulary.into_iter().collect();
        let trait_ids: HashMap<&str, TraitId> = trait_names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.as_str(), id as TraitId))
            .collect();
        let breakpoints = trait_names
            .iter()
            .map(|name| sets.remove(name).unwrap_or_default())
            .collect();

        let mut seen_units = HashSet::new();
        let mut resolved = Vec::with_capacity(units.len());
        for record in units {
            if !seen_units.insert(record.name.clone()) {
                return Err(RosterError::DuplicateUnit { name: record.name });
            }
            let mut ids: Vec<TraitId> = record
                .traits
                .iter()
                .map(|name| trait_ids[name.as_str()])
                .collect();
            ids.sort_unstable();
            ids.dedup();
            resolved.push(Unit {
                name: record.name,
                cost: record.cost,
                traits: ids,
            });
        }

        Ok(Self {
            units: resolved,
            trait_names,
            breakpoints,
        })
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn trait_count(&self) -> usize {
        self.trait_names.len()
    }

    pub fn unit_name(&self, id: UnitId) -> &str {
        &self.units[id as usize].name
    }

    pub fn unit_names(&self, team: &[UnitId]) -> Vec<String> {
        team.iter().map(|&id| self.unit_name(id).to_string()).collect()
    }

    pub fn trait_name(&self, id: TraitId) -> &str {
        &self.trait_names[id as usize]
    }

    pub fn traits_of(&self, id: UnitId) -> &[TraitId] {
        &self.units[id as usize].traits
    }

    pub fn breakpoints_of(&self, id: TraitId) -> &HashSet<u32> {
        &self.breakpoints[id as usize]
    }
}

pub fn load_units(path: impl AsRef<Path>) -> Result<Vec<UnitRecord>, RosterError> {
    let shown = path.as_ref().display().to_string();
    let raw = fs::read_to_string(&path).map_err(|source| RosterError::Read {
        path: shown.clone(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, record) in roster_reader(&raw).into_records().enumerate() {
        let record = record.map_err(|source| RosterError::Csv {
            path: shown.clone(),
            source,
        })?;
        let line = index + 1;
        let name = record.get(0).unwrap_or("").to_string();
        if name.is_empty() {
            return Err(RosterError::EmptyUnitName { line });
        }
        let raw_cost = record.get(1).unwrap_or("");
        let cost = raw_cost.parse::<u32>().map_err(|_| RosterError::InvalidCost {
            unit: name.clone(),
            raw: raw_cost.to_string(),
        })?;
        let traits: Vec<String> = record.iter().skip(2).map(str::to_string).collect();
        records.push(UnitRecord { name, cost, traits });
    }
    Ok(records)
}

pub fn load_breakpoints(path: impl AsRef<Path>) -> Result<Vec<BreakpointRecord>, RosterError> {
    let shown = path.as_ref().display().to_string();
    let raw = fs::read_to_string(&path).map_err(|source| RosterError::Read {
        path: shown.clone(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, record) in roster_reader(&raw).into_records().enumerate() {
        let record = record.map_err(|source| RosterError::Csv {
            path: shown.clone(),
            source,
        })?;
        let line = index + 1;
        let trait_name = record.get(0).unwrap_or("").to_string();
        if trait_name.is_empty() {
            return Err(RosterError::EmptyTraitName { line });
        }
        let mut breakpoints = Vec::with_capacity(record.len().saturating_sub(1));
        for field in record.iter().skip(1) {
            let value = field.parse::<u32>().map_err(|_| RosterError::InvalidBreakpoint {
                trait_name: trait_name.clone(),
                raw: field.to_string(),
            })?;
            breakpoints.push(value);
        }
        records.push(BreakpointRecord {
            trait_name,
            breakpoints,
        });
    }
    Ok(records)
}

fn roster_reader(raw: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes())
}
