//! Search report persistence and team power-level rating.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ReportError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
    Write(std::io::Error),
    /// A report team names a unit absent from the ranking data.
    UnratedUnit { unit: String },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read report file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse report JSON: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize report: {err}"),
            Self::Write(err) => write!(f, "failed to persist report: {err}"),
            Self::UnratedUnit { unit } => {
                write!(f, "unit '{unit}' appears in the report but has no composite score")
            }
        }
    }
}

/// One retained team: member names plus the score that ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub team: Vec<String>,
    pub score: f64,
}

/// Size-indexed search results. Serializes as a JSON map from team size to a
/// descending-score list of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchReport {
    pub sizes: BTreeMap<usize, Vec<TeamEntry>>,
}

impl SearchReport {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let payload = serde_json::to_string_pretty(self).map_err(ReportError::Serialize)?;
        fs::write(path, payload).map_err(ReportError::Write)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let raw = fs::read_to_string(path).map_err(ReportError::Read)?;
        serde_json::from_str(&raw).map_err(ReportError::Parse)
    }
}

/// A team with its aggregate desirability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedTeam {
    pub team: Vec<String>,
    pub power_level: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatedReport {
    pub sizes: BTreeMap<usize, Vec<RatedTeam>>,
}

/// Rate every team in a saved report by summing its members' composite
/// scores. Team order within each size is preserved. A member missing from
/// `composite` is a consistency fault naming the unit.
pub fn rate_teams(
    report: &SearchReport,
    composite: &HashMap<String, f64>,
) -> Result<RatedReport, ReportError> {
    let mut rated = RatedReport::default();
    for (&size, entries) in &report.sizes {
        let mut teams = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut power_level = 0.0;
            for unit in &entry.team {
                match composite.get(unit) {
                    Some(score) => power_level += score,
                    None => {
                        return Err(ReportError::UnratedUnit { unit: unit.clone() });
                    }
                }
            }
            teams.push(RatedTeam {
                team: entry.team.clone(),
                power_level,
            });
        }
        rated.sizes.insert(size, teams);
    }
    Ok(rated)
}
