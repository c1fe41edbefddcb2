//! Unit desirability rating from placement statistics.
//!
//! Input is a headered CSV of per-unit popularity and placement numbers. Each
//! numeric column is min-max scaled independently, `players_beaten` is derived
//! from the raw placement so that higher is better, and the composite score is
//! scaled popularity plus scaled players-beaten.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Average placement is 1 (first) through 8 (last) in an eight-player lobby.
const LOBBY_SIZE_PLUS_ONE: f64 = 7.0;

#[derive(Debug)]
pub enum StatsError {
    Read { path: String, source: std::io::Error },
    Csv { path: String, source: csv::Error },
    Write { path: String, source: csv::Error },
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "failed to read '{path}': {source}"),
            Self::Csv { path, source } => write!(f, "failed to parse '{path}': {source}"),
            Self::Write { path, source } => write!(f, "failed to write '{path}': {source}"),
        }
    }
}

/// One row of the raw statistics export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitStatsRecord {
    pub champ_name: String,
    pub champ_popularity: f64,
    pub champ_top_4_percentage: f64,
    pub champ_top_1_percentage: f64,
    pub average_placement: f64,
}

/// One row of the ranked output, every numeric column scaled to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUnit {
    pub champ_name: String,
    pub champ_popularity: f64,
    pub champ_top_4_percentage: f64,
    pub champ_top_1_percentage: f64,
    pub average_placement: f64,
    pub players_beaten: f64,
    pub composite_score: f64,
}

pub fn load_unit_stats(path: impl AsRef<Path>) -> Result<Vec<UnitStatsRecord>, StatsError> {
    let shown = path.as_ref().display().to_string();
    let raw = fs::read_to_string(&path).map_err(|source| StatsError::Read {
        path: shown.clone(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    let mut records = Vec::new();
    for record in reader.deserialize() {
        let record: UnitStatsRecord = record.map_err(|source| StatsError::Csv {
            path: shown.clone(),
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Scale, score, and sort descending by composite score. Ties keep input
/// order.
pub fn rank_units(records: &[UnitStatsRecord]) -> Vec<RankedUnit> {
    let popularity = min_max_scale(records.iter().map(|r| r.champ_popularity));
    let top_4 = min_max_scale(records.iter().map(|r| r.champ_top_4_percentage));
    let top_1 = min_max_scale(records.iter().map(|r| r.champ_top_1_percentage));
    let placement = min_max_scale(records.iter().map(|r| r.average_placement));
    let players_beaten =
        min_max_scale(records.iter().map(|r| LOBBY_SIZE_PLUS_ONE - r.average_placement));

    let mut ranked: Vec<RankedUnit> = records
        .iter()
        .enumerate()
        .map(|(i, record)| RankedUnit {
            champ_name: record.champ_name.clone(),
            champ_popularity: popularity[i],
            champ_top_4_percentage: top_4[i],
            champ_top_1_percentage: top_1[i],
            average_placement: placement[i],
            players_beaten: players_beaten[i],
            composite_score: popularity[i] + players_beaten[i],
        })
        .collect();

    ranked.sort_by(|left, right| right.composite_score.total_cmp(&left.composite_score));
    ranked
}

pub fn write_ranked_units(
    path: impl AsRef<Path>,
    units: &[RankedUnit],
) -> Result<(), StatsError> {
    let shown = path.as_ref().display().to_string();
    let mut writer = csv::Writer::from_path(&path).map_err(|source| StatsError::Write {
        path: shown.clone(),
        source,
    })?;
    for unit in units {
        writer.serialize(unit).map_err(|source| StatsError::Write {
            path: shown.clone(),
            source,
        })?;
    }
    writer.flush().map_err(|source| StatsError::Write {
        path: shown,
        source: csv::Error::from(source),
    })
}

/// Name-to-composite-score lookup for the team rating pass.
pub fn composite_scores(units: &[RankedUnit]) -> HashMap<String, f64> {
    units
        .iter()
        .map(|unit| (unit.champ_name.clone(), unit.composite_score))
        .collect()
}

fn min_max_scale(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let values: Vec<f64> = values.collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if values.is_empty() || span == 0.0 {
        // A constant column carries no ranking signal.
        return vec![0.0; values.len()];
    }
    values.into_iter().map(|value| (value - min) / span).collect()
}
