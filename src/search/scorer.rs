//! Scoring callables: pure functions from team to score.
//!
//! A scorer may only read the roster and its own immutable data, so one
//! instance can be shared by every worker thread scoring batches.

use std::collections::HashMap;
use std::fmt;

use crate::data::roster::{Roster, TraitId, UnitId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// A roster unit has no composite score in the supplied ranking data.
    UnscoredUnit { unit: String },
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnscoredUnit { unit } => {
                write!(f, "unit '{unit}' has no composite score")
            }
        }
    }
}

/// Contract for team scoring. Implementations must be pure with respect to
/// the team: no shared mutable state, no ordering dependency between calls,
/// safe to invoke from many workers at once.
pub trait TeamScorer: Sync {
    fn score(&self, team: &[UnitId]) -> Result<f64, ScoreError>;
}

/// The perfect-synergy predicate: a team scores 1.0 when every trait's count
/// among team members sits on one of that trait's breakpoints, else 0.0.
pub struct PerfectSynergy<'a> {
    roster: &'a Roster,
}

impl<'a> PerfectSynergy<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    pub fn is_perfect(&self, team: &[UnitId]) -> bool {
        // The counter is call-local so repeated and concurrent evaluations
        // can never observe a prior team's counts.
        let mut counts = vec![0u32; self.roster.trait_count()];
        for &unit in team {
            for &trait_id in self.roster.traits_of(unit) {
                counts[trait_id as usize] += 1;
            }
        }
        counts
            .iter()
            .enumerate()
            .all(|(trait_id, count)| {
                self.roster
                    .breakpoints_of(trait_id as TraitId)
                    .contains(count)
            })
    }
}

impl TeamScorer for PerfectSynergy<'_> {
    fn score(&self, team: &[UnitId]) -> Result<f64, ScoreError> {
        Ok(if self.is_perfect(team) { 1.0 } else { 0.0 })
    }
}

/// Desirability measure: the sum of externally computed composite scores over
/// the team's members. Coverage is checked once at construction so scoring
/// itself stays infallible.
#[derive(Debug)]
pub struct DesirabilitySum {
    scores: Vec<f64>,
}

impl DesirabilitySum {
    pub fn new(roster: &Roster, composite: &HashMap<String, f64>) -> Result<Self, ScoreError> {
        let mut scores = Vec::with_capacity(roster.unit_count());
        for id in 0..roster.unit_count() {
            let name = roster.unit_name(id as UnitId);
            match composite.get(name) {
                Some(&score) => scores.push(score),
                None => {
                    return Err(ScoreError::UnscoredUnit {
                        unit: name.to_string(),
                    })
                }
            }
        }
        Ok(Self { scores })
    }
}

impl TeamScorer for DesirabilitySum {
    fn score(&self, team: &[UnitId]) -> Result<f64, ScoreError> {
        Ok(team.iter().map(|&id| self.scores[id as usize]).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roster::{BreakpointRecord, UnitRecord};

    fn fixture_roster() -> Roster {
        let units = vec![
            unit("A", &["T1"]),
            unit("B", &["T1"]),
            unit("C", &["T2"]),
            unit("D", &["T2"]),
        ];
        let table = vec![row("T1", &[2]), row("T2", &[1])];
        Roster::build(units, table).expect("fixture roster should build")
    }

    fn unit(name: &str, traits: &[&str]) -> UnitRecord {
        UnitRecord {
            name: name.to_string(),
            cost: 1,
            traits: traits.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn row(trait_name: &str, breakpoints: &[u32]) -> BreakpointRecord {
        BreakpointRecord {
            trait_name: trait_name.to_string(),
            breakpoints: breakpoints.to_vec(),
        }
    }

    #[test]
    fn paired_trait_team_is_perfect() {
        let roster = fixture_roster();
        let scorer = PerfectSynergy::new(&roster);
        // {A,B}: T1 count 2 is a breakpoint, T2 count 0 is implied.
        assert!(scorer.is_perfect(&[0, 1]));
        assert_eq!(scorer.score(&[0, 1]), Ok(1.0));
    }

    #[test]
    fn split_trait_team_is_not_perfect() {
        let roster = fixture_roster();
        let scorer = PerfectSynergy::new(&roster);
        // {A,C}: T1 count 1 misses {0,2}.
        assert!(!scorer.is_perfect(&[0, 2]));
        assert_eq!(scorer.score(&[0, 2]), Ok(0.0));
    }

    #[test]
    fn repeated_evaluation_is_stateless() {
        let roster = fixture_roster();
        let scorer = PerfectSynergy::new(&roster);
        let first = scorer.score(&[0, 1]);
        let second = scorer.score(&[0, 1]);
        assert_eq!(first, second);
        // Interleaving a different team must not bleed counts either.
        let _ = scorer.score(&[0, 2]);
        assert_eq!(scorer.score(&[0, 1]), first);
    }

    #[test]
    fn desirability_sum_adds_member_scores() {
        let roster = fixture_roster();
        let composite: HashMap<String, f64> = [("A", 1.5), ("B", 0.25), ("C", 2.0), ("D", 0.0)]
            .into_iter()
            .map(|(name, score)| (name.to_string(), score))
            .collect();
        let scorer = DesirabilitySum::new(&roster, &composite).expect("all units scored");
        assert_eq!(scorer.score(&[0, 1]), Ok(1.75));
        assert_eq!(scorer.score(&[2, 3]), Ok(2.0));
    }

    #[test]
    fn desirability_sum_rejects_unscored_units() {
        let roster = fixture_roster();
        let composite: HashMap<String, f64> =
            [("A".to_string(), 1.0), ("B".to_string(), 1.0)].into_iter().collect();
        let err = DesirabilitySum::new(&roster, &composite).expect_err("C has no score");
        assert_eq!(err, ScoreError::UnscoredUnit { unit: "C".to_string() });
    }
}
