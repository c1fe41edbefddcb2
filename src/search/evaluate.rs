//! Parallel evaluation engine: scores the team stream batch by batch.
//!
//! Teams are drained from the enumerator in `chunk_size` batches and each
//! batch is scored as one Rayon data-parallel map. The map preserves batch
//! order and every team rides alongside its own score through the same stage,
//! so no second traversal of the combination stream is needed for pairing.
//! Thread count comes from whichever [crate::parallel::WorkerPool] the caller
//! installed around the run.

use std::fmt;

use rayon::prelude::*;

use crate::parallel::drain_batch;
use crate::search::scorer::{ScoreError, TeamScorer};
use crate::search::{ScoredTeam, Team};

/// A scoring fault, reported with enough context to reproduce the batch.
#[derive(Debug)]
pub struct EvaluateError {
    pub team_size: usize,
    pub batch_index: usize,
    pub source: ScoreError,
}

impl fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scoring batch {} of size-{} teams failed: {}",
            self.batch_index, self.team_size, self.source
        )
    }
}

/// Lazily scored view of a team stream. Yields one `Ok(ScoredTeam)` per input
/// team; the first scoring fault is yielded as `Err` and no further batches
/// are dispatched.
pub struct ScoredTeams<'a, I, S: ?Sized> {
    teams: I,
    scorer: &'a S,
    team_size: usize,
    chunk_size: usize,
    next_batch: usize,
    ready: std::vec::IntoIter<ScoredTeam>,
    halted: bool,
}

/// Score every team in `teams`, batch by batch, pairing each score with its
/// originating team.
pub fn scored_teams<'a, I, S>(
    teams: I,
    scorer: &'a S,
    team_size: usize,
    chunk_size: usize,
) -> ScoredTeams<'a, I, S>
where
    I: Iterator<Item = Team>,
    S: TeamScorer + ?Sized,
{
    ScoredTeams {
        teams,
        scorer,
        team_size,
        chunk_size,
        next_batch: 0,
        ready: Vec::new().into_iter(),
        halted: false,
    }
}

impl<I, S> Iterator for ScoredTeams<'_, I, S>
where
    I: Iterator<Item = Team>,
    S: TeamScorer + ?Sized,
{
    type Item = Result<ScoredTeam, EvaluateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.halted {
                return None;
            }
            if let Some(entry) = self.ready.next() {
                return Some(Ok(entry));
            }

            let batch = drain_batch(&mut self.teams, self.chunk_size);
            if batch.is_empty() {
                return None;
            }
            let batch_index = self.next_batch;
            self.next_batch += 1;

            let scorer = self.scorer;
            let scored: Result<Vec<ScoredTeam>, ScoreError> = batch
                .into_par_iter()
                .map(|team| scorer.score(&team).map(|score| ScoredTeam { score, team }))
                .collect();

            match scored {
                Ok(entries) => self.ready = entries.into_iter(),
                Err(source) => {
                    self.halted = true;
                    return Some(Err(EvaluateError {
                        team_size: self.team_size,
                        batch_index,
                        source,
                    }));
                }
            }
        }
    }
}
