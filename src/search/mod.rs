pub mod combinations;
pub mod evaluate;
pub mod scorer;
pub mod top_n;

use std::fmt;

pub use combinations::Team;
pub use evaluate::EvaluateError;

use crate::data::roster::Roster;
use crate::parallel::WorkerPool;
use crate::report::{SearchReport, TeamEntry};
use crate::search::evaluate::scored_teams;
use crate::search::scorer::TeamScorer;
use crate::search::top_n::TopNSelector;

/// A team paired with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTeam {
    pub score: f64,
    pub team: Team,
}

/// Parameters for one search run. `workers == 0` means the Rayon default
/// (all cores); the other fields must be non-zero and `min_size <= max_size`.
#[derive(Debug, Clone, Copy)]
pub struct SearchScenario {
    pub min_size: usize,
    pub max_size: usize,
    pub top_n: usize,
    pub workers: usize,
    pub chunk_size: usize,
}

impl Default for SearchScenario {
    fn default() -> Self {
        Self {
            min_size: 4,
            max_size: 9,
            top_n: 500,
            workers: 0,
            chunk_size: 10_000,
        }
    }
}

impl SearchScenario {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.min_size == 0 || self.min_size > self.max_size {
            return Err(SearchError::InvalidSizes {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.top_n == 0 {
            return Err(SearchError::ZeroTopN);
        }
        if self.chunk_size == 0 {
            return Err(SearchError::ZeroChunk);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum SearchError {
    InvalidSizes { min: usize, max: usize },
    ZeroTopN,
    ZeroChunk,
    Evaluate(EvaluateError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSizes { min, max } => {
                write!(f, "team sizes must satisfy 1 <= min <= max, got {min}..={max}")
            }
            Self::ZeroTopN => write!(f, "top_n must be positive"),
            Self::ZeroChunk => write!(f, "chunk_size must be positive"),
            Self::Evaluate(err) => write!(f, "{err}"),
        }
    }
}

impl From<EvaluateError> for SearchError {
    fn from(err: EvaluateError) -> Self {
        Self::Evaluate(err)
    }
}

/// The top `top_n` teams of exactly `size` units: enumerate, score in
/// parallel batches, reduce through the bounded selector. A `size` larger
/// than the roster yields an empty result.
pub fn best_of_size<S>(
    roster: &Roster,
    scorer: &S,
    size: usize,
    top_n: usize,
    chunk_size: usize,
) -> Result<Vec<ScoredTeam>, EvaluateError>
where
    S: TeamScorer + ?Sized,
{
    let mut selector = TopNSelector::new(top_n);
    let stream = scored_teams(
        combinations::teams(roster.unit_count(), size),
        scorer,
        size,
        chunk_size,
    );
    for entry in stream {
        selector.push(entry?);
    }
    Ok(selector.into_sorted())
}

/// Run the search across every size in the scenario and assemble the report,
/// translating unit ids back to names.
pub fn run_search<S>(
    roster: &Roster,
    scorer: &S,
    scenario: &SearchScenario,
) -> Result<SearchReport, SearchError>
where
    S: TeamScorer + ?Sized,
{
    run_search_with_progress(roster, scorer, scenario, |_, _| {})
}

/// Like [run_search] but invokes `on_size_done(size, kept)` after each team
/// size finishes.
pub fn run_search_with_progress<S, F>(
    roster: &Roster,
    scorer: &S,
    scenario: &SearchScenario,
    mut on_size_done: F,
) -> Result<SearchReport, SearchError>
where
    S: TeamScorer + ?Sized,
    F: FnMut(usize, usize),
{
    scenario.validate()?;

    let pool = WorkerPool::with_workers(scenario.workers);
    let mut report = SearchReport::default();
    for size in scenario.min_size..=scenario.max_size {
        let best = pool.install(|| {
            best_of_size(roster, scorer, size, scenario.top_n, scenario.chunk_size)
        })?;
        on_size_done(size, best.len());
        let entries = best
            .into_iter()
            .map(|scored| TeamEntry {
                team: roster.unit_names(&scored.team),
                score: scored.score,
            })
            .collect();
        report.sizes.insert(size, entries);
    }
    Ok(report)
}
