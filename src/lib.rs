//! Team-composition search for auto-battler rosters.
//!
//! Enumerates every k-unit team drawn from a roster, scores each team against
//! the roster's trait breakpoint table (or any other [search::scorer::TeamScorer]),
//! and keeps only the top N teams per size with bounded memory. Parallelism is
//! Rayon data-parallel batches inside a [parallel::WorkerPool].

pub mod cli;
pub mod data;
pub mod parallel;
pub mod report;
pub mod search;
