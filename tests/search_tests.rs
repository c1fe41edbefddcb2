use std::collections::HashSet;

use carousel::data::roster::{BreakpointRecord, Roster, UnitRecord};
use carousel::report::SearchReport;
use carousel::search::scorer::{DesirabilitySum, PerfectSynergy, ScoreError, TeamScorer};
use carousel::search::{best_of_size, run_search, ScoredTeam, SearchError, SearchScenario};

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

/// A,B share T1 (breakpoints {0,2}); C,D share T2 (breakpoints {0,1}).
fn paired_roster() -> Roster {
    Roster::build(
        vec![
            unit("A", &["T1"]),
            unit("B", &["T1"]),
            unit("C", &["T2"]),
            unit("D", &["T2"]),
        ],
        vec![row("T1", &[2]), row("T2", &[1])],
    )
    .expect("roster should build")
}

fn team_names(report: &SearchReport, size: usize) -> Vec<(Vec<String>, f64)> {
    report.sizes[&size]
        .iter()
        .map(|entry| (entry.team.clone(), entry.score))
        .collect()
}

#[test]
fn pair_search_finds_exactly_the_perfect_teams() {
    let roster = paired_roster();
    let scorer = PerfectSynergy::new(&roster);
    let scenario = SearchScenario {
        min_size: 2,
        max_size: 2,
        top_n: 10,
        workers: 1,
        chunk_size: 2,
    };

    let report = run_search(&roster, &scorer, &scenario).expect("search should run");
    let teams = team_names(&report, 2);
    assert_eq!(teams.len(), 6, "all C(4,2) teams are retained under top_n=10");

    // {A,B} is the lone perfect pair: T1 count 2 on its breakpoint, T2 count
    // 0 implied. A split pair like {A,C} leaves T1 at 1, and {C,D} pushes T2
    // to 2, neither of which is a breakpoint.
    let perfect: HashSet<Vec<String>> = teams
        .iter()
        .filter(|(_, score)| *score == 1.0)
        .map(|(team, _)| team.clone())
        .collect();
    assert_eq!(
        perfect,
        HashSet::from([vec!["A".to_string(), "B".to_string()]])
    );
    assert!(teams
        .iter()
        .any(|(team, score)| team == &vec!["A".to_string(), "C".to_string()] && *score == 0.0));
    assert!(teams
        .iter()
        .any(|(team, score)| team == &vec!["C".to_string(), "D".to_string()] && *score == 0.0));
}

#[test]
fn oversized_teams_yield_an_empty_result_not_an_error() {
    let roster = paired_roster();
    let scorer = PerfectSynergy::new(&roster);
    let scenario = SearchScenario {
        min_size: 5,
        max_size: 6,
        top_n: 10,
        workers: 1,
        chunk_size: 100,
    };

    let report = run_search(&roster, &scorer, &scenario).expect("search should run");
    assert!(report.sizes[&5].is_empty());
    assert!(report.sizes[&6].is_empty());
}

#[test]
fn worker_count_does_not_change_the_retained_set() {
    let roster = Roster::build(
        vec![
            unit("A", &["T1"]),
            unit("B", &["T1"]),
            unit("C", &["T1", "T2"]),
            unit("D", &["T2"]),
            unit("E", &["T2"]),
            unit("F", &["T3"]),
            unit("G", &["T3"]),
            unit("H", &[]),
        ],
        vec![row("T1", &[2, 3]), row("T2", &[2]), row("T3", &[2])],
    )
    .expect("roster should build");
    let scorer = PerfectSynergy::new(&roster);

    let run = |workers: usize, chunk_size: usize| {
        let scenario = SearchScenario {
            min_size: 2,
            max_size: 4,
            top_n: 25,
            workers,
            chunk_size,
        };
        run_search(&roster, &scorer, &scenario).expect("search should run")
    };

    let single = run(1, 3);
    let many = run(8, 50);
    // Stream order equals enumeration order for any worker count, so even the
    // tie-break agrees and whole reports match.
    assert_eq!(single, many);
}

#[test]
fn best_of_size_streams_through_a_bounded_selector() {
    let roster = paired_roster();
    let composite = [("A", 4.0), ("B", 3.0), ("C", 2.0), ("D", 1.0)]
        .into_iter()
        .map(|(name, score)| (name.to_string(), score))
        .collect();
    let scorer = DesirabilitySum::new(&roster, &composite).expect("all units scored");

    let best = best_of_size(&roster, &scorer, 2, 2, 3).expect("search should run");
    let scores: Vec<f64> = best.iter().map(|entry| entry.score).collect();
    assert_eq!(scores, vec![7.0, 6.0], "top two of six pairs by summed score");
    assert_eq!(best[0].team, vec![0, 1]);
    assert_eq!(best[1].team, vec![0, 2]);
}

#[test]
fn scoring_fault_aborts_the_run_with_batch_context() {
    struct Poisoned;

    impl TeamScorer for Poisoned {
        fn score(&self, team: &[u16]) -> Result<f64, ScoreError> {
            if team.contains(&3) {
                return Err(ScoreError::UnscoredUnit {
                    unit: "D".to_string(),
                });
            }
            Ok(0.0)
        }
    }

    let roster = paired_roster();
    let scenario = SearchScenario {
        min_size: 2,
        max_size: 2,
        top_n: 10,
        workers: 1,
        chunk_size: 2,
    };

    let err = run_search(&roster, &Poisoned, &scenario).expect_err("poisoned run should fail");
    match err {
        SearchError::Evaluate(err) => {
            assert_eq!(err.team_size, 2);
            // Pairs in enumeration order: [0,1] [0,2] | [0,3] [1,2] | ...
            assert_eq!(err.batch_index, 1);
        }
        other => panic!("expected an evaluation failure, got {other}"),
    }
}

#[test]
fn invalid_parameters_fail_before_any_search() {
    let roster = paired_roster();
    let scorer = PerfectSynergy::new(&roster);
    let scenario = SearchScenario {
        min_size: 3,
        max_size: 2,
        top_n: 10,
        workers: 1,
        chunk_size: 10,
    };
    assert!(matches!(
        run_search(&roster, &scorer, &scenario),
        Err(SearchError::InvalidSizes { min: 3, max: 2 })
    ));
}

#[test]
fn report_round_trips_through_a_file() {
    let roster = paired_roster();
    let scorer = PerfectSynergy::new(&roster);
    let scenario = SearchScenario {
        min_size: 2,
        max_size: 3,
        top_n: 5,
        workers: 1,
        chunk_size: 10,
    };
    let report = run_search(&roster, &scorer, &scenario).expect("search should run");

    let path = std::env::temp_dir().join(format!("carousel-report-{}.json", std::process::id()));
    report.save(&path).expect("report should save");
    let loaded = SearchReport::load(&path).expect("report should load");
    assert_eq!(loaded, report);

    let _ = std::fs::remove_file(path);
}

#[test]
fn top_n_bounds_the_retained_teams_per_size() {
    let roster = paired_roster();
    let scorer = PerfectSynergy::new(&roster);
    let scenario = SearchScenario {
        min_size: 2,
        max_size: 2,
        top_n: 3,
        workers: 1,
        chunk_size: 2,
    };

    let report = run_search(&roster, &scorer, &scenario).expect("search should run");
    let teams = team_names(&report, 2);
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[0].0, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(teams[0].1, 1.0);
    assert_eq!(teams[1].1, 0.0);
    assert_eq!(teams[2].1, 0.0);
}

#[test]
fn scored_team_ordering_is_deterministic_for_ties() {
    let roster = paired_roster();
    let scorer = PerfectSynergy::new(&roster);

    // {A,B} wins outright at 1.0; the imperfect pairs tie at 0.0 and stream
    // order (enumeration order) breaks the tie.
    let best: Vec<ScoredTeam> =
        best_of_size(&roster, &scorer, 2, 3, 2).expect("search should run");
    assert_eq!(best[0].team, vec![0, 1]);
    assert_eq!(best[1].team, vec![0, 2]);
    assert_eq!(best[2].team, vec![0, 3]);
}
