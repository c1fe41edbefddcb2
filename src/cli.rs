use std::fs;

use serde::Serialize;

use crate::data::roster::Roster;
use crate::data::stats::{composite_scores, load_unit_stats, rank_units, write_ranked_units};
use crate::data::validate::validate_roster_files;
use crate::report::{rate_teams, SearchReport};
use crate::search::combinations::team_count;
use crate::search::scorer::PerfectSynergy;
use crate::search::{run_search_with_progress, SearchScenario};

const DEFAULT_RANKED_UNITS_PATH: &str = "ranked_units.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Search,
    RankUnits,
    Rate,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("search") => Some(Command::Search),
        Some("rank-units") => Some(Command::RankUnits),
        Some("rate") => Some(Command::Rate),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Search) => handle_search(args),
        Some(Command::RankUnits) => handle_rank_units(args),
        Some(Command::Rate) => handle_rate(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: carousel <search|rank-units|rate|validate>");
            2
        }
    }
}

fn handle_search(args: &[String]) -> i32 {
    let positional = positional_args(args);
    let (Some(units_path), Some(breakpoints_path)) =
        (positional.first().copied(), positional.get(1).copied())
    else {
        eprintln!(
            "usage: carousel search <units.csv> <traits.csv> [min_size] [max_size] [top_n] \
             [--workers N] [--chunk N] [--out FILE]"
        );
        return 2;
    };

    let scenario = SearchScenario {
        min_size: parse_usize_arg(positional.get(2).copied(), "min_size", 4),
        max_size: parse_usize_arg(positional.get(3).copied(), "max_size", 9),
        top_n: parse_usize_arg(positional.get(4).copied(), "top_n", 500),
        workers: parse_usize_arg(flag_value(args, "--workers"), "workers", 0),
        chunk_size: parse_usize_arg(flag_value(args, "--chunk"), "chunk", 10_000),
    };
    if let Err(err) = scenario.validate() {
        eprintln!("invalid search parameters: {err}");
        return 1;
    }

    let roster = match Roster::load(units_path, breakpoints_path) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            return 1;
        }
    };
    for size in scenario.min_size..=scenario.max_size {
        eprintln!(
            "size {size}: {} teams to evaluate",
            team_count(roster.unit_count(), size)
        );
    }

    let scorer = PerfectSynergy::new(&roster);
    let report = match run_search_with_progress(&roster, &scorer, &scenario, |size, kept| {
        eprintln!("finished team size {size}: kept {kept} teams");
    }) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("search failed: {err}");
            return 1;
        }
    };

    emit_json(&report, flag_value(args, "--out"))
}

fn handle_rank_units(args: &[String]) -> i32 {
    let positional = positional_args(args);
    let Some(stats_path) = positional.first().copied() else {
        eprintln!("usage: carousel rank-units <stats.csv> [out.csv]");
        return 2;
    };
    let out_path = positional
        .get(1)
        .copied()
        .unwrap_or(DEFAULT_RANKED_UNITS_PATH);

    let records = match load_unit_stats(stats_path) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("failed to load unit stats: {err}");
            return 1;
        }
    };
    let ranked = rank_units(&records);
    match write_ranked_units(out_path, &ranked) {
        Ok(()) => {
            println!("ranked {} units into '{out_path}'", ranked.len());
            0
        }
        Err(err) => {
            eprintln!("failed to write ranked units: {err}");
            1
        }
    }
}

fn handle_rate(args: &[String]) -> i32 {
    let positional = positional_args(args);
    let (Some(report_path), Some(stats_path)) =
        (positional.first().copied(), positional.get(1).copied())
    else {
        eprintln!("usage: carousel rate <report.json> <stats.csv> [--out FILE]");
        return 2;
    };

    let report = match SearchReport::load(report_path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("failed to load search report: {err}");
            return 1;
        }
    };
    let records = match load_unit_stats(stats_path) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("failed to load unit stats: {err}");
            return 1;
        }
    };
    let composite = composite_scores(&rank_units(&records));
    let rated = match rate_teams(&report, &composite) {
        Ok(rated) => rated,
        Err(err) => {
            eprintln!("failed to rate teams: {err}");
            return 1;
        }
    };

    emit_json(&rated, flag_value(args, "--out"))
}

fn handle_validate(args: &[String]) -> i32 {
    let positional = positional_args(args);
    let (Some(units_path), Some(breakpoints_path)) =
        (positional.first().copied(), positional.get(1).copied())
    else {
        eprintln!("usage: carousel validate <units.csv> <traits.csv>");
        return 2;
    };

    match validate_roster_files(units_path, breakpoints_path) {
        Ok(report) => {
            for diag in &report.diagnostics {
                eprintln!("- [{}] {}: {}", diag.severity, diag.context, diag.message);
            }
            if report.has_errors() {
                eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
                1
            } else {
                println!("validation passed: {units_path}, {breakpoints_path}");
                0
            }
        }
        Err(err) => {
            eprintln!("validation aborted: {err}");
            1
        }
    }
}

/// Arguments after the command, minus `--flag value` pairs.
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positional = Vec::new();
    let mut skip_value = false;
    for arg in args.iter().skip(2) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_value = true;
            continue;
        }
        positional.push(arg.as_str());
    }
    positional
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

fn parse_usize_arg(raw: Option<&str>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn emit_json<T: Serialize>(payload: &T, out: Option<&str>) -> i32 {
    let json = match serde_json::to_string_pretty(payload) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            return 1;
        }
    };
    match out {
        Some(path) => match fs::write(path, json) {
            Ok(()) => {
                println!("wrote '{path}'");
                0
            }
            Err(err) => {
                eprintln!("failed to write '{path}': {err}");
                1
            }
        },
        None => {
            println!("{json}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn commands_parse_by_name() {
        assert_eq!(parse_command(&args(&["carousel", "search"])), Some(Command::Search));
        assert_eq!(
            parse_command(&args(&["carousel", "rank-units"])),
            Some(Command::RankUnits)
        );
        assert_eq!(parse_command(&args(&["carousel", "rate"])), Some(Command::Rate));
        assert_eq!(
            parse_command(&args(&["carousel", "validate"])),
            Some(Command::Validate)
        );
        assert_eq!(parse_command(&args(&["carousel", "serve"])), None);
        assert_eq!(parse_command(&args(&["carousel"])), None);
    }

    #[test]
    fn positional_args_skip_flag_pairs() {
        let argv = args(&[
            "carousel", "search", "units.csv", "traits.csv", "--workers", "4", "5", "--out",
            "report.json",
        ]);
        let positional = positional_args(&argv);
        assert_eq!(positional, vec!["units.csv", "traits.csv", "5"]);
        assert_eq!(flag_value(&argv, "--workers"), Some("4"));
        assert_eq!(flag_value(&argv, "--chunk"), None);
    }

    #[test]
    fn invalid_numeric_arguments_fall_back_to_defaults() {
        assert_eq!(parse_usize_arg(Some("three"), "min_size", 4), 4);
        assert_eq!(parse_usize_arg(None, "min_size", 4), 4);
        assert_eq!(parse_usize_arg(Some("6"), "min_size", 4), 6);
    }
}
