use std::env;

use tracing::info;

use crate::config::{ConfigError, RaidcompConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use crate::data::catalog::RoleCatalog;
use crate::data::quota::RoleQuota;
use crate::data::roster::load_roster;
use crate::data::validate::validate_roster_file;
use crate::optimizer::report::{describe, TieChoice};
use crate::optimizer::{build_report, estimate_search_space, lineup_table, optimize_roster};

const USAGE: &str = "usage: raidcomp <build|validate|catalog> [--config path]";
const BUILD_USAGE: &str = "usage: raidcomp build <roster.(json|yaml|csv)> [--quota T,H,D] \
[--table] [--pick N|rnd] [--seed S] [--parallel] [--config path]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Build,
    Validate,
    Catalog,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("build") => Some(Command::Build),
        Some("validate") => Some(Command::Validate),
        Some("catalog") => Some(Command::Catalog),
        _ => None,
    }
}

/// `--config <path>`, then `RAIDCOMP_CONFIG`, then `raidcomp.yaml`. A missing file means defaults.
pub fn load_config(args: &[String]) -> Result<RaidcompConfig, ConfigError> {
    if let Some(path) = flag_value(args, "--config") {
        return RaidcompConfig::load(path);
    }
    let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    RaidcompConfig::load_or_default(path)
}

pub fn run_with_args(args: &[String]) -> i32 {
    match load_config(args) {
        Ok(config) => run_with_config(args, &config),
        Err(err) => {
            eprintln!("config error: {err}");
            1
        }
    }
}

pub fn run_with_config(args: &[String], config: &RaidcompConfig) -> i32 {
    match parse_command(args) {
        Some(Command::Build) => handle_build(args, config),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Catalog) => handle_catalog(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

#[derive(Debug, Default)]
struct BuildArgs {
    roster: String,
    quota: Option<String>,
    table: bool,
    pick: Option<String>,
    seed: Option<u64>,
    parallel: bool,
}

fn parse_build_args(args: &[String]) -> Result<BuildArgs, String> {
    let mut parsed = BuildArgs::default();
    let mut roster = None;
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--table" => parsed.table = true,
            "--parallel" => parsed.parallel = true,
            "--quota" | "--pick" | "--seed" | "--config" => {
                let Some(value) = rest.next() else {
                    return Err(format!("missing value for {arg}"));
                };
                match arg.as_str() {
                    "--quota" => parsed.quota = Some(value.clone()),
                    "--pick" => parsed.pick = Some(value.clone()),
                    "--seed" => {
                        let seed = value
                            .parse::<u64>()
                            .map_err(|_| format!("invalid seed '{value}'"))?;
                        parsed.seed = Some(seed);
                    }
                    _ => {}
                }
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path if roster.is_none() => roster = Some(path.to_string()),
            extra => return Err(format!("unexpected argument '{extra}'")),
        }
    }
    parsed.roster = roster.ok_or_else(|| "missing roster path".to_string())?;
    Ok(parsed)
}

fn handle_build(args: &[String], config: &RaidcompConfig) -> i32 {
    let build = match parse_build_args(args) {
        Ok(build) => build,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{BUILD_USAGE}");
            return 2;
        }
    };

    let file = match load_roster(&build.roster) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            return 1;
        }
    };
    let catalog = match file.catalog() {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            return 1;
        }
    };
    let roster = match file.resolve(&catalog) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("failed to resolve roster: {err}");
            return 1;
        }
    };

    let quota = match &build.quota {
        Some(raw) => match RoleQuota::parse(raw, &catalog) {
            Ok(quota) => quota,
            Err(err) => {
                eprintln!("invalid --quota '{raw}': {err}");
                return 2;
            }
        },
        None => match &roster.quota {
            Some(quota) => quota.clone(),
            None => {
                eprintln!("no quota: pass --quota or add a quota to the roster");
                return 2;
            }
        },
    };

    if let Some(limit) = config.max_search_space {
        let estimate = estimate_search_space(&roster.candidates, quota.total());
        if estimate > u128::from(limit) {
            eprintln!(
                "search space of {estimate} assignments exceeds max_search_space {limit}; \
                 trim the roster or raise the limit"
            );
            return 1;
        }
    }

    let mut run_config = config.clone();
    run_config.search.parallel |= build.parallel;

    let result = match optimize_roster(&roster, &quota, &catalog, &run_config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("build failed: {err}");
            return 1;
        }
    };

    if result.is_infeasible() {
        eprintln!(
            "no composition meets the quota with these sign-ups; cancel the run or assign roles \
             manually"
        );
    }

    let chosen = match (&build.pick, result.is_infeasible()) {
        (Some(raw), false) => {
            let choice = match TieChoice::parse(raw, build.seed) {
                Ok(choice) => choice,
                Err(err) => {
                    eprintln!("{err}");
                    return 2;
                }
            };
            match choice.choose(&result) {
                Ok(index) => Some(index),
                Err(err) => {
                    eprintln!("{err}");
                    return 1;
                }
            }
        }
        _ => None,
    };
    if let Some(index) = chosen {
        info!(index, tied = result.best_assignments.len(), "composition chosen");
    }

    if build.table {
        print!("{}", lineup_table(&roster.candidates, &result, &catalog));
        if let Some(index) = chosen {
            let picked = describe(index, &result.best_assignments[index], &catalog);
            println!();
            println!("chosen\t{index}");
            for slot in picked.members {
                println!("{}\t{}", slot.role, slot.member);
            }
        }
        return 0;
    }

    match serde_json::to_string_pretty(&build_report(&result, &catalog, chosen)) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize build result: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: raidcomp validate <roster.(json|yaml|csv)>");
        return 2;
    };

    match validate_roster_file(path) {
        Ok(report) => {
            for diagnostic in &report.diagnostics {
                eprintln!("- {diagnostic}");
            }
            if report.has_errors() {
                eprintln!("validation failed: {} error(s)", report.error_count());
                1
            } else {
                println!("validation passed: {path}");
                0
            }
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

fn handle_catalog(args: &[String]) -> i32 {
    let catalog = match args.get(2).filter(|arg| !arg.starts_with("--")) {
        Some(path) => match load_roster(path).and_then(|file| file.catalog()) {
            Ok(catalog) => catalog,
            Err(err) => {
                eprintln!("failed to load roster: {err}");
                return 1;
            }
        },
        None => RoleCatalog::ffxiv(),
    };

    match serde_json::to_string_pretty(&catalog.to_spec()) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize catalog: {err}");
            1
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}
