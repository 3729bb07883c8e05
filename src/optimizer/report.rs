//! Presentation helpers over a [SearchResult]: named compositions, the bench table, and picking
//! one composition out of a tie.

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

use crate::data::candidate::Candidate;
use crate::data::catalog::RoleCatalog;
use crate::optimizer::rng::Rng;
use crate::optimizer::search::{Assignment, SearchResult};

/// Placeholder shown for benched members in the lineup table.
pub const BENCH_MARKER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TieChoiceError {
    #[error("no composition to choose from")]
    Empty,
    #[error("composition {index} does not exist (only {available} tied)")]
    OutOfRange { index: usize, available: usize },
    #[error("invalid choice '{0}' (expected an index or 'rnd')")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberRole {
    pub member: String,
    pub role: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedComposition {
    pub index: usize,
    pub score: i64,
    /// Members in catalog order of their roles (tanks first, then healers, then DPS).
    pub members: Vec<MemberRole>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub best_score: i64,
    pub infeasible: bool,
    pub total_feasible_considered: u64,
    pub subsets_considered: u64,
    pub subsets_pruned: u64,
    pub assignments_scored: u64,
    pub compositions: Vec<RankedComposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen: Option<usize>,
}

/// Slot order of an assignment sorted by catalog priority of the assigned roles; ties keep
/// selection order.
pub fn lineup_order<T>(assignment: &Assignment<T>, catalog: &RoleCatalog) -> Vec<usize> {
    let mut slots: Vec<usize> = (0..assignment.roles.len()).collect();
    slots.sort_by_key(|slot| catalog.index_of(assignment.roles[*slot]));
    slots
}

pub fn describe<T: fmt::Display>(
    index: usize,
    assignment: &Assignment<T>,
    catalog: &RoleCatalog,
) -> RankedComposition {
    let members = lineup_order(assignment, catalog)
        .into_iter()
        .map(|slot| {
            let role = assignment.roles[slot];
            MemberRole {
                member: assignment.members[slot].token.to_string(),
                role: catalog.name(role).to_string(),
                category: catalog.category_name(catalog.category_of(role)).to_string(),
            }
        })
        .collect();
    RankedComposition {
        index,
        score: assignment.score,
        members,
    }
}

pub fn build_report<T: fmt::Display>(
    result: &SearchResult<T>,
    catalog: &RoleCatalog,
    chosen: Option<usize>,
) -> SearchReport {
    SearchReport {
        best_score: result.best_score,
        infeasible: result.is_infeasible(),
        total_feasible_considered: result.total_feasible_considered,
        subsets_considered: result.subsets_considered,
        subsets_pruned: result.subsets_pruned,
        assignments_scored: result.assignments_scored,
        compositions: result
            .best_assignments
            .iter()
            .enumerate()
            .map(|(index, assignment)| describe(index, assignment, catalog))
            .collect(),
        chosen,
    }
}

/// Tab separated table: one column per pool member, one row per tied composition holding the
/// member's role or [BENCH_MARKER].
pub fn lineup_table<T: fmt::Display>(
    pool: &[Candidate<T>],
    result: &SearchResult<T>,
    catalog: &RoleCatalog,
) -> String {
    let mut table = String::new();
    let header: Vec<String> = pool.iter().map(|candidate| candidate.token.to_string()).collect();
    let _ = writeln!(table, "#\tscore\t{}", header.join("\t"));

    for (index, assignment) in result.best_assignments.iter().enumerate() {
        let cells: Vec<&str> = (0..pool.len())
            .map(|pool_index| {
                assignment
                    .role_of(pool_index)
                    .map(|role| catalog.name(role))
                    .unwrap_or(BENCH_MARKER)
            })
            .collect();
        let _ = writeln!(table, "{index}\t{}\t{}", assignment.score, cells.join("\t"));
    }
    table
}

/// How to settle a tie between equally scored compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieChoice {
    Index(usize),
    /// Uniform over the tie set; seeded from the OS when `None`.
    Random(Option<u64>),
}

impl TieChoice {
    /// Parses `"rnd"` or a zero-based index.
    pub fn parse(raw: &str, seed: Option<u64>) -> Result<Self, TieChoiceError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("rnd") || raw.eq_ignore_ascii_case("random") {
            return Ok(Self::Random(seed));
        }
        raw.parse::<usize>()
            .map(Self::Index)
            .map_err(|_| TieChoiceError::Invalid(raw.to_string()))
    }

    /// Index into `best_assignments` of the chosen composition.
    pub fn choose<T>(&self, result: &SearchResult<T>) -> Result<usize, TieChoiceError> {
        let available = result.best_assignments.len();
        if available == 0 {
            return Err(TieChoiceError::Empty);
        }
        match *self {
            Self::Index(index) if index < available => Ok(index),
            Self::Index(index) => Err(TieChoiceError::OutOfRange { index, available }),
            Self::Random(seed) => {
                let mut rng = seed.map(Rng::new).unwrap_or_else(Rng::from_entropy);
                Ok(rng.below(available))
            }
        }
    }
}
