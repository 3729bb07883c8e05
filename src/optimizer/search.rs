use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::candidate::Candidate;
use crate::data::catalog::{RoleCatalog, RoleId};
use crate::data::quota::RoleQuota;
use crate::optimizer::enumerator::{
    estimate_search_space, for_each_role_choice, shard_prefixes, CategoryReach, Combinations,
};
use crate::optimizer::scorer::{CompositionScorer, WeightedScorer};
use crate::parallel::WorkerPool;

/// Shards pin this many leading pool indices, so a search splits into up to `C(pool, 2)` units.
const SHARD_PREFIX_DEPTH: usize = 2;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("composition needs {required} members but only {available} candidates are available")]
    InsufficientCandidates { required: usize, available: usize },
    #[error("quota has {quota} categories but the catalog has {catalog}")]
    QuotaMismatch { quota: usize, catalog: usize },
    #[error("candidate #{candidate} lists a role that is not in the catalog")]
    UnknownRole { candidate: usize },
    #[error("unable to start search workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Shard subsets across Rayon workers. The result is identical to a sequential run.
    pub parallel: bool,
    /// Worker threads when parallel; 0 uses the global Rayon pool.
    pub workers: usize,
    /// Skip subsets that cannot meet the quota whatever roles they take.
    pub prune: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            workers: 0,
            prune: true,
        }
    }
}

/// One concrete composition: `members[i]` plays `roles[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment<T> {
    /// Positions of the members in the searched pool, ascending.
    pub pool_indices: Vec<usize>,
    pub members: Vec<Candidate<T>>,
    pub roles: Vec<RoleId>,
    pub score: i64,
}

impl<T> Assignment<T> {
    pub fn role_of(&self, pool_index: usize) -> Option<RoleId> {
        self.pool_indices
            .iter()
            .position(|index| *index == pool_index)
            .map(|slot| self.roles[slot])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult<T> {
    /// 0 when nothing is feasible.
    pub best_score: i64,
    /// Every feasible assignment scoring `best_score`, in enumeration order.
    pub best_assignments: Vec<Assignment<T>>,
    pub total_feasible_considered: u64,
    pub subsets_considered: u64,
    pub subsets_pruned: u64,
    pub assignments_scored: u64,
}

impl<T> SearchResult<T> {
    /// No role choice of any subset meets the quota; the caller should fall back to a manual
    /// composition or cancel.
    pub fn is_infeasible(&self) -> bool {
        self.best_assignments.is_empty()
    }
}

/// Running maximum and tie set of one shard (or of the whole search).
#[derive(Debug, Default)]
struct Tally {
    best: Option<i64>,
    ties: Vec<(Vec<usize>, Vec<RoleId>)>,
    feasible: u64,
    subsets: u64,
    pruned: u64,
    scored: u64,
}

impl Tally {
    fn record(&mut self, subset: &[usize], roles: &[RoleId], score: i64) {
        self.feasible += 1;
        match self.best {
            Some(best) if score < best => {}
            Some(best) if score == best => self.ties.push((subset.to_vec(), roles.to_vec())),
            _ => {
                self.best = Some(score);
                self.ties.clear();
                self.ties.push((subset.to_vec(), roles.to_vec()));
            }
        }
    }

    /// Folds a later shard into this one; ties keep enumeration order.
    fn merge(mut self, later: Tally) -> Tally {
        self.feasible += later.feasible;
        self.subsets += later.subsets;
        self.pruned += later.pruned;
        self.scored += later.scored;
        match (self.best, later.best) {
            (_, None) => {}
            (None, Some(_)) => {
                self.best = later.best;
                self.ties = later.ties;
            }
            (Some(current), Some(incoming)) => {
                if incoming > current {
                    self.best = later.best;
                    self.ties = later.ties;
                } else if incoming == current {
                    self.ties.extend(later.ties);
                }
            }
        }
        self
    }
}

struct SearchContext<'a, T, S> {
    pool: &'a [Candidate<T>],
    quota: &'a RoleQuota,
    catalog: &'a RoleCatalog,
    scorer: &'a S,
    reach: Option<CategoryReach>,
    size: usize,
}

impl<T, S: CompositionScorer> SearchContext<'_, T, S> {
    fn run(&self, subsets: Combinations) -> Tally {
        let mut tally = Tally::default();
        let mut members: Vec<&Candidate<T>> = Vec::with_capacity(self.size);

        for subset in subsets {
            tally.subsets += 1;
            if let Some(reach) = &self.reach {
                if !reach.admits(&subset, self.quota) {
                    tally.pruned += 1;
                    continue;
                }
            }

            members.clear();
            members.extend(subset.iter().map(|index| &self.pool[*index]));

            for_each_role_choice(&members, |roles| {
                tally.scored += 1;
                if let Some(score) = self
                    .scorer
                    .score(&members, roles, self.quota, self.catalog)
                    .score()
                {
                    tally.record(&subset, roles, score);
                }
            });
        }

        tally
    }

    fn shard(&self, prefix: &[usize]) -> Tally {
        self.run(Combinations::with_prefix(self.pool.len(), self.size, prefix))
    }

    /// Runs every shard, on the worker pool when parallel, and merges the tallies in shard
    /// order. `on_progress` sees the number of finished shards, counting up by one.
    fn run_shards<F>(
        &self,
        shards: &[Vec<usize>],
        options: &SearchOptions,
        on_progress: F,
    ) -> Result<Tally, SearchError>
    where
        T: Sync,
        F: FnMut(usize, usize) + Send,
    {
        let total = shards.len();
        let progress = Mutex::new((0usize, on_progress));
        let run_shard = |prefix: &Vec<usize>| {
            let tally = self.shard(prefix);
            let mut guard = progress.lock().unwrap_or_else(PoisonError::into_inner);
            let (done, report) = &mut *guard;
            *done += 1;
            report(*done, total);
            tally
        };

        let tallies: Vec<Tally> = if options.parallel {
            WorkerPool::with_workers(options.workers)
                .install(|| shards.par_iter().map(&run_shard).collect())?
        } else {
            shards.iter().map(&run_shard).collect()
        };
        Ok(tallies.into_iter().fold(Tally::default(), Tally::merge))
    }
}

/// Finds every highest-scoring composition of `pool` meeting `quota`, using the default scorer
/// and options.
pub fn search<T>(
    pool: &[Candidate<T>],
    quota: &RoleQuota,
    catalog: &RoleCatalog,
) -> Result<SearchResult<T>, SearchError>
where
    T: Clone + Sync,
{
    search_with(pool, quota, catalog, &WeightedScorer::default(), &SearchOptions::default())
}

pub fn search_with<T, S>(
    pool: &[Candidate<T>],
    quota: &RoleQuota,
    catalog: &RoleCatalog,
    scorer: &S,
    options: &SearchOptions,
) -> Result<SearchResult<T>, SearchError>
where
    T: Clone + Sync,
    S: CompositionScorer,
{
    search_with_progress(pool, quota, catalog, scorer, options, |_, _| {})
}

/// Like [search_with] but invokes `on_progress(done, total)` in shard units: once with
/// `done = 0` before any work, then after each finished shard.
pub fn search_with_progress<T, S, F>(
    pool: &[Candidate<T>],
    quota: &RoleQuota,
    catalog: &RoleCatalog,
    scorer: &S,
    options: &SearchOptions,
    mut on_progress: F,
) -> Result<SearchResult<T>, SearchError>
where
    T: Clone + Sync,
    S: CompositionScorer,
    F: FnMut(usize, usize) + Send,
{
    let context = prepare(pool, quota, catalog, scorer, options)?;

    let shards = shard_prefixes(pool.len(), context.size, SHARD_PREFIX_DEPTH);
    on_progress(0, shards.len());
    let tally = context.run_shards(&shards, options, on_progress)?;

    Ok(finish(pool, tally))
}

fn prepare<'a, T, S>(
    pool: &'a [Candidate<T>],
    quota: &'a RoleQuota,
    catalog: &'a RoleCatalog,
    scorer: &'a S,
    options: &SearchOptions,
) -> Result<SearchContext<'a, T, S>, SearchError> {
    if quota.arity() != catalog.category_count() {
        return Err(SearchError::QuotaMismatch {
            quota: quota.arity(),
            catalog: catalog.category_count(),
        });
    }
    let size = quota.total();
    if pool.len() < size {
        return Err(SearchError::InsufficientCandidates {
            required: size,
            available: pool.len(),
        });
    }
    if let Some(candidate) = pool.iter().position(|candidate| {
        candidate
            .preferences()
            .iter()
            .any(|role| !catalog.contains(*role))
    }) {
        return Err(SearchError::UnknownRole { candidate });
    }

    debug!(
        pool = pool.len(),
        team_size = size,
        search_space = %estimate_search_space(pool, size),
        parallel = options.parallel,
        prune = options.prune,
        "starting composition search"
    );

    Ok(SearchContext {
        pool,
        quota,
        catalog,
        scorer,
        reach: options.prune.then(|| CategoryReach::new(pool, catalog)),
        size,
    })
}

fn finish<T: Clone>(pool: &[Candidate<T>], tally: Tally) -> SearchResult<T> {
    let best_score = tally.best.unwrap_or(0);
    let best_assignments: Vec<Assignment<T>> = tally
        .ties
        .into_iter()
        .map(|(pool_indices, roles)| Assignment {
            members: pool_indices.iter().map(|index| pool[*index].clone()).collect(),
            pool_indices,
            roles,
            score: best_score,
        })
        .collect();

    if best_assignments.is_empty() {
        warn!(
            subsets = tally.subsets,
            scored = tally.scored,
            "no composition satisfies the quota"
        );
    } else {
        info!(
            feasible = tally.feasible,
            best_score,
            ties = best_assignments.len(),
            "composition search finished"
        );
    }

    SearchResult {
        best_score,
        best_assignments,
        total_feasible_considered: tally.feasible,
        subsets_considered: tally.subsets,
        subsets_pruned: tally.pruned,
        assignments_scored: tally.scored,
    }
}
