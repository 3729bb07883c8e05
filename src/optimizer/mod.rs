pub mod enumerator;
pub mod report;
pub mod rng;
pub mod scorer;
pub mod search;

pub use enumerator::estimate_search_space;
pub use report::{build_report, lineup_table, SearchReport, TieChoice};
pub use scorer::{CompositionScorer, Evaluation, ScoringWeights, WeightedScorer};
pub use search::{
    search, search_with, search_with_progress, Assignment, SearchError, SearchOptions,
    SearchResult,
};

use crate::config::RaidcompConfig;
use crate::data::quota::RoleQuota;
use crate::data::roster::{Member, Roster};
use crate::data::catalog::RoleCatalog;

/// Runs a resolved roster through the search with the scorer and options from `config`.
pub fn optimize_roster(
    roster: &Roster,
    quota: &RoleQuota,
    catalog: &RoleCatalog,
    config: &RaidcompConfig,
) -> Result<SearchResult<Member>, SearchError> {
    search_with(
        &roster.candidates,
        quota,
        catalog,
        &WeightedScorer::new(config.scoring),
        &config.search,
    )
}
