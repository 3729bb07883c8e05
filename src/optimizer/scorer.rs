use serde::{Deserialize, Serialize};

use crate::data::candidate::Candidate;
use crate::data::catalog::{RoleCatalog, RoleId};
use crate::data::quota::RoleQuota;

/// Outcome of scoring one proposed composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "score")]
pub enum Evaluation {
    /// Category counts do not match the quota.
    Infeasible,
    Feasible(i64),
}

impl Evaluation {
    pub fn score(self) -> Option<i64> {
        match self {
            Self::Infeasible => None,
            Self::Feasible(score) => Some(score),
        }
    }

    pub fn is_feasible(self) -> bool {
        matches!(self, Self::Feasible(_))
    }
}

/// Tunable constants of [WeightedScorer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Subtracted once for every repeat of a role already taken by another member.
    pub duplicate_penalty: i64,
    /// Added when a multi-group category draws from at least two of its groups.
    pub mixed_diversity_bonus: i64,
    /// Added instead when every group (three or more) of a category is drawn.
    pub full_diversity_bonus: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            duplicate_penalty: 10,
            mixed_diversity_bonus: 3,
            full_diversity_bonus: 5,
        }
    }
}

/// Scores a proposed composition: `members[i]` plays `roles[i]`.
pub trait CompositionScorer: Sync {
    fn score<T>(
        &self,
        members: &[&Candidate<T>],
        roles: &[RoleId],
        quota: &RoleQuota,
        catalog: &RoleCatalog,
    ) -> Evaluation;
}

/// Default scorer: quota gate, personal priority weights, duplicate penalty, diversity bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedScorer {
    pub weights: ScoringWeights,
}

impl WeightedScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

impl CompositionScorer for WeightedScorer {
    fn score<T>(
        &self,
        members: &[&Candidate<T>],
        roles: &[RoleId],
        quota: &RoleQuota,
        catalog: &RoleCatalog,
    ) -> Evaluation {
        if !meets_quota(roles, quota, catalog) {
            return Evaluation::Infeasible;
        }

        let mut score: i64 = members
            .iter()
            .zip(roles)
            .map(|(member, role)| match member.rank_of(*role) {
                Some(rank) => catalog.weight_for_rank(rank),
                // Off-list roles get the weight of a rank past the end of the catalog.
                None => catalog.weight_for_rank(catalog.len()),
            })
            .sum();

        let repeats = roles
            .iter()
            .enumerate()
            .filter(|(index, role)| roles[..*index].contains(role))
            .count() as i64;
        score -= repeats * self.weights.duplicate_penalty;

        score += diversity_bonus(roles, catalog, &self.weights);

        Evaluation::Feasible(score)
    }
}

/// True when the per-category counts of `roles` equal the quota exactly.
pub fn meets_quota(roles: &[RoleId], quota: &RoleQuota, catalog: &RoleCatalog) -> bool {
    if quota.arity() != catalog.category_count() {
        return false;
    }
    let mut counts = vec![0usize; catalog.category_count()];
    for role in roles {
        counts[catalog.category_of(*role).index()] += 1;
    }
    counts.as_slice() == quota.counts()
}

fn diversity_bonus(roles: &[RoleId], catalog: &RoleCatalog, weights: &ScoringWeights) -> i64 {
    let mut drawn = vec![false; catalog.group_count()];
    for role in roles {
        drawn[catalog.group_of(*role).index()] = true;
    }

    let mut bonus = 0;
    for category in catalog.categories() {
        let group_total = category.groups.len();
        if group_total < 2 {
            continue;
        }
        let distinct = category
            .groups
            .iter()
            .filter(|group| drawn[group.id.index()])
            .count();
        if group_total >= 3 && distinct == group_total {
            bonus += weights.full_diversity_bonus;
        } else if distinct >= 2 {
            bonus += weights.mixed_diversity_bonus;
        }
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(catalog: &RoleCatalog, jobs: &str) -> Candidate<&'static str> {
        Candidate::parse("x", jobs, catalog).unwrap()
    }

    fn roles(catalog: &RoleCatalog, names: &[&str]) -> Vec<RoleId> {
        names.iter().map(|name| catalog.role(name).unwrap()).collect()
    }

    #[test]
    fn quota_mismatch_is_infeasible() {
        let catalog = RoleCatalog::ffxiv();
        let quota = RoleQuota::from_counts(vec![1, 1, 0]);
        let a = candidate(&catalog, "WAR");
        let b = candidate(&catalog, "PLD");
        let evaluation = WeightedScorer::default().score(
            &[&a, &b],
            &roles(&catalog, &["WAR", "PLD"]),
            &quota,
            &catalog,
        );
        assert_eq!(evaluation, Evaluation::Infeasible);
    }

    #[test]
    fn priority_uses_personal_rank() {
        let catalog = RoleCatalog::ffxiv();
        let quota = RoleQuota::from_counts(vec![1, 1, 0]);
        let tank = candidate(&catalog, "DRK,GNB");
        let healer = candidate(&catalog, "BRD,WHM");

        // GNB is rank 1 for the tank, WHM rank 1 for the healer: 16 + 16.
        let evaluation = WeightedScorer::default().score(
            &[&tank, &healer],
            &roles(&catalog, &["GNB", "WHM"]),
            &quota,
            &catalog,
        );
        assert_eq!(evaluation, Evaluation::Feasible(32));
    }

    #[test]
    fn each_repeat_is_penalised() {
        let catalog = RoleCatalog::ffxiv();
        let quota = RoleQuota::from_counts(vec![3, 0, 0]);
        let member = candidate(&catalog, "WAR");
        let evaluation = WeightedScorer::default().score(
            &[&member, &member, &member],
            &roles(&catalog, &["WAR", "WAR", "WAR"]),
            &quota,
            &catalog,
        );
        assert_eq!(evaluation, Evaluation::Feasible(17 * 3 - 20));
    }

    #[test]
    fn diversity_bonus_is_not_cumulative() {
        let catalog = RoleCatalog::ffxiv();
        let scorer = WeightedScorer::default();

        let two = RoleQuota::from_counts(vec![0, 0, 2]);
        let melee = candidate(&catalog, "MNK");
        let ranged = candidate(&catalog, "BRD");
        let caster = candidate(&catalog, "BLM");
        assert_eq!(
            scorer.score(&[&melee, &ranged], &roles(&catalog, &["MNK", "BRD"]), &two, &catalog),
            Evaluation::Feasible(17 + 17 + 3)
        );

        let three = RoleQuota::from_counts(vec![0, 0, 3]);
        assert_eq!(
            scorer.score(
                &[&melee, &ranged, &caster],
                &roles(&catalog, &["MNK", "BRD", "BLM"]),
                &three,
                &catalog
            ),
            Evaluation::Feasible(17 * 3 + 5)
        );

        let same_group = candidate(&catalog, "DRG");
        assert_eq!(
            scorer.score(&[&melee, &same_group], &roles(&catalog, &["MNK", "DRG"]), &two, &catalog),
            Evaluation::Feasible(34)
        );
    }

    #[test]
    fn custom_weights_apply() {
        let catalog = RoleCatalog::ffxiv();
        let scorer = WeightedScorer::new(ScoringWeights {
            duplicate_penalty: 100,
            mixed_diversity_bonus: 0,
            full_diversity_bonus: 0,
        });
        let quota = RoleQuota::from_counts(vec![0, 0, 2]);
        let member = candidate(&catalog, "MNK");
        assert_eq!(
            scorer.score(&[&member, &member], &roles(&catalog, &["MNK", "MNK"]), &quota, &catalog),
            Evaluation::Feasible(34 - 100)
        );
    }

    #[test]
    fn scoring_is_pure() {
        let catalog = RoleCatalog::ffxiv();
        let quota = RoleQuota::from_counts(vec![1, 0, 1]);
        let a = candidate(&catalog, "PLD,WAR");
        let b = candidate(&catalog, "SAM,BLM");
        let picked = roles(&catalog, &["WAR", "BLM"]);
        let scorer = WeightedScorer::default();
        let first = scorer.score(&[&a, &b], &picked, &quota, &catalog);
        let second = scorer.score(&[&a, &b], &picked, &quota, &catalog);
        assert_eq!(first, second);
        assert!(first.is_feasible());
    }
}
