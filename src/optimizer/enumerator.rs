//! Exhaustive enumeration primitives: member subsets, per-subset role choices, and the
//! admissible subset filter used to skip subsets that can never meet the quota.

use crate::data::candidate::Candidate;
use crate::data::catalog::{CategoryId, RoleCatalog, RoleId};
use crate::data::quota::RoleQuota;

/// Every `size`-element subset of `0..pool` as ascending index vectors, in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    pool: usize,
    indices: Vec<usize>,
    /// Positions below this index never move (the pinned prefix of a shard).
    fixed: usize,
    pending: bool,
}

impl Combinations {
    pub fn new(pool: usize, size: usize) -> Self {
        Self {
            pool,
            indices: (0..size).collect(),
            fixed: 0,
            pending: size <= pool,
        }
    }

    /// Only the subsets that begin with `prefix` (ascending pool indices).
    pub fn with_prefix(pool: usize, size: usize, prefix: &[usize]) -> Self {
        let fixed = prefix.len();
        let ascending = prefix.windows(2).all(|pair| pair[0] < pair[1]);
        let next = prefix.last().map_or(0, |last| last + 1);
        let pending = ascending && fixed <= size && next + (size - fixed) <= pool;
        let mut indices = prefix.to_vec();
        if pending {
            indices.extend(next..next + (size - fixed));
        }
        Self {
            pool,
            indices,
            fixed,
            pending,
        }
    }

    fn advance(&mut self) -> bool {
        let size = self.indices.len();
        let mut position = size;
        while position > self.fixed {
            position -= 1;
            if self.indices[position] < self.pool - size + position {
                self.indices[position] += 1;
                for next in position + 1..size {
                    self.indices[next] = self.indices[next - 1] + 1;
                }
                return true;
            }
        }
        false
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.pending {
            return None;
        }
        let current = self.indices.clone();
        self.pending = self.advance();
        Some(current)
    }
}

/// Work units for a sharded search: every feasible prefix of the first `min(depth, size)`
/// indices, in lexicographic order. Concatenating `with_prefix` over them yields
/// `Combinations::new(pool, size)` exactly.
pub fn shard_prefixes(pool: usize, size: usize, depth: usize) -> Vec<Vec<usize>> {
    let depth = depth.min(size);
    if size > pool {
        return Vec::new();
    }
    Combinations::new(pool - (size - depth), depth).collect()
}

/// Calls `visit` once per way of giving each member one of their own preferred roles.
/// The last member's choice varies fastest. Any member without preferences yields nothing.
pub fn for_each_role_choice<T, F>(members: &[&Candidate<T>], mut visit: F)
where
    F: FnMut(&[RoleId]),
{
    if members.iter().any(|member| member.preferences().is_empty()) {
        return;
    }

    let mut cursor = vec![0usize; members.len()];
    let mut roles: Vec<RoleId> = members
        .iter()
        .map(|member| member.preferences()[0])
        .collect();

    loop {
        visit(&roles);

        let mut position = members.len();
        loop {
            if position == 0 {
                return;
            }
            position -= 1;
            let preferences = members[position].preferences();
            cursor[position] += 1;
            if cursor[position] < preferences.len() {
                roles[position] = preferences[cursor[position]];
                break;
            }
            cursor[position] = 0;
            roles[position] = preferences[0];
        }
    }
}

/// Per-candidate category reach, for rejecting subsets before expanding their role choices.
#[derive(Debug, Clone)]
pub struct CategoryReach {
    categories: Vec<Vec<CategoryId>>,
    category_count: usize,
}

impl CategoryReach {
    pub fn new<T>(pool: &[Candidate<T>], catalog: &RoleCatalog) -> Self {
        let categories = pool
            .iter()
            .map(|candidate| {
                let mut reach: Vec<CategoryId> = candidate
                    .preferences()
                    .iter()
                    .map(|role| catalog.category_of(*role))
                    .collect();
                reach.sort_unstable();
                reach.dedup();
                reach
            })
            .collect();
        Self {
            categories,
            category_count: catalog.category_count(),
        }
    }

    /// False only when no role choice for `subset` can meet the quota: some category has fewer
    /// members able to play it than required, or more members who can play nothing else.
    pub fn admits(&self, subset: &[usize], quota: &RoleQuota) -> bool {
        let mut able = vec![0usize; self.category_count];
        let mut bound = vec![0usize; self.category_count];
        for &index in subset {
            let reach = &self.categories[index];
            match reach.as_slice() {
                [] => return false,
                [only] => bound[only.index()] += 1,
                _ => {}
            }
            for category in reach {
                able[category.index()] += 1;
            }
        }
        quota
            .counts()
            .iter()
            .enumerate()
            .all(|(category, &required)| able[category] >= required && bound[category] <= required)
    }
}

/// Number of (subset, role choice) pairs an unpruned search scores: the elementary symmetric
/// polynomial of degree `size` over the preference-list lengths. Saturates at `u128::MAX`.
pub fn estimate_search_space<T>(pool: &[Candidate<T>], size: usize) -> u128 {
    if size > pool.len() {
        return 0;
    }
    let mut totals = vec![0u128; size + 1];
    totals[0] = 1;
    for candidate in pool {
        let options = candidate.preferences().len() as u128;
        for degree in (1..=size).rev() {
            totals[degree] = totals[degree].saturating_add(totals[degree - 1].saturating_mul(options));
        }
    }
    totals[size]
}
