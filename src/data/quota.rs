use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::data::catalog::{CategoryId, RoleCatalog};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("'{0}' is not a category in the catalog")]
    UnknownCategory(String),
    #[error("expected {expected} counts (one per category), got {actual}")]
    WrongArity { expected: usize, actual: usize },
    #[error("invalid count '{0}'")]
    InvalidCount(String),
}

/// Requested number of filled slots per category, indexed by [CategoryId].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleQuota {
    counts: Vec<usize>,
}

impl RoleQuota {
    /// Counts in catalog category order, e.g. `[2, 2, 4]` for tank/healer/DPS.
    pub fn from_counts(counts: Vec<usize>) -> Self {
        Self { counts }
    }

    /// Builds a quota from category names; categories not mentioned get 0.
    pub fn from_named<'a, I>(catalog: &RoleCatalog, named: I) -> Result<Self, QuotaError>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let mut counts = vec![0; catalog.category_count()];
        for (name, count) in named {
            let category = catalog
                .category(name)
                .ok_or_else(|| QuotaError::UnknownCategory(name.to_string()))?;
            counts[category.index()] = count;
        }
        Ok(Self { counts })
    }

    pub fn from_map(
        catalog: &RoleCatalog,
        named: &BTreeMap<String, usize>,
    ) -> Result<Self, QuotaError> {
        Self::from_named(catalog, named.iter().map(|(name, count)| (name.as_str(), *count)))
    }

    /// Parses `"2,2,4"` into counts for each catalog category, in order.
    pub fn parse(raw: &str, catalog: &RoleCatalog) -> Result<Self, QuotaError> {
        let counts = raw
            .split(',')
            .map(str::trim)
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| QuotaError::InvalidCount(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if counts.len() != catalog.category_count() {
            return Err(QuotaError::WrongArity {
                expected: catalog.category_count(),
                actual: counts.len(),
            });
        }
        Ok(Self { counts })
    }

    pub fn count(&self, category: CategoryId) -> usize {
        self.counts.get(category.index()).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn arity(&self) -> usize {
        self.counts.len()
    }

    /// Total team size.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matches_catalog_order() {
        let catalog = RoleCatalog::ffxiv();
        let quota = RoleQuota::parse("2, 2,4", &catalog).unwrap();
        assert_eq!(quota.counts(), &[2, 2, 4]);
        assert_eq!(quota.total(), 8);
        assert_eq!(quota.count(catalog.category("dps").unwrap()), 4);
    }

    #[test]
    fn parse_rejects_wrong_arity_and_garbage() {
        let catalog = RoleCatalog::ffxiv();
        assert_eq!(
            RoleQuota::parse("1,1", &catalog),
            Err(QuotaError::WrongArity { expected: 3, actual: 2 })
        );
        assert_eq!(
            RoleQuota::parse("1,x,2", &catalog),
            Err(QuotaError::InvalidCount("x".to_string()))
        );
    }

    #[test]
    fn named_quota_fills_missing_categories_with_zero() {
        let catalog = RoleCatalog::ffxiv();
        let quota = RoleQuota::from_named(&catalog, [("Tank", 1), ("DPS", 3)]).unwrap();
        assert_eq!(quota.counts(), &[1, 0, 3]);
        assert!(matches!(
            RoleQuota::from_named(&catalog, [("Support", 1)]),
            Err(QuotaError::UnknownCategory(_))
        ));
    }
}
