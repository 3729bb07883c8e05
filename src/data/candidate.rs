use serde::Serialize;
use thiserror::Error;

use crate::data::catalog::{RoleCatalog, RoleId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("role '{0}' is listed more than once")]
    DuplicateRole(String),
    #[error("'{0}' is not a role in the catalog")]
    UnknownRole(String),
}

/// A prospective member: an opaque token plus the roles they will play, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate<T> {
    pub token: T,
    preferences: Vec<RoleId>,
}

impl<T> Candidate<T> {
    /// Builds a candidate from catalog role ids. A repeated role is rejected; an empty list is
    /// allowed and simply never yields an assignment.
    pub fn new(
        token: T,
        preferences: Vec<RoleId>,
        catalog: &RoleCatalog,
    ) -> Result<Self, CandidateError> {
        for (index, role) in preferences.iter().enumerate() {
            if !catalog.contains(*role) {
                return Err(CandidateError::UnknownRole(format!("#{}", role.index())));
            }
            if preferences[..index].contains(role) {
                return Err(CandidateError::DuplicateRole(catalog.name(*role).to_string()));
            }
        }
        Ok(Self { token, preferences })
    }

    /// Builds a candidate from role names, e.g. `["GNB", "PLD", "MCH"]`.
    pub fn from_names<S: AsRef<str>>(
        token: T,
        names: &[S],
        catalog: &RoleCatalog,
    ) -> Result<Self, CandidateError> {
        let preferences = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                catalog
                    .role(name)
                    .ok_or_else(|| CandidateError::UnknownRole(name.trim().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(token, preferences, catalog)
    }

    /// Builds a candidate from a comma separated job string such as `"GNB,PLD,MCH"`.
    pub fn parse(token: T, jobs: &str, catalog: &RoleCatalog) -> Result<Self, CandidateError> {
        let names: Vec<&str> = split_role_list(jobs).collect();
        Self::from_names(token, &names, catalog)
    }

    pub fn preferences(&self) -> &[RoleId] {
        &self.preferences
    }

    /// Zero-based position of `role` in this candidate's preferences.
    pub fn rank_of(&self, role: RoleId) -> Option<usize> {
        self.preferences.iter().position(|candidate| *candidate == role)
    }

    pub fn can_play(&self, role: RoleId) -> bool {
        self.preferences.contains(&role)
    }
}

/// Splits a comma separated role list, skipping blank entries.
pub fn split_role_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}
