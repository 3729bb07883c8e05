//! Roster files: who signed up, which roles they play, and the requested composition.
//!
//! JSON and YAML rosters carry the quota (and optionally their own catalog); CSV rosters are
//! plain `token,name,roles` rows and take the quota from the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::candidate::{split_role_list, Candidate, CandidateError};
use crate::data::catalog::{CatalogError, CatalogSpec, RoleCatalog};
use crate::data::quota::{QuotaError, RoleQuota};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("unable to read roster: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid JSON roster: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML roster: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid CSV roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported roster format '{0}' (expected .json, .yaml, .yml or .csv)")]
    UnsupportedFormat(String),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("candidate '{token}': {source}")]
    Candidate {
        token: String,
        #[source]
        source: CandidateError,
    },
    #[error("invalid quota: {0}")]
    Quota(#[from] QuotaError),
}

/// Identity carried through the search as the candidate token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Member {
    pub token: String,
    pub name: String,
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleList {
    List(Vec<String>),
    /// Comma separated, the way players register jobs: `"GNB,PLD,MCH"`.
    Joined(String),
}

impl RoleList {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::List(names) => names.iter().map(|name| name.trim()).collect(),
            Self::Joined(raw) => split_role_list(raw).collect(),
        }
    }
}

impl Default for RoleList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: RoleList,
}

impl RosterEntry {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.token)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogSpec>,
    /// Category name -> requested count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<BTreeMap<String, usize>>,
    #[serde(default)]
    pub candidates: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    token: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    roles: String,
}

/// A roster resolved against a catalog, ready to search.
#[derive(Debug, Clone)]
pub struct Roster {
    pub candidates: Vec<Candidate<Member>>,
    pub quota: Option<RoleQuota>,
}

impl RosterFile {
    pub fn from_json_str(raw: &str) -> Result<Self, RosterError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, RosterError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, RosterError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut candidates = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            let row = row?;
            candidates.push(RosterEntry {
                token: row.token,
                name: row.name.filter(|name| !name.is_empty()),
                roles: RoleList::Joined(row.roles),
            });
        }
        Ok(Self {
            catalog: None,
            quota: None,
            candidates,
        })
    }

    /// The roster's own catalog if it declares one, else the built-in FFXIV job catalog.
    pub fn catalog(&self) -> Result<RoleCatalog, RosterError> {
        match &self.catalog {
            Some(spec) => Ok(RoleCatalog::from_spec(spec)?),
            None => Ok(RoleCatalog::ffxiv()),
        }
    }

    /// Strict resolution: the first unknown or repeated role aborts.
    pub fn resolve(&self, catalog: &RoleCatalog) -> Result<Roster, RosterError> {
        let candidates = self
            .candidates
            .iter()
            .map(|entry| {
                let member = Member {
                    token: entry.token.clone(),
                    name: entry.display_name().to_string(),
                };
                Candidate::from_names(member, &entry.roles.names(), catalog).map_err(|source| {
                    RosterError::Candidate {
                        token: entry.token.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let quota = self
            .quota
            .as_ref()
            .map(|named| RoleQuota::from_map(catalog, named))
            .transpose()?;

        Ok(Roster { candidates, quota })
    }
}

/// Load a roster file, choosing the format from its extension.
pub fn load_roster(path: impl AsRef<Path>) -> Result<RosterFile, RosterError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => RosterFile::from_json_str(&fs::read_to_string(path)?),
        "yaml" | "yml" => RosterFile::from_yaml_str(&fs::read_to_string(path)?),
        "csv" => RosterFile::from_csv_reader(fs::File::open(path)?),
        other => Err(RosterError::UnsupportedFormat(other.to_string())),
    }
}
