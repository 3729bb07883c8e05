//! Role catalog: the closed, ordered set of roles a composition can draw from.
//!
//! Catalog order is priority order. Roles are partitioned into categories (counted against a
//! quota) and each category into one or more groups (used by the diversity bonus).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog has no roles")]
    Empty,
    #[error("category '{0}' has no roles")]
    EmptyCategory(String),
    #[error("group '{group}' in category '{category}' has no roles")]
    EmptyGroup { category: String, group: String },
    #[error("role '{0}' appears more than once")]
    DuplicateRole(String),
    #[error("category '{0}' appears more than once")]
    DuplicateCategory(String),
    #[error("role name must not be blank")]
    BlankRole,
    #[error("catalog exceeds {0} limit")]
    TooLarge(&'static str),
}

/// Handle for a role in a [RoleCatalog]. Only the catalog hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoleId(u16);

impl RoleId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CategoryId(u8);

impl CategoryId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u8);

impl GroupId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Serializable description of a catalog, as found in roster and catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub categories: Vec<CategorySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    /// Shorthand for a category with a single group named after the category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone)]
struct RoleEntry {
    name: String,
    category: CategoryId,
    group: GroupId,
}

#[derive(Debug, Clone)]
pub struct RoleCategory {
    pub name: String,
    pub groups: Vec<RoleGroup>,
}

#[derive(Debug, Clone)]
pub struct RoleGroup {
    pub id: GroupId,
    pub name: String,
    pub roles: Vec<RoleId>,
}

impl RoleCategory {
    pub fn roles(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.groups.iter().flat_map(|group| group.roles.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<RoleEntry>,
    categories: Vec<RoleCategory>,
    // GroupId is numbered catalog-wide, not per category.
    group_count: usize,
}

impl RoleCatalog {
    pub fn from_spec(spec: &CatalogSpec) -> Result<Self, CatalogError> {
        let mut roles: Vec<RoleEntry> = Vec::new();
        let mut categories = Vec::with_capacity(spec.categories.len());
        let mut seen_roles = HashSet::new();
        let mut seen_categories = HashSet::new();
        let mut group_count = 0usize;

        for (category_index, category) in spec.categories.iter().enumerate() {
            if !seen_categories.insert(category.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.name.clone()));
            }
            if category_index > usize::from(u8::MAX) {
                return Err(CatalogError::TooLarge("category"));
            }
            let category_id = CategoryId(category_index as u8);

            let mut group_specs = category.groups.clone();
            if !category.roles.is_empty() {
                group_specs.insert(
                    0,
                    GroupSpec {
                        name: category.name.clone(),
                        roles: category.roles.clone(),
                    },
                );
            }
            if group_specs.iter().all(|group| group.roles.is_empty()) {
                return Err(CatalogError::EmptyCategory(category.name.clone()));
            }

            let mut groups = Vec::with_capacity(group_specs.len());
            for group in group_specs {
                if group.roles.is_empty() {
                    return Err(CatalogError::EmptyGroup {
                        category: category.name.clone(),
                        group: group.name,
                    });
                }
                if group_count > usize::from(u8::MAX) {
                    return Err(CatalogError::TooLarge("group"));
                }
                let group_id = GroupId(group_count as u8);
                group_count += 1;

                let mut members = Vec::with_capacity(group.roles.len());
                for name in &group.roles {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(CatalogError::BlankRole);
                    }
                    if !seen_roles.insert(name.to_string()) {
                        return Err(CatalogError::DuplicateRole(name.to_string()));
                    }
                    if roles.len() > usize::from(u16::MAX) {
                        return Err(CatalogError::TooLarge("role"));
                    }
                    let role = RoleId(roles.len() as u16);
                    roles.push(RoleEntry {
                        name: name.to_string(),
                        category: category_id,
                        group: group_id,
                    });
                    members.push(role);
                }
                groups.push(RoleGroup {
                    id: group_id,
                    name: group.name,
                    roles: members,
                });
            }

            categories.push(RoleCategory {
                name: category.name.clone(),
                groups,
            });
        }

        if roles.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self {
            roles,
            categories,
            group_count,
        })
    }

    /// The job catalog used by the FFXIV raid bot: tanks, healers, then DPS split into
    /// melee, ranged and caster.
    pub fn ffxiv() -> Self {
        // Static input; construction cannot fail.
        Self::from_spec(&ffxiv_spec()).unwrap_or_else(|err| panic!("built-in catalog: {err}"))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = RoleId> + '_ {
        (0..self.roles.len()).map(|index| RoleId(index as u16))
    }

    pub fn categories(&self) -> &[RoleCategory] {
        &self.categories
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn contains(&self, role: RoleId) -> bool {
        role.index() < self.roles.len()
    }

    /// Look up a role by name, ignoring ASCII case and surrounding whitespace.
    pub fn role(&self, name: &str) -> Option<RoleId> {
        let name = name.trim();
        self.roles
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|index| RoleId(index as u16))
    }

    pub fn category(&self, name: &str) -> Option<CategoryId> {
        let name = name.trim();
        self.categories
            .iter()
            .position(|category| category.name.eq_ignore_ascii_case(name))
            .map(|index| CategoryId(index as u8))
    }

    pub fn name(&self, role: RoleId) -> &str {
        &self.roles[role.index()].name
    }

    pub fn category_name(&self, category: CategoryId) -> &str {
        &self.categories[category.index()].name
    }

    pub fn category_of(&self, role: RoleId) -> CategoryId {
        self.roles[role.index()].category
    }

    pub fn group_of(&self, role: RoleId) -> GroupId {
        self.roles[role.index()].group
    }

    /// Position of `role` in catalog order; 0 is the highest priority.
    pub fn index_of(&self, role: RoleId) -> usize {
        role.index()
    }

    /// Catalog-wide priority weight: earlier roles weigh more, the last role weighs 1.
    pub fn weight(&self, role: RoleId) -> i64 {
        self.weight_for_rank(self.index_of(role))
    }

    /// Weight of the `rank`-th entry of a personal preference list.
    pub fn weight_for_rank(&self, rank: usize) -> i64 {
        self.roles.len() as i64 - rank as i64
    }

    pub fn to_spec(&self) -> CatalogSpec {
        CatalogSpec {
            categories: self
                .categories
                .iter()
                .map(|category| CategorySpec {
                    name: category.name.clone(),
                    roles: Vec::new(),
                    groups: category
                        .groups
                        .iter()
                        .map(|group| GroupSpec {
                            name: group.name.clone(),
                            roles: group
                                .roles
                                .iter()
                                .map(|role| self.name(*role).to_string())
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for RoleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in &self.categories {
            write!(f, "{}:", category.name)?;
            for group in &category.groups {
                let names: Vec<&str> = group.roles.iter().map(|role| self.name(*role)).collect();
                if category.groups.len() > 1 {
                    write!(f, " {}[{}]", group.name, names.join(","))?;
                } else {
                    write!(f, " {}", names.join(","))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn ffxiv_spec() -> CatalogSpec {
    fn group(name: &str, roles: &[&str]) -> GroupSpec {
        GroupSpec {
            name: name.to_string(),
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }

    CatalogSpec {
        categories: vec![
            CategorySpec {
                name: "Tank".to_string(),
                roles: Vec::new(),
                groups: vec![group("Tank", &["WAR", "PLD", "DRK", "GNB"])],
            },
            CategorySpec {
                name: "Healer".to_string(),
                roles: Vec::new(),
                groups: vec![group("Healer", &["WHM", "SCH", "AST"])],
            },
            CategorySpec {
                name: "DPS".to_string(),
                roles: Vec::new(),
                groups: vec![
                    group("Melee", &["MNK", "DRG", "NIN", "SAM"]),
                    group("Ranged", &["BRD", "MCH", "DNC"]),
                    group("Caster", &["BLM", "SMN", "RDM"]),
                ],
            },
        ],
    }
}
