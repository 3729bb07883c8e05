use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::data::catalog::RoleCatalog;
use crate::data::roster::{load_roster, RosterError, RosterFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }
}

/// Collects every problem in a roster instead of stopping at the first, so an organiser can fix
/// sign-ups in one pass.
pub fn validate_roster(file: &RosterFile, catalog: &RoleCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_tokens = HashSet::new();

    if file.candidates.is_empty() {
        report.push(ValidationSeverity::Warning, "candidates", "roster is empty");
    }

    for (index, entry) in file.candidates.iter().enumerate() {
        let context = format!("candidates[{index}] token='{}'", entry.token);

        if entry.token.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                format!("candidates[{index}].token"),
                "missing non-empty 'token'",
            );
        } else if !seen_tokens.insert(entry.token.as_str()) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate token '{}'", entry.token),
            );
        }

        let names = entry.roles.names();
        if names.is_empty() {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.roles"),
                "no roles listed; candidate can never be selected",
            );
        }

        let mut seen_roles = HashSet::new();
        for name in names {
            match catalog.role(name) {
                Some(role) => {
                    if !seen_roles.insert(role) {
                        report.push(
                            ValidationSeverity::Error,
                            format!("{context}.roles"),
                            format!("role '{name}' listed more than once"),
                        );
                    }
                }
                None => report.push(
                    ValidationSeverity::Error,
                    format!("{context}.roles"),
                    format!("'{name}' is not a role in the catalog"),
                ),
            }
        }
    }

    match &file.quota {
        None => report.push(
            ValidationSeverity::Warning,
            "quota",
            "no quota in roster; one must be supplied when building",
        ),
        Some(quota) => {
            let mut total = 0usize;
            for (name, count) in quota {
                if catalog.category(name).is_none() {
                    report.push(
                        ValidationSeverity::Error,
                        format!("quota.{name}"),
                        format!("'{name}' is not a category in the catalog"),
                    );
                }
                total += count;
            }
            if total > file.candidates.len() {
                report.push(
                    ValidationSeverity::Error,
                    "quota",
                    format!(
                        "quota needs {total} members but only {} signed up",
                        file.candidates.len()
                    ),
                );
            }
        }
    }

    report
}

pub fn validate_roster_file(path: impl AsRef<Path>) -> Result<ValidationReport, RosterError> {
    let file = load_roster(path)?;
    let catalog = file.catalog()?;
    Ok(validate_roster(&file, &catalog))
}
