//! Requirement checking
//!
//! Requirement sources are registered when the checker is built. Every call
//! to [`RequirementChecker::check`] evaluates them again and produces one
//! report per category, always in the same order.

pub mod host;

pub use host::{DeskRequirements, HostRequirements};

use crate::core::InstallError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requirement categories, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementCategory {
    Mandatory,
    Environment,
    Platform,
    Domain,
    Recommendations,
}

impl RequirementCategory {
    pub const ALL: [RequirementCategory; 5] = [
        RequirementCategory::Mandatory,
        RequirementCategory::Environment,
        RequirementCategory::Platform,
        RequirementCategory::Domain,
        RequirementCategory::Recommendations,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RequirementCategory::Mandatory => "Mandatory requirements",
            RequirementCategory::Environment => "Environment settings",
            RequirementCategory::Platform => "Platform specific requirements",
            RequirementCategory::Domain => "DiamanteDesk requirements",
            RequirementCategory::Recommendations => "Optional recommendations",
        }
    }
}

impl fmt::Display for RequirementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single evaluated requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// What was checked
    pub name: String,

    pub fulfilled: bool,

    /// Optional requirements only warn when unmet
    pub optional: bool,

    /// How to fix it when unmet
    pub help: String,
}

impl Requirement {
    pub fn mandatory(name: impl Into<String>, fulfilled: bool, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fulfilled,
            optional: false,
            help: help.into(),
        }
    }

    pub fn optional(name: impl Into<String>, fulfilled: bool, help: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::mandatory(name, fulfilled, help)
        }
    }
}

/// A set of requirements, grouped by category
pub trait RequirementSource: Send + Sync {
    /// Evaluate the requirements this source contributes to `category`
    fn requirements(&self, category: RequirementCategory) -> Vec<Requirement>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of one requirement in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

/// Checks of one category; never mutated once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementReport {
    pub category: RequirementCategory,
    checks: Vec<RequirementCheck>,
}

impl RequirementReport {
    fn new(category: RequirementCategory, requirements: Vec<Requirement>) -> Self {
        let checks = requirements
            .into_iter()
            .map(|req| {
                let optional = req.optional || category == RequirementCategory::Recommendations;
                let status = match (req.fulfilled, optional) {
                    (true, _) => CheckStatus::Pass,
                    (false, true) => CheckStatus::Warn,
                    (false, false) => CheckStatus::Fail,
                };
                let message = if req.fulfilled { String::from("OK") } else { req.help };
                RequirementCheck {
                    name: req.name,
                    status,
                    message,
                }
            })
            .collect();

        Self { category, checks }
    }

    pub fn checks(&self) -> &[RequirementCheck] {
        &self.checks
    }

    pub fn failures(&self) -> impl Iterator<Item = &RequirementCheck> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Outcome of a full requirement check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementCheckResult {
    pub reports: Vec<RequirementReport>,
}

impl RequirementCheckResult {
    /// Names of all failed mandatory requirements, across categories
    pub fn failed_requirements(&self) -> Vec<String> {
        self.reports
            .iter()
            .flat_map(|r| r.failures())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Fatal error when any mandatory requirement is unmet
    pub fn ensure_fulfilled(&self) -> Result<(), InstallError> {
        let failed = self.failed_requirements();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(InstallError::RequirementsNotMet { failed })
        }
    }
}

/// Evaluates all registered requirement sources
#[derive(Default)]
pub struct RequirementChecker {
    sources: Vec<Box<dyn RequirementSource>>,
}

impl RequirementChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<S: RequirementSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Evaluate every category; fatality is left to the caller
    pub fn check(&self) -> RequirementCheckResult {
        let reports = RequirementCategory::ALL
            .iter()
            .map(|category| {
                let requirements = self
                    .sources
                    .iter()
                    .flat_map(|source| source.requirements(*category))
                    .collect();
                RequirementReport::new(*category, requirements)
            })
            .collect();

        RequirementCheckResult { reports }
    }
}
