//! Install plan - the fixed, hand-ordered step sequence

use crate::core::{config::InstallerConfig, step::Step};
use std::time::Duration;

/// Options that shape the generated steps
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Whether isolated steps really run isolated
    pub process_isolation: bool,

    /// Install assets as symlinks instead of copies
    pub symlink: bool,

    /// Default timeout forwarded to the migration command
    pub default_timeout: Option<Duration>,

    /// Bundles excluded from schema migrations
    pub migration_excludes: Vec<String>,
}

impl PlanOptions {
    pub fn from_config(config: &InstallerConfig) -> Self {
        Self {
            process_isolation: true,
            symlink: false,
            default_timeout: config.default_timeout(),
            migration_excludes: config.migration_excludes.clone(),
        }
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::from_config(&InstallerConfig::default())
    }
}

/// Steps of every phase of an installation run
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub schema_load: Vec<Step>,
    pub data_load: Vec<Step>,
    pub finalize: Vec<Step>,
    pub auxiliary: Vec<Step>,
}

impl InstallPlan {
    /// Build the standard plan
    pub fn standard(options: &PlanOptions) -> Self {
        let isolated = |step: Step| step.with_isolation(options.process_isolation);

        let timeout_secs = options
            .default_timeout
            .map(|t| t.as_secs())
            .unwrap_or(0)
            .to_string();

        let schema_load = vec![
            isolated(
                Step::new("oro:migration:load")
                    .param("--force", true)
                    .param("--timeout", timeout_secs)
                    .param("--exclude", options.migration_excludes.clone()),
            ),
            isolated(Step::new("oro:workflow:definitions:load")),
            isolated(Step::new("oro:process:configuration:load")),
        ];

        let data_load = vec![isolated(
            Step::new("oro:migration:data:load").param("--no-interaction", true),
        )];

        let finalize = vec![
            isolated(Step::new("oro:navigation:init")),
            isolated(Step::new("fos:js-routing:dump").param("--target", "web/js/routes.js")),
            Step::new("oro:localization:dump"),
            isolated(Step::new("oro:translation:dump")),
            isolated(Step::new("oro:requirejs:build").param("--ignore-errors", true)),
        ];

        let auxiliary = vec![
            Step::new("cache:clear"),
            Step::new("diamante:desk:install"),
            Step::new("diamante:user:install"),
            Step::new("diamante:embeddedform:install"),
            Step::new("assets:install")
                .param("--exclude", vec!["OroInstallerBundle"])
                .param("--symlink", options.symlink),
            isolated(Step::new("assetic:dump")),
        ];

        Self {
            schema_load,
            data_load,
            finalize,
            auxiliary,
        }
    }

    /// Replace the auxiliary commands
    pub fn with_auxiliary(mut self, steps: Vec<Step>) -> Self {
        self.auxiliary = steps;
        self
    }

    /// All steps of the critical chain, in execution order
    pub fn critical_chain(&self) -> impl Iterator<Item = &Step> {
        self.schema_load
            .iter()
            .chain(self.data_load.iter())
            .chain(self.finalize.iter())
    }

    pub fn total_steps(&self) -> usize {
        self.schema_load.len() + self.data_load.len() + self.finalize.len() + self.auxiliary.len()
    }
}
