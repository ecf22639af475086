//! Command-line interface

pub mod output;

use crate::core::{config::InstallerConfig, PlanOptions};
use crate::options::{validators, InputOptions};
use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Install DiamanteDesk bundles
#[derive(Debug, Parser, Clone)]
#[command(name = "desk-install")]
#[command(author = "Desk Installer Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Install DiamanteDesk bundles", long_about = None)]
pub struct Cli {
    /// Application URL
    #[arg(long)]
    pub application_url: Option<String>,

    /// Organization name
    #[arg(long, value_parser = validators::parse_organization_name)]
    pub organization_name: Option<String>,

    /// User name
    #[arg(long)]
    pub user_name: Option<String>,

    /// User email
    #[arg(long, value_parser = validators::parse_email)]
    pub user_email: Option<String>,

    /// User first name
    #[arg(long)]
    pub user_firstname: Option<String>,

    /// User last name
    #[arg(long)]
    pub user_lastname: Option<String>,

    /// User password
    #[arg(long, value_parser = validators::parse_password)]
    pub user_password: Option<String>,

    /// Timeout for child command execution in seconds (0 disables it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Install assets as symlinks
    #[arg(long)]
    pub symlink: bool,

    /// Run every sub-command without process isolation
    #[arg(long)]
    pub no_isolation: bool,

    /// Application environment
    #[arg(long)]
    pub env: Option<String>,

    /// Console program used to run sub-commands
    #[arg(long)]
    pub console: Option<String>,

    /// Application root directory
    #[arg(long)]
    pub app_root: Option<PathBuf>,

    /// Path to the configuration database
    #[arg(long)]
    pub config_db: Option<PathBuf>,

    /// Path to installer configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not ask any interactive question
    #[arg(short = 'n', long)]
    pub no_interaction: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Setting values given on the command line, keyed by flag name
    pub fn input_options(&self) -> InputOptions {
        let mut inputs = InputOptions::new();
        inputs.set_opt("application-url", self.application_url.as_ref());
        inputs.set_opt("organization-name", self.organization_name.as_ref());
        inputs.set_opt("user-name", self.user_name.as_ref());
        inputs.set_opt("user-email", self.user_email.as_ref());
        inputs.set_opt("user-firstname", self.user_firstname.as_ref());
        inputs.set_opt("user-lastname", self.user_lastname.as_ref());
        inputs.set_opt("user-password", self.user_password.as_ref());
        inputs
    }

    /// Installer configuration: defaults, then the config file, then flags
    pub fn installer_config(&self) -> Result<InstallerConfig> {
        let mut config = match &self.config {
            Some(path) => InstallerConfig::from_file(path)
                .with_context(|| format!("Failed to load installer config {}", path.display()))?,
            None => InstallerConfig::default(),
        };

        if let Some(console) = &self.console {
            config.console = console.clone();
        }
        if let Some(app_root) = &self.app_root {
            config.app_root = app_root.clone();
        }
        if let Some(env) = &self.env {
            config.env = env.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(config_db) = &self.config_db {
            config.config_db = Some(config_db.clone());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn plan_options(&self, config: &InstallerConfig) -> PlanOptions {
        PlanOptions {
            process_isolation: !self.no_isolation,
            symlink: self.symlink,
            ..PlanOptions::from_config(config)
        }
    }

    pub fn interactive(&self) -> bool {
        !self.no_interaction
    }
}
