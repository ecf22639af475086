//! Installer configuration from YAML

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for child command execution, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Runtime settings of the installer itself
///
/// Every field is optional in the YAML file; missing fields keep their
/// built-in defaults and command-line flags override both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Console program used to dispatch sub-commands
    pub console: String,

    /// Application root; sub-commands run with this working directory
    pub app_root: PathBuf,

    /// Application environment passed to every sub-command
    pub env: String,

    /// Default timeout for sub-commands in seconds (0 disables it)
    pub timeout_secs: u64,

    /// Location of the persisted configuration database
    pub config_db: Option<PathBuf>,

    /// Bundles excluded from schema migrations
    pub migration_excludes: Vec<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            console: "bin/console".to_string(),
            app_root: PathBuf::from("."),
            env: "prod".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            config_db: None,
            migration_excludes: vec![
                "DiamanteEmbeddedFormBundle".to_string(),
                "DiamanteDeskBundle".to_string(),
            ],
        }
    }
}

impl InstallerConfig {
    /// Load installer configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse installer configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: InstallerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the installer configuration
    pub fn validate(&self) -> Result<()> {
        if self.console.trim().is_empty() {
            anyhow::bail!("Console program must not be empty");
        }
        if self.env.trim().is_empty() {
            anyhow::bail!("Environment must not be empty");
        }
        if self.app_root.as_os_str().is_empty() {
            anyhow::bail!("Application root must not be empty");
        }
        Ok(())
    }

    /// Default timeout for sub-commands, `None` when disabled
    pub fn default_timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Location of the configuration database, falling back to the user data dir
    pub fn config_db_path(&self) -> PathBuf {
        self.config_db.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("desk-installer")
                .join("config.db")
        })
    }
}
