//! Built-in requirement sets for the host and the desk application

use crate::requirements::{Requirement, RequirementCategory, RequirementSource};
use std::env;
use std::path::{Path, PathBuf};

/// Whether `program` can be found on `PATH`
pub fn on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

fn is_writable_dir(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false)
}

/// Writable, or missing with a writable parent
fn is_writable_or_creatable(path: &Path) -> bool {
    if path.exists() {
        return is_writable_dir(path);
    }
    path.parent().map(is_writable_dir).unwrap_or(false)
}

/// Requirements on the machine running the installer
#[derive(Debug, Clone)]
pub struct HostRequirements {
    app_root: PathBuf,
    console: String,
}

impl HostRequirements {
    pub fn new(app_root: impl Into<PathBuf>, console: impl Into<String>) -> Self {
        Self {
            app_root: app_root.into(),
            console: console.into(),
        }
    }

    fn console_available(&self) -> bool {
        if self.console.contains(std::path::MAIN_SEPARATOR) {
            self.app_root.join(&self.console).is_file() || Path::new(&self.console).is_file()
        } else {
            on_path(&self.console)
        }
    }
}

impl RequirementSource for HostRequirements {
    fn requirements(&self, category: RequirementCategory) -> Vec<Requirement> {
        match category {
            RequirementCategory::Mandatory => vec![
                Requirement::mandatory(
                    "Application root directory exists",
                    self.app_root.is_dir(),
                    format!("Create {} or pass --app-root", self.app_root.display()),
                ),
                Requirement::mandatory(
                    "Application root directory is writable",
                    is_writable_dir(&self.app_root),
                    format!("Change the permissions of {}", self.app_root.display()),
                ),
                Requirement::mandatory(
                    format!("Console program {} is available", self.console),
                    self.console_available(),
                    "Install the application or pass --console",
                ),
            ],
            RequirementCategory::Environment => vec![
                Requirement::mandatory(
                    "Temporary directory is writable",
                    is_writable_dir(&env::temp_dir()),
                    format!("Make {} writable or set TMPDIR", env::temp_dir().display()),
                ),
                Requirement::optional(
                    "LANG is set",
                    env::var_os("LANG").is_some_and(|v| !v.is_empty()),
                    "Set LANG, e.g. LANG=en_US.UTF-8",
                ),
            ],
            RequirementCategory::Platform => vec![
                Requirement::mandatory(
                    format!("Operating system family {} is supported", env::consts::FAMILY),
                    cfg!(any(unix, windows)),
                    "Run the installer on a unix or windows host",
                ),
                Requirement::optional(
                    "64-bit architecture",
                    cfg!(target_pointer_width = "64"),
                    "A 64-bit host is recommended",
                ),
            ],
            RequirementCategory::Domain => Vec::new(),
            RequirementCategory::Recommendations => vec![
                Requirement::optional(
                    "git is available",
                    on_path("git"),
                    "Install git to manage application updates",
                ),
                Requirement::optional(
                    "At least 2 CPUs",
                    std::thread::available_parallelism()
                        .map(|n| n.get() >= 2)
                        .unwrap_or(false),
                    "Asset compilation is slow on a single CPU",
                ),
            ],
        }
    }
}

/// Requirements of the desk application itself
#[derive(Debug, Clone)]
pub struct DeskRequirements {
    app_root: PathBuf,
}

impl DeskRequirements {
    /// Directories the installation writes into
    pub const WRITABLE_DIRS: [&'static str; 2] = ["web", "var"];

    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }
}

impl RequirementSource for DeskRequirements {
    fn requirements(&self, category: RequirementCategory) -> Vec<Requirement> {
        if category != RequirementCategory::Domain {
            return Vec::new();
        }

        Self::WRITABLE_DIRS
            .iter()
            .map(|dir| {
                let path = self.app_root.join(dir);
                Requirement::mandatory(
                    format!("{}/ directory is writable", dir),
                    is_writable_or_creatable(&path),
                    format!("Change the permissions of {}", path.display()),
                )
            })
            .collect()
    }
}
