//! desk-installer - installation orchestrator for the desk application

pub mod cli;
pub mod core;
pub mod execution;
pub mod options;
pub mod persistence;
pub mod requirements;

// Re-export commonly used types
pub use core::{InstallError, InstallPhase, InstallPlan, RunState, Step, FATAL_EXIT_CODE};
pub use execution::{CommandExecutor, CommandRunner, InstallEngine, InstallEvent, InstallOutcome, InstallRequest};
pub use options::{InputOptions, OptionResolver, Prompter};
pub use persistence::{ConfigStore, InMemoryConfigStore};
pub use requirements::{RequirementChecker, RequirementSource};
