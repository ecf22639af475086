//! Error types for the installation pipeline

use thiserror::Error;

/// Exit code reported when the pipeline ends in the failed state
pub const FATAL_EXIT_CODE: i32 = 255;

/// Failure of a single dispatched sub-command
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command {command} failed: {message}")]
    Failed { command: String, message: String },

    #[error("Command {command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("Command {command} could not be started: {message}")]
    Spawn { command: String, message: String },
}

impl CommandError {
    /// Name of the command that failed
    pub fn command(&self) -> &str {
        match self {
            CommandError::Failed { command, .. }
            | CommandError::Timeout { command, .. }
            | CommandError::Spawn { command, .. } => command,
        }
    }
}

/// Rejection raised by an option validator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure to produce a value for a named option
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid value for {option}: {source}")]
    Invalid {
        option: String,
        #[source]
        source: ValidationError,
    },

    #[error("Unable to ask for {option}: {message}")]
    Prompt { option: String, message: String },
}

/// Failure of the persisted configuration store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigStoreError {
    #[error("Failed to read configuration value {key}: {message}")]
    Read { key: String, message: String },

    #[error("Failed to save configuration: {0}")]
    Flush(String),
}

/// Fatal error that aborts the installation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstallError {
    #[error("Some system requirements are not fulfilled. Please check output messages and fix them.")]
    RequirementsNotMet { failed: Vec<String> },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Option(#[from] ResolveError),

    #[error(transparent)]
    ConfigStore(#[from] ConfigStoreError),
}
