//! Interactive prompt surface

use crate::cli::output::{style, CROSS};
use inquire::{Password, Text};
use thiserror::Error;

/// The interactive surface could not produce an answer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PromptError(pub String);

impl From<inquire::InquireError> for PromptError {
    fn from(err: inquire::InquireError) -> Self {
        PromptError(err.to_string())
    }
}

/// Asks the operator for values
pub trait Prompter: Send + Sync {
    /// Ask for a value; an empty answer yields `default` when one is given
    fn ask(&self, label: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Ask for a value without echoing it
    fn ask_hidden(&self, label: &str) -> Result<String, PromptError> {
        self.ask(label, None)
    }

    /// Tell the operator why the last answer was rejected
    fn report_invalid(&self, _message: &str) {}
}

/// Terminal prompter backed by `inquire`
#[derive(Debug, Clone, Copy, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&self, label: &str, default: Option<&str>) -> Result<String, PromptError> {
        let mut prompt = Text::new(label);
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            prompt = prompt.with_default(default);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_hidden(&self, label: &str) -> Result<String, PromptError> {
        Ok(Password::new(label)
            .without_confirmation()
            .with_help_message("Leave empty to keep the current value")
            .prompt()?)
    }

    fn report_invalid(&self, message: &str) {
        eprintln!("{}{}", CROSS, style(message).red());
    }
}

/// Prompter for non-interactive runs; every question fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn ask(&self, label: &str, _default: Option<&str>) -> Result<String, PromptError> {
        Err(PromptError(format!(
            "cannot ask for \"{}\" in non-interactive mode",
            label
        )))
    }
}
