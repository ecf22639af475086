//! Option resolution: explicit flag, then default, then interactive prompt

pub mod prompt;
pub mod validators;

pub use prompt::{InquirePrompter, NoPrompter, PromptError, Prompter};

use crate::core::{ResolveError, ValidationError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Validator: returns the accepted value or a user-facing rejection
pub type Validator = Arc<dyn Fn(&str) -> Result<String, ValidationError> + Send + Sync>;

/// How to ask for a value interactively
#[derive(Clone)]
pub enum PromptMethod {
    /// Plain prompt, any answer is accepted
    Ask,
    /// Re-ask until the validator accepts the answer
    AskAndValidate(Validator),
    /// Like `AskAndValidate`, without echoing the answer
    AskHidden(Validator),
}

impl PromptMethod {
    pub fn validator(&self) -> Option<&Validator> {
        match self {
            PromptMethod::Ask => None,
            PromptMethod::AskAndValidate(v) | PromptMethod::AskHidden(v) => Some(v),
        }
    }
}

impl fmt::Debug for PromptMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptMethod::Ask => f.write_str("Ask"),
            PromptMethod::AskAndValidate(_) => f.write_str("AskAndValidate"),
            PromptMethod::AskHidden(_) => f.write_str("AskHidden"),
        }
    }
}

/// A named, resolvable configuration value
#[derive(Debug, Clone)]
pub struct Setting {
    /// Input flag name, e.g. `application-url`
    pub name: String,

    /// Prompt label
    pub label: String,

    /// Key in the persisted config store, if the value is stored there
    pub config_key: Option<String>,

    pub method: PromptMethod,
}

impl Setting {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            config_key: None,
            method: PromptMethod::Ask,
        }
    }

    pub fn stored_at(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    pub fn with_method(mut self, method: PromptMethod) -> Self {
        self.method = method;
        self
    }
}

/// Values supplied explicitly through the program's input flags
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    values: HashMap<String, String>,
}

impl InputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Record a flag only when it was given
    pub fn set_opt(&mut self, name: impl Into<String>, value: Option<&String>) {
        if let Some(value) = value {
            self.set(name, value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Resolves setting values by precedence
pub struct OptionResolver {
    inputs: InputOptions,
    interactive: bool,
    prompter: Arc<dyn Prompter>,
}

impl OptionResolver {
    pub fn new(inputs: InputOptions, interactive: bool, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            inputs,
            interactive,
            prompter,
        }
    }

    /// Resolve a value for `name`
    ///
    /// 1. An explicit input flag wins and is returned as given.
    /// 2. Non-interactive runs use `default`.
    /// 3. Otherwise the operator is asked using `method`.
    ///
    /// Whenever a validator is present and the value does not come from an
    /// explicit flag, the returned value has passed it.
    pub fn resolve(
        &self,
        name: &str,
        label: &str,
        default: Option<&str>,
        method: &PromptMethod,
    ) -> Result<String, ResolveError> {
        if let Some(value) = self.inputs.get(name) {
            debug!("Option {} taken from input flag", name);
            return Ok(value.to_string());
        }

        if !self.interactive {
            debug!("Option {} uses default value (non-interactive)", name);
            let value = default.unwrap_or_default();
            return match method.validator() {
                Some(validator) => validator(value).map_err(|source| ResolveError::Invalid {
                    option: name.to_string(),
                    source,
                }),
                None => Ok(value.to_string()),
            };
        }

        match method {
            PromptMethod::Ask => self.ask(name, label, default),
            PromptMethod::AskAndValidate(validator) => {
                self.ask_until_valid(name, validator, || self.ask(name, label, default))
            }
            PromptMethod::AskHidden(validator) => {
                self.ask_until_valid(name, validator, || self.ask_hidden(name, label))
            }
        }
    }

    /// Resolve a setting against its persisted default
    pub fn resolve_setting(&self, setting: &Setting, default: Option<&str>) -> Result<String, ResolveError> {
        self.resolve(&setting.name, &setting.label, default, &setting.method)
    }

    fn ask(&self, name: &str, label: &str, default: Option<&str>) -> Result<String, ResolveError> {
        let answer = self
            .prompter
            .ask(label, default)
            .map_err(|e| prompt_error(name, e))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer.to_string())
    }

    /// Hidden answers keep inner spacing; a blank answer counts as empty
    fn ask_hidden(&self, name: &str, label: &str) -> Result<String, ResolveError> {
        let answer = self
            .prompter
            .ask_hidden(label)
            .map_err(|e| prompt_error(name, e))?;
        if answer.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(answer)
    }

    fn ask_until_valid<F>(&self, name: &str, validator: &Validator, mut ask: F) -> Result<String, ResolveError>
    where
        F: FnMut() -> Result<String, ResolveError>,
    {
        loop {
            let answer = ask()?;
            match validator(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Rejected value for {}: {}", name, e);
                    self.prompter.report_invalid(&e.0);
                }
            }
        }
    }
}

fn prompt_error(name: &str, err: PromptError) -> ResolveError {
    ResolveError::Prompt {
        option: name.to_string(),
        message: err.0,
    }
}
