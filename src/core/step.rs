//! Step domain model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Value of a single step parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

/// A single named unit of orchestrated work
///
/// Parameter keys starting with `--` are options, all other keys are
/// positional arguments. Insertion order is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Name of the sub-command to dispatch
    pub command: String,

    /// Parameters in insertion order
    params: Vec<(String, ParamValue)>,

    /// Run the sub-command in a separate process
    pub process_isolation: bool,

    /// Per-step timeout, falls back to the executor default when absent
    pub timeout: Option<Duration>,
}

impl Step {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: Vec::new(),
            process_isolation: false,
            timeout: None,
        }
    }

    /// Set a parameter, replacing any earlier value under the same key
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn isolated(mut self) -> Self {
        self.process_isolation = true;
        self
    }

    pub fn with_isolation(mut self, isolated: bool) -> Self {
        self.process_isolation = isolated;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    pub fn get_param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Render parameters as command-line arguments
    ///
    /// Positional arguments come first, followed by options.
    pub fn to_args(&self) -> Vec<String> {
        let mut positional = Vec::new();
        let mut options = Vec::new();

        for (key, value) in &self.params {
            if key.starts_with("--") {
                match value {
                    ParamValue::Bool(true) => options.push(key.clone()),
                    ParamValue::Bool(false) => {}
                    ParamValue::Str(s) => options.push(format!("{}={}", key, s)),
                    ParamValue::List(items) => {
                        options.extend(items.iter().map(|item| format!("{}={}", key, item)))
                    }
                }
            } else {
                match value {
                    ParamValue::Bool(b) => positional.push(b.to_string()),
                    ParamValue::Str(s) => positional.push(s.clone()),
                    ParamValue::List(items) => positional.extend(items.iter().cloned()),
                }
            }
        }

        positional.extend(options);
        positional
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in self.to_args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
