//! Validators for administration settings

use crate::core::ValidationError;
use crate::options::Validator;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Maximum length of an organization name
pub const ORGANIZATION_NAME_MAX_LEN: usize = 15;

/// Minimum length of a non-empty password
pub const PASSWORD_MIN_LEN: usize = 2;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn check_organization_length(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() > ORGANIZATION_NAME_MAX_LEN {
        return Err(ValidationError::new(format!(
            "The organization name must be not more than {} characters long",
            ORGANIZATION_NAME_MAX_LEN
        )));
    }
    Ok(())
}

/// Organization name: required unless a persisted name exists, and short
pub fn organization_name(persisted: Option<String>) -> Validator {
    Arc::new(move |value: &str| {
        let has_default = persisted.as_deref().is_some_and(|d| !d.trim().is_empty());
        if value.trim().is_empty() && !has_default {
            return Err(ValidationError::new("The organization name must not be empty"));
        }
        check_organization_length(value)?;
        Ok(value.to_string())
    })
}

/// Optional email address
pub fn email() -> Validator {
    Arc::new(|value: &str| {
        let value = value.trim();
        if !value.is_empty() && !email_regex().is_match(value) {
            return Err(ValidationError::new("The email must be a valid email address"));
        }
        Ok(value.to_string())
    })
}

/// Optional password; empty keeps the current one
pub fn password() -> Validator {
    Arc::new(|value: &str| {
        if !value.is_empty() && value.trim().chars().count() < PASSWORD_MIN_LEN {
            return Err(ValidationError::new(format!(
                "The password must be at least {} characters long",
                PASSWORD_MIN_LEN
            )));
        }
        Ok(value.to_string())
    })
}

/// clap value parser for `--organization-name`
pub fn parse_organization_name(s: &str) -> Result<String, String> {
    check_organization_length(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// clap value parser for `--user-email`
pub fn parse_email(s: &str) -> Result<String, String> {
    email()(s).map_err(|e| e.to_string())
}

/// clap value parser for `--user-password`
pub fn parse_password(s: &str) -> Result<String, String> {
    password()(s).map_err(|e| e.to_string())
}
