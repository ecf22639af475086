//! Administration setup: system settings, organization and admin user

use crate::core::{InstallError, Step};
use crate::options::{validators, OptionResolver, PromptMethod, Setting};
use crate::persistence::ConfigStore;
use tracing::{debug, info};

pub const APPLICATION_URL_KEY: &str = "diamante_distribution.application_url";
pub const ORGANIZATION_NAME_KEY: &str = "diamante_distribution.organization_name";

pub const ORGANIZATION_UPDATE_COMMAND: &str = "oro:organization:update";
pub const USER_UPDATE_COMMAND: &str = "oro:user:update";

/// Settings written to the config store during system settings setup
pub fn system_settings() -> Vec<Setting> {
    vec![Setting::new("application-url", "Application URL").stored_at(APPLICATION_URL_KEY)]
}

/// Settings of the administrator account
pub fn user_settings() -> Vec<Setting> {
    vec![
        Setting::new("user-name", "Username"),
        Setting::new("user-email", "Email").with_method(PromptMethod::AskAndValidate(validators::email())),
        Setting::new("user-firstname", "First name"),
        Setting::new("user-lastname", "Last name"),
        Setting::new("user-password", "Password").with_method(PromptMethod::AskHidden(validators::password())),
    ]
}

/// Resolve system settings and commit the changed ones in one flush
///
/// A value is written only when it is non-empty and differs from the stored
/// one. Returns the number of values written.
pub async fn update_system_settings(
    settings: &[Setting],
    store: &dyn ConfigStore,
    resolver: &OptionResolver,
) -> Result<usize, InstallError> {
    let mut changed = 0;

    for setting in settings {
        let Some(key) = setting.config_key.as_deref() else {
            continue;
        };
        let stored = store.get(key).await?;
        let value = resolver.resolve_setting(setting, stored.as_deref())?;

        if !value.trim().is_empty() && Some(value.as_str()) != stored.as_deref() {
            debug!("Updating {} in configuration", key);
            store.set(key, &value).await?;
            changed += 1;
        }
    }

    store.flush().await?;
    info!("System settings saved ({} changed)", changed);
    Ok(changed)
}

/// Resolve the organization name and build the update step
pub async fn organization_step(
    store: &dyn ConfigStore,
    resolver: &OptionResolver,
    process_isolation: bool,
) -> Result<Step, InstallError> {
    let persisted = store.get(ORGANIZATION_NAME_KEY).await?;
    let method = PromptMethod::AskAndValidate(validators::organization_name(persisted.clone()));

    let name = resolver.resolve(
        "organization-name",
        "Organization name",
        persisted.as_deref(),
        &method,
    )?;

    Ok(Step::new(ORGANIZATION_UPDATE_COMMAND)
        .param("organization-name", "default")
        .param("--organization-name", name)
        .with_isolation(process_isolation))
}

/// Resolve the administrator settings and build the update step
///
/// Returns `None` when no value was provided, leaving the account as the
/// data fixtures created it.
pub fn user_step(
    settings: &[Setting],
    resolver: &OptionResolver,
    process_isolation: bool,
) -> Result<Option<Step>, InstallError> {
    let mut step = Step::new(USER_UPDATE_COMMAND)
        .param("user-name", "admin")
        .with_isolation(process_isolation);
    let mut provided = 0;

    for setting in settings {
        let value = resolver.resolve_setting(setting, None)?;
        if !value.is_empty() {
            step = step.param(format!("--{}", setting.name), value);
            provided += 1;
        }
    }

    Ok((provided > 0).then_some(step))
}
