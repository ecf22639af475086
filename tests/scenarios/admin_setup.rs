//! Test: Administration setup - settings, organization and admin user

use crate::helpers::*;
use installer::core::{InstallError, ParamValue, StepStatus};
use installer::execution::admin::{
    APPLICATION_URL_KEY, ORGANIZATION_NAME_KEY, ORGANIZATION_UPDATE_COMMAND, USER_UPDATE_COMMAND,
};
use installer::options::InputOptions;
use installer::persistence::{ConfigStore, InMemoryConfigStore};
use std::sync::Arc;

fn organization_name(result: &InstallTestResult) -> Option<ParamValue> {
    result
        .runner
        .step(ORGANIZATION_UPDATE_COMMAND)
        .and_then(|s| s.get_param("--organization-name").cloned())
}

/// A flag wins over the stored value and is never prompted for
#[tokio::test]
async fn test_flag_takes_precedence_over_stored_value() {
    let store = Arc::new(InMemoryConfigStore::with_values([
        (ORGANIZATION_NAME_KEY, "Stored"),
        (APPLICATION_URL_KEY, "http://old.local"),
    ]));
    let prompter = ScriptedPrompter::new(&[]);
    let inputs = InputOptions::new()
        .with("organization-name", "Acme")
        .with("application-url", "http://desk.local")
        .with("user-name", "root")
        .with("user-email", "root@desk.local")
        .with("user-firstname", "Ada")
        .with("user-lastname", "Admin")
        .with("user-password", "secret");

    let result = Harness::new(FakeRunner::new())
        .with_store(store.clone())
        .with_inputs(inputs)
        .interactive(prompter.clone())
        .run()
        .await;

    assert_install_succeeded(&result);
    assert!(prompter.asked().is_empty());
    assert_eq!(organization_name(&result), Some(ParamValue::Str("Acme".to_string())));
    assert_eq!(
        store.committed().await.get(APPLICATION_URL_KEY).map(String::as_str),
        Some("http://desk.local")
    );
}

/// Non-interactive runs fall back to the stored organization name
#[tokio::test]
async fn test_stored_organization_used_without_flag() {
    let store = Arc::new(InMemoryConfigStore::with_values([(ORGANIZATION_NAME_KEY, "Stored")]));
    let result = Harness::new(FakeRunner::new())
        .with_store(store)
        .with_inputs(InputOptions::new())
        .run()
        .await;

    assert_install_succeeded(&result);
    assert_eq!(organization_name(&result), Some(ParamValue::Str("Stored".to_string())));
}

/// Without a flag or stored value a non-interactive run cannot name the organization
#[tokio::test]
async fn test_missing_organization_is_fatal_when_not_interactive() {
    let result = Harness::new(FakeRunner::new())
        .with_inputs(InputOptions::new())
        .run()
        .await;

    assert_install_failed(&result);
    assert!(matches!(result.outcome.error, Some(InstallError::Option(_))));
    assert!(!result.runner.ran(ORGANIZATION_UPDATE_COMMAND));
    assert!(result.runner.ran("assetic:dump"));
}

/// Invalid answers are rejected and asked again
#[tokio::test]
async fn test_invalid_answers_are_asked_again() {
    let prompter = ScriptedPrompter::new(&[
        "",                      // application URL
        "",                      // organization name, rejected
        "ThisNameIsWayTooLong",  // rejected
        "Acme",
        "",                      // username
        "not-an-email",          // rejected
        "admin@desk.local",
        "",                      // first name
        "",                      // last name
        "",                      // password
    ]);

    let result = Harness::new(FakeRunner::new())
        .with_inputs(InputOptions::new())
        .interactive(prompter.clone())
        .run()
        .await;

    assert_install_succeeded(&result);
    assert_eq!(organization_name(&result), Some(ParamValue::Str("Acme".to_string())));
    assert_eq!(
        prompter.rejections(),
        vec![
            "The organization name must not be empty".to_string(),
            "The organization name must be not more than 15 characters long".to_string(),
            "The email must be a valid email address".to_string(),
        ]
    );

    let user = result.runner.step(USER_UPDATE_COMMAND).unwrap();
    assert_eq!(
        user.get_param("--user-email"),
        Some(&ParamValue::Str("admin@desk.local".to_string()))
    );
    assert!(user.get_param("--user-password").is_none());
}

/// Blank answers keep the stored organization name and application URL
#[tokio::test]
async fn test_blank_answers_keep_stored_values() {
    let store = Arc::new(InMemoryConfigStore::with_values([
        (ORGANIZATION_NAME_KEY, "Existing"),
        (APPLICATION_URL_KEY, "http://old"),
    ]));
    let prompter = ScriptedPrompter::new(&[
        "   ", // application URL
        "   ", // organization name
        "", "", "", "", "",
    ]);

    let result = Harness::new(FakeRunner::new())
        .with_store(store.clone())
        .with_inputs(InputOptions::new())
        .interactive(prompter.clone())
        .run()
        .await;

    assert_install_succeeded(&result);
    assert!(prompter.rejections().is_empty());
    assert_eq!(organization_name(&result), Some(ParamValue::Str("Existing".to_string())));
    assert_eq!(
        store.committed().await.get(APPLICATION_URL_KEY).map(String::as_str),
        Some("http://old")
    );
    assert!(!result.runner.ran(USER_UPDATE_COMMAND));
}

/// Disabling isolation reaches the administration commands
#[tokio::test]
async fn test_no_isolation_applies_to_admin_commands() {
    let result = Harness::new(FakeRunner::new())
        .with_inputs(InputOptions::new().with("organization-name", "Acme").with("user-name", "root"))
        .without_isolation()
        .run()
        .await;

    assert_install_succeeded(&result);
    assert!(!result.runner.step(ORGANIZATION_UPDATE_COMMAND).unwrap().process_isolation);
    assert!(!result.runner.step(USER_UPDATE_COMMAND).unwrap().process_isolation);
    assert!(!result.runner.step("oro:migration:load").unwrap().process_isolation);
}

/// Administration commands run isolated by default
#[tokio::test]
async fn test_admin_commands_isolated_by_default() {
    let result = Harness::new(FakeRunner::new())
        .with_inputs(InputOptions::new().with("organization-name", "Acme").with("user-name", "root"))
        .run()
        .await;

    assert!(result.runner.step(ORGANIZATION_UPDATE_COMMAND).unwrap().process_isolation);
    assert!(result.runner.step(USER_UPDATE_COMMAND).unwrap().process_isolation);
}

/// A failing flush commits nothing and fails the run
#[tokio::test]
async fn test_flush_failure_persists_nothing() {
    let store = Arc::new(FailingFlushStore::default());
    let inputs = InputOptions::new()
        .with("organization-name", "Acme")
        .with("application-url", "http://desk.local");

    let result = Harness::new(FakeRunner::new())
        .with_store(store.clone())
        .with_inputs(inputs)
        .run()
        .await;

    assert_install_failed(&result);
    assert!(matches!(result.outcome.error, Some(InstallError::ConfigStore(_))));
    assert!(store.committed().await.is_empty());
    assert!(!result.runner.ran(ORGANIZATION_UPDATE_COMMAND));
}

/// Unchanged settings are not rewritten
#[tokio::test]
async fn test_unchanged_setting_is_not_written() {
    let store = Arc::new(InMemoryConfigStore::with_values([(APPLICATION_URL_KEY, "http://desk.local")]));
    let inputs = InputOptions::new()
        .with("organization-name", "Acme")
        .with("application-url", "http://desk.local");

    let result = Harness::new(FakeRunner::new())
        .with_store(store.clone())
        .with_inputs(inputs)
        .run()
        .await;

    assert_install_succeeded(&result);
    assert!(result.events.iter().any(|e| matches!(
        e,
        installer::execution::InstallEvent::SettingsSaved { changed: 0 }
    )));
    assert_eq!(store.get(APPLICATION_URL_KEY).await.unwrap().as_deref(), Some("http://desk.local"));
}

/// The user update is skipped when no administrator value is known
#[tokio::test]
async fn test_user_update_skipped_without_values() {
    let result = Harness::new(FakeRunner::new()).run().await;

    assert_install_succeeded(&result);
    assert!(!result.runner.ran(USER_UPDATE_COMMAND));

    let skipped = result
        .outcome
        .state
        .outcomes()
        .iter()
        .find(|o| o.command == USER_UPDATE_COMMAND)
        .unwrap();
    assert!(matches!(skipped.status, StepStatus::Skipped { .. }));
    assert!(!result.outcome.state.executed_commands().contains(&USER_UPDATE_COMMAND));
}

/// A failing organization update is fatal
#[tokio::test]
async fn test_organization_update_failure_is_fatal() {
    let runner = FakeRunner::new().failing(ORGANIZATION_UPDATE_COMMAND, "no such organization");
    let result = Harness::new(runner)
        .with_inputs(InputOptions::new().with("organization-name", "Acme").with("user-name", "root"))
        .run()
        .await;

    assert_install_failed(&result);
    assert!(!result.runner.ran(USER_UPDATE_COMMAND));
}
