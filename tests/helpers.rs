//! Test utilities for desk-installer
#![allow(dead_code)]

use async_trait::async_trait;
use installer::core::{CommandError, ConfigStoreError, InstallPlan, PlanOptions, Step};
use installer::execution::{
    CommandOutput, CommandRunner, InstallEngine, InstallEvent, InstallLogger, InstallOutcome,
    InstallRequest,
};
use installer::options::{InputOptions, NoPrompter, PromptError, Prompter};
use installer::persistence::{ConfigStore, InMemoryConfigStore};
use installer::requirements::{Requirement, RequirementCategory, RequirementChecker, RequirementSource};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Runner that records every dispatched step and fails on demand
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Step>>>,
    failures: Arc<HashMap<String, String>>,
    delays: Arc<HashMap<String, Duration>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `command` with `message` every time it runs
    pub fn failing(mut self, command: &str, message: &str) -> Self {
        Arc::make_mut(&mut self.failures).insert(command.to_string(), message.to_string());
        self
    }

    /// Make `command` take `delay` before answering
    pub fn slow(mut self, command: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(command.to_string(), delay);
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|s| s.command.clone()).collect()
    }

    pub fn step(&self, command: &str) -> Option<Step> {
        self.calls.lock().unwrap().iter().find(|s| s.command == command).cloned()
    }

    pub fn ran(&self, command: &str) -> bool {
        self.step(command).is_some()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn execute(&self, step: &Step) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(step.clone());

        if let Some(delay) = self.delays.get(&step.command) {
            tokio::time::sleep(*delay).await;
        }

        match self.failures.get(&step.command) {
            Some(message) => Err(CommandError::Failed {
                command: step.command.clone(),
                message: message.clone(),
            }),
            None => Ok(CommandOutput {
                message: format!("{} done", step.command),
            }),
        }
    }
}

/// Prompter answering from a script
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            ..Default::default()
        })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, label: &str, _default: Option<&str>) -> Result<String, PromptError> {
        self.asked.lock().unwrap().push(label.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PromptError(format!("no scripted answer for {}", label)))
    }

    fn report_invalid(&self, message: &str) {
        self.rejections.lock().unwrap().push(message.to_string());
    }
}

/// Logger that keeps every lifecycle line
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingLogger {
    pub fn infos(&self) -> Vec<String> {
        self.level("info")
    }

    pub fn errors(&self) -> Vec<String> {
        self.level("error")
    }

    fn level(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Every message in the order it was logged
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.starts_with(prefix))
            .count()
    }
}

impl InstallLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(("info", message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines.lock().unwrap().push(("error", message.to_string()));
    }
}

/// Store whose flush always fails, leaving nothing committed
#[derive(Default)]
pub struct FailingFlushStore {
    inner: InMemoryConfigStore,
}

impl FailingFlushStore {
    pub async fn committed(&self) -> HashMap<String, String> {
        self.inner.committed().await
    }
}

#[async_trait]
impl ConfigStore for FailingFlushStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConfigStoreError> {
        self.inner.set(key, value).await
    }

    async fn flush(&self) -> Result<(), ConfigStoreError> {
        Err(ConfigStoreError::Flush("database is locked".to_string()))
    }
}

/// Requirement source reporting fixed results for one category
pub struct StaticRequirements {
    pub category: RequirementCategory,
    pub requirements: Vec<Requirement>,
}

impl RequirementSource for StaticRequirements {
    fn requirements(&self, category: RequirementCategory) -> Vec<Requirement> {
        if category == self.category {
            self.requirements.clone()
        } else {
            Vec::new()
        }
    }
}

/// Checker where every category has one fulfilled requirement
pub fn passing_checker() -> RequirementChecker {
    RequirementCategory::ALL
        .iter()
        .fold(RequirementChecker::new(), |checker, category| {
            checker.with_source(StaticRequirements {
                category: *category,
                requirements: vec![Requirement::mandatory(format!("{} ok", category.label()), true, "")],
            })
        })
}

/// Everything needed to run the engine against fakes
pub struct Harness {
    pub runner: FakeRunner,
    pub store: Arc<dyn ConfigStore>,
    pub logger: Arc<RecordingLogger>,
    pub prompter: Arc<dyn Prompter>,
    pub checker: RequirementChecker,
    pub request: InstallRequest,
}

impl Harness {
    /// Non-interactive run of the standard plan with an organization flag
    pub fn new(runner: FakeRunner) -> Self {
        Self {
            runner,
            store: Arc::new(InMemoryConfigStore::new()),
            logger: Arc::new(RecordingLogger::default()),
            prompter: Arc::new(NoPrompter),
            checker: passing_checker(),
            request: InstallRequest {
                inputs: InputOptions::new().with("organization-name", "Acme"),
                interactive: false,
                default_timeout: None,
                process_isolation: true,
                plan: InstallPlan::standard(&PlanOptions::default()),
            },
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_checker(mut self, checker: RequirementChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_inputs(mut self, inputs: InputOptions) -> Self {
        self.request.inputs = inputs;
        self
    }

    pub fn interactive(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.request.interactive = true;
        self.prompter = prompter;
        self
    }

    pub fn with_auxiliary(mut self, commands: &[&str]) -> Self {
        let steps = commands.iter().map(|c| Step::new(*c)).collect();
        self.request.plan = self.request.plan.with_auxiliary(steps);
        self
    }

    /// Standard plan and admin steps without process isolation
    pub fn without_isolation(mut self) -> Self {
        let options = PlanOptions {
            process_isolation: false,
            ..PlanOptions::default()
        };
        self.request.plan = InstallPlan::standard(&options);
        self.request.process_isolation = false;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.request.default_timeout = Some(timeout);
        self
    }

    /// Run the installation, returning the outcome and every emitted event
    pub async fn run(self) -> InstallTestResult {
        let events = Arc::new(Mutex::new(Vec::new()));
        let logger: Arc<dyn InstallLogger> = self.logger.clone();

        let mut engine = InstallEngine::new(
            self.runner.clone(),
            self.store,
            self.checker,
            logger,
            self.prompter,
        );
        let sink = events.clone();
        engine.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));

        let outcome = engine.execute(&self.request).await;
        let events = events.lock().unwrap().clone();

        InstallTestResult {
            outcome,
            events,
            runner: self.runner,
            logger: self.logger,
        }
    }
}

/// Result of a harness run
pub struct InstallTestResult {
    pub outcome: InstallOutcome,
    pub events: Vec<InstallEvent>,
    pub runner: FakeRunner,
    pub logger: Arc<RecordingLogger>,
}

impl InstallTestResult {
    pub fn commands(&self) -> Vec<String> {
        self.runner.commands()
    }
}

/// Assert the run reached DONE with exit code 0
pub fn assert_install_succeeded(result: &InstallTestResult) {
    assert!(
        result.outcome.is_success(),
        "Installation should succeed, but failed with: {:?}",
        result.outcome.error
    );
    assert_eq!(result.outcome.state.phase, installer::core::InstallPhase::Done);
    assert_eq!(result.outcome.exit_code(), 0);
}

/// Assert the run reached FAILED with the fatal exit code
pub fn assert_install_failed(result: &InstallTestResult) {
    assert!(
        !result.outcome.is_success(),
        "Installation should fail, but ran: {:?}",
        result.commands()
    );
    assert_eq!(result.outcome.state.phase, installer::core::InstallPhase::Failed);
    assert_eq!(result.outcome.exit_code(), installer::core::FATAL_EXIT_CODE);
}
