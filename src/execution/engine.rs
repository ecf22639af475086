//! Install engine - drives the installation state machine

use crate::{
    core::{InstallError, InstallPhase, InstallPlan, RunState, Step, StepStatus, FATAL_EXIT_CODE},
    execution::{
        admin,
        executor::{ChainEvent, CommandExecutor, CommandRunner, ExecutionResult},
        logger::InstallLogger,
    },
    options::{InputOptions, OptionResolver, Prompter},
    persistence::ConfigStore,
    requirements::{RequirementChecker, RequirementReport},
};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Events that can occur during an installation run
#[derive(Debug, Clone)]
pub enum InstallEvent {
    InstallStarted {
        execution_id: Uuid,
    },
    PhaseStarted {
        phase: InstallPhase,
    },
    RequirementsChecked {
        report: RequirementReport,
    },
    StepStarted {
        phase: InstallPhase,
        command: String,
    },
    StepCompleted {
        command: String,
        duration: Duration,
    },
    StepFailed {
        command: String,
        error: String,
    },
    /// A best-effort step failed; the run continues
    StepIgnored {
        command: String,
        error: String,
    },
    StepSkipped {
        command: String,
        reason: String,
    },
    SettingsSaved {
        changed: usize,
    },
    InstallFinished {
        execution_id: Uuid,
        phase: InstallPhase,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&InstallEvent) + Send + Sync>;

/// Everything a single run needs besides the collaborators
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Values given through input flags
    pub inputs: InputOptions,

    /// Whether the operator may be asked questions
    pub interactive: bool,

    /// Timeout for steps without their own
    pub default_timeout: Option<Duration>,

    /// Whether administration commands run isolated
    pub process_isolation: bool,

    pub plan: InstallPlan,
}

/// Final result of a run
#[derive(Debug)]
pub struct InstallOutcome {
    pub state: RunState,
    pub error: Option<InstallError>,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Process exit code: 0 on success, [`FATAL_EXIT_CODE`] otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            FATAL_EXIT_CODE
        }
    }
}

/// Executor and resolver created when the run is initialized
struct Session<R> {
    executor: CommandExecutor<R>,
    resolver: OptionResolver,
    process_isolation: bool,
}

/// Main installation engine
pub struct InstallEngine<R> {
    runner: R,
    store: Arc<dyn ConfigStore>,
    checker: RequirementChecker,
    logger: Arc<dyn InstallLogger>,
    prompter: Arc<dyn Prompter>,
    event_handlers: Vec<EventHandler>,
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl<R: CommandRunner + Clone> InstallEngine<R> {
    pub fn new(
        runner: R,
        store: Arc<dyn ConfigStore>,
        checker: RequirementChecker,
        logger: Arc<dyn InstallLogger>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            runner,
            store,
            checker,
            logger,
            prompter,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&InstallEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: InstallEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    fn enter(&self, state: &mut RunState, phase: InstallPhase) {
        info!("Entering phase: {}", phase);
        state.enter(phase);
        self.emit_event(InstallEvent::PhaseStarted { phase });
    }

    /// Run the whole installation
    ///
    /// The fatal chain (requirements through administration setup) is the
    /// only place where errors stop the run; they are logged once here.
    pub async fn execute(&self, request: &InstallRequest) -> InstallOutcome {
        let mut state = RunState::new();
        state.start();

        self.logger
            .info(&format!("Installation started at {}", timestamp()));
        self.emit_event(InstallEvent::InstallStarted {
            execution_id: state.execution_id,
        });

        let error = match self.run_fatal_chain(&mut state, request).await {
            Ok(()) => {
                state.complete();
                self.logger
                    .info(&format!("Installation finished at {}", timestamp()));
                None
            }
            Err(e) => {
                self.logger
                    .error(&format!("Installation failed with error: {}", e));
                state.fail(e.to_string());
                Some(e)
            }
        };

        self.emit_event(InstallEvent::InstallFinished {
            execution_id: state.execution_id,
            phase: state.phase,
        });

        InstallOutcome { state, error }
    }

    async fn run_fatal_chain(
        &self,
        state: &mut RunState,
        request: &InstallRequest,
    ) -> Result<(), InstallError> {
        self.check_requirements(state)?;
        let session = self.init(state, request);
        self.install(state, &session, &request.plan).await?;
        self.run_auxiliary(state, &session, &request.plan.auxiliary).await;
        self.administration_setup(state, &session).await?;
        Ok(())
    }

    fn check_requirements(&self, state: &mut RunState) -> Result<(), InstallError> {
        self.enter(state, InstallPhase::RequirementsCheck);

        let result = self.checker.check();
        for report in &result.reports {
            self.emit_event(InstallEvent::RequirementsChecked {
                report: report.clone(),
            });
        }

        result.ensure_fulfilled()
    }

    fn init(&self, state: &mut RunState, request: &InstallRequest) -> Session<R> {
        self.enter(state, InstallPhase::Init);

        Session {
            executor: CommandExecutor::new(self.runner.clone(), request.default_timeout),
            resolver: OptionResolver::new(
                request.inputs.clone(),
                request.interactive,
                self.prompter.clone(),
            ),
            process_isolation: request.process_isolation,
        }
    }

    /// Schema load, data load and finalize; every step must succeed
    async fn install(
        &self,
        state: &mut RunState,
        session: &Session<R>,
        plan: &InstallPlan,
    ) -> Result<(), InstallError> {
        let phases = [
            (InstallPhase::SchemaLoad, &plan.schema_load),
            (InstallPhase::DataLoad, &plan.data_load),
            (InstallPhase::Finalize, &plan.finalize),
        ];

        for (phase, steps) in phases {
            self.enter(state, phase);
            self.run_critical(state, &session.executor, steps).await?;
        }

        Ok(())
    }

    async fn run_critical<'a, I>(
        &self,
        state: &mut RunState,
        executor: &CommandExecutor<R>,
        steps: I,
    ) -> Result<(), InstallError>
    where
        I: IntoIterator<Item = &'a Step>,
    {
        let phase = state.phase;
        executor
            .run_chain(steps, |event| match event {
                ChainEvent::Started(step) => self.emit_event(InstallEvent::StepStarted {
                    phase,
                    command: step.command.clone(),
                }),
                ChainEvent::Finished(step, result) => self.record_critical(state, step, result),
            })
            .await?;
        Ok(())
    }

    fn record_critical(&self, state: &mut RunState, step: &Step, result: &ExecutionResult) {
        match result {
            ExecutionResult::Success { duration, .. } => {
                state.record(&step.command, StepStatus::Succeeded);
                self.emit_event(InstallEvent::StepCompleted {
                    command: step.command.clone(),
                    duration: *duration,
                });
            }
            ExecutionResult::Failed { error } => {
                state.record(
                    &step.command,
                    StepStatus::Failed {
                        error: error.to_string(),
                    },
                );
                self.emit_event(InstallEvent::StepFailed {
                    command: step.command.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    /// Best-effort commands; each failure is logged and the next one runs
    async fn run_auxiliary(&self, state: &mut RunState, session: &Session<R>, steps: &[Step]) {
        self.enter(state, InstallPhase::AuxiliaryCommands);

        for step in steps {
            self.emit_event(InstallEvent::StepStarted {
                phase: state.phase,
                command: step.command.clone(),
            });

            match session.executor.run(step).await {
                ExecutionResult::Success { duration, .. } => {
                    state.record(&step.command, StepStatus::Succeeded);
                    self.emit_event(InstallEvent::StepCompleted {
                        command: step.command.clone(),
                        duration,
                    });
                }
                ExecutionResult::Failed { error } => {
                    warn!("Ignoring failure of {}: {}", error.command(), error);
                    self.logger.error(&format!(
                        "Error occurred during execution of {}: {}",
                        step.command, error
                    ));
                    state.record(
                        &step.command,
                        StepStatus::Ignored {
                            error: error.to_string(),
                        },
                    );
                    self.emit_event(InstallEvent::StepIgnored {
                        command: step.command.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }
    }

    /// System settings, organization and administrator account
    async fn administration_setup(
        &self,
        state: &mut RunState,
        session: &Session<R>,
    ) -> Result<(), InstallError> {
        self.enter(state, InstallPhase::AdminSetup);

        let changed =
            admin::update_system_settings(&admin::system_settings(), self.store.as_ref(), &session.resolver)
                .await?;
        self.emit_event(InstallEvent::SettingsSaved { changed });

        let organization = admin::organization_step(self.store.as_ref(), &session.resolver, session.process_isolation)
                .await?;
        self.run_critical(state, &session.executor, [&organization]).await?;

        match admin::user_step(&admin::user_settings(), &session.resolver, session.process_isolation)? {
            Some(user) => self.run_critical(state, &session.executor, [&user]).await?,
            None => {
                let reason = "no administrator details given".to_string();
                info!("Skipping {}: {}", admin::USER_UPDATE_COMMAND, reason);
                state.record(
                    admin::USER_UPDATE_COMMAND,
                    StepStatus::Skipped {
                        reason: reason.clone(),
                    },
                );
                self.emit_event(InstallEvent::StepSkipped {
                    command: admin::USER_UPDATE_COMMAND.to_string(),
                    reason,
                });
            }
        }

        Ok(())
    }
}
