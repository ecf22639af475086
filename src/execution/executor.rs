//! Command executor - runs individual steps through a command runner

use crate::core::{CommandError, Step};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Output of a successfully dispatched sub-command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub message: String,
}

/// The facility that actually performs a sub-command
///
/// `step.process_isolation` is passed through untouched; it is up to the
/// runner to honor it.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, step: &Step) -> Result<CommandOutput, CommandError>;
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for Arc<R> {
    async fn execute(&self, step: &Step) -> Result<CommandOutput, CommandError> {
        (**self).execute(step).await
    }
}

/// Result of executing a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success {
        output: CommandOutput,
        duration: Duration,
    },
    Failed {
        error: CommandError,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn into_result(self) -> Result<CommandOutput, CommandError> {
        match self {
            ExecutionResult::Success { output, .. } => Ok(output),
            ExecutionResult::Failed { error } => Err(error),
        }
    }
}

/// Executes steps with a process-wide default timeout
pub struct CommandExecutor<R> {
    runner: R,
    default_timeout: Option<Duration>,
}

impl<R: CommandRunner> CommandExecutor<R> {
    pub fn new(runner: R, default_timeout: Option<Duration>) -> Self {
        Self {
            runner,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Timeout that applies to a step
    pub fn effective_timeout(&self, step: &Step) -> Option<Duration> {
        step.timeout.or(self.default_timeout)
    }

    /// Execute a step and return the result
    pub async fn run(&self, step: &Step) -> ExecutionResult {
        info!("Running command: {}", step.command);
        debug!("Command line: {} (isolated: {})", step, step.process_isolation);

        let started = Instant::now();
        let outcome = match self.effective_timeout(step) {
            Some(limit) => match timeout(limit, self.runner.execute(step)).await {
                Ok(result) => result,
                Err(_) => Err(CommandError::Timeout {
                    command: step.command.clone(),
                    secs: limit.as_secs(),
                }),
            },
            None => self.runner.execute(step).await,
        };

        match outcome {
            Ok(output) => {
                let duration = started.elapsed();
                debug!("Command {} finished in {:?}", step.command, duration);
                ExecutionResult::Success { output, duration }
            }
            Err(e) => {
                error!("Command {} failed: {}", step.command, e);
                ExecutionResult::Failed { error: e }
            }
        }
    }

    /// Execute a step, returning the executor for the next call
    ///
    /// Allows chains like `executor.run_command(&a).await?.run_command(&b).await?`
    /// where the first failure short-circuits the rest.
    pub async fn run_command(&self, step: &Step) -> Result<&Self, CommandError> {
        self.run(step).await.into_result()?;
        Ok(self)
    }

    /// Execute steps in order, stopping at the first failure
    ///
    /// `observe` sees every step as it starts and finishes, including the
    /// failing one; steps after it are never started.
    pub async fn run_chain<'a, I, F>(&self, steps: I, mut observe: F) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = &'a Step>,
        F: FnMut(ChainEvent<'_>),
    {
        for step in steps {
            observe(ChainEvent::Started(step));
            let result = self.run(step).await;
            observe(ChainEvent::Finished(step, &result));
            result.into_result()?;
        }
        Ok(())
    }
}

/// Progress of a chained run
#[derive(Debug)]
pub enum ChainEvent<'a> {
    Started(&'a Step),
    Finished(&'a Step, &'a ExecutionResult),
}
