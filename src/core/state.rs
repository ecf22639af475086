//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Overall installation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Installation has not started
    Pending,
    /// Installation is currently running
    Running,
    /// Installation reached the done state
    Completed,
    /// Installation was aborted by a fatal error
    Failed,
}

/// States of the installation pipeline, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstallPhase {
    Start,
    RequirementsCheck,
    Init,
    SchemaLoad,
    DataLoad,
    Finalize,
    AuxiliaryCommands,
    AdminSetup,
    Done,
    Failed,
}

impl InstallPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallPhase::Done | InstallPhase::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstallPhase::Start => "Start",
            InstallPhase::RequirementsCheck => "Requirements check",
            InstallPhase::Init => "Initialization",
            InstallPhase::SchemaLoad => "Setting up database",
            InstallPhase::DataLoad => "Loading data",
            InstallPhase::Finalize => "Preparing application",
            InstallPhase::AuxiliaryCommands => "Installing bundles",
            InstallPhase::AdminSetup => "Administration setup",
            InstallPhase::Done => "Done",
            InstallPhase::Failed => "Failed",
        }
    }
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a single executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Succeeded,
    Failed { error: String },
    /// Failed best-effort step; logged and ignored
    Ignored { error: String },
    /// Sub-step with nothing to do
    Skipped { reason: String },
}

/// One entry of the run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub phase: InstallPhase,
    pub command: String,
    pub status: StepStatus,
    pub finished_at: DateTime<Utc>,
}

/// Transient state of one installation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub status: ExecutionStatus,

    pub phase: InstallPhase,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Step outcomes in execution order, append-only
    outcomes: Vec<StepOutcome>,

    /// Message of the error that ended the run, if any
    pub error: Option<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            phase: InstallPhase::Start,
            started_at: None,
            completed_at: None,
            outcomes: Vec::new(),
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.phase = InstallPhase::Start;
        self.started_at = Some(Utc::now());
    }

    /// Move to the next phase; phases never go backwards
    pub fn enter(&mut self, phase: InstallPhase) {
        debug_assert!(!self.phase.is_terminal(), "phase {:?} entered after the run ended", phase);
        debug_assert!(phase >= self.phase, "phase {:?} entered after {:?}", phase, self.phase);
        self.phase = phase;
    }

    pub fn record(&mut self, command: impl Into<String>, status: StepStatus) {
        self.outcomes.push(StepOutcome {
            phase: self.phase,
            command: command.into(),
            status,
            finished_at: Utc::now(),
        });
    }

    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.phase = InstallPhase::Done;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ExecutionStatus::Failed;
        self.phase = InstallPhase::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(error.into());
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn executed_commands(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, StepStatus::Skipped { .. }))
            .map(|o| o.command.as_str())
            .collect()
    }

    pub fn ignored_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StepStatus::Ignored { .. }))
            .count()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
