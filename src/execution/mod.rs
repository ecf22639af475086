//! Installation execution

pub mod admin;
pub mod engine;
pub mod executor;
pub mod logger;
pub mod runner;

pub use engine::{InstallEngine, InstallEvent, InstallOutcome, InstallRequest};
pub use executor::{ChainEvent, CommandExecutor, CommandOutput, CommandRunner, ExecutionResult};
pub use logger::{InstallLogger, TracingLogger};
pub use runner::SubprocessRunner;
