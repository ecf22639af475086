//! Console subprocess runner - dispatches steps to the application console

use crate::core::{CommandError, Step};
use crate::execution::executor::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs each step as `<console> <command> <args...> --env=<env>`
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    /// Path to the console program
    console: String,

    /// Working directory of every spawned command
    app_root: PathBuf,

    /// Application environment
    env: String,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `console` - Console program, relative to `app_root` or on `PATH`
    /// * `app_root` - Application root used as working directory
    /// * `env` - Application environment forwarded as `--env`
    pub fn new(console: impl Into<String>, app_root: impl Into<PathBuf>, env: impl Into<String>) -> Self {
        Self {
            console: console.into(),
            app_root: app_root.into(),
            env: env.into(),
        }
    }

    /// Full argument list for a step
    pub fn command_args(&self, step: &Step) -> Vec<String> {
        let mut args = vec![step.command.clone()];
        args.extend(step.to_args());
        args.push(format!("--env={}", self.env));
        args
    }

    fn program(&self) -> PathBuf {
        let relative = self.app_root.join(&self.console);
        if self.console.contains(std::path::MAIN_SEPARATOR) && relative.exists() {
            relative
        } else {
            PathBuf::from(&self.console)
        }
    }

    fn build_command(&self, step: &Step) -> Command {
        let mut command = Command::new(self.program());
        command
            .args(self.command_args(step))
            .current_dir(&self.app_root)
            .kill_on_drop(true);

        if step.process_isolation {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            #[cfg(unix)]
            command.process_group(0);
        } else {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::piped());
        }

        command
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    /// Spawn the console and wait for it to exit
    ///
    /// # Errors
    /// Returns `CommandError` if:
    /// - The console program cannot be spawned
    /// - The command exits with a non-zero status
    async fn execute(&self, step: &Step) -> Result<CommandOutput, CommandError> {
        debug!("Spawning {} {:?}", self.console, self.command_args(step));

        let output = self
            .build_command(step)
            .output()
            .await
            .map_err(|e| CommandError::Spawn {
                command: step.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", step.command, exit_code, stderr.trim());

            let message = if stderr.trim().is_empty() {
                format!("exited with code {}", exit_code)
            } else {
                stderr.trim().to_string()
            };
            return Err(CommandError::Failed {
                command: step.command.clone(),
                message,
            });
        }

        let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("{} returned {} bytes of output", step.command, message.len());

        Ok(CommandOutput { message })
    }
}
