use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::client_binary::{client_path, CLIENT_BINARY};
use crate::command::ClientCommand;
use crate::error::ProcessFailure;
use crate::types::SeedResult;

/// Executes client commands, one at a time, to completion.
pub trait CommandRunner {
    fn run(&mut self, command: &ClientCommand) -> Result<(), ProcessFailure>;
}

/// Runs commands by spawning the client binary with the seeder's own stdin, stdout and stderr.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use the client found by [`client_path`].
    pub fn from_env() -> SeedResult<Self> {
        Ok(Self::new(client_path()?))
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &ClientCommand) -> Result<(), ProcessFailure> {
        let display = command.display(&self.program.to_string_lossy());
        log::info!("{} command: {display}", command.label());

        let mut cmd = Command::new(&self.program);
        cmd.args(command.arg_values());
        for (key, value) in command.envs() {
            cmd.env(key, value);
        }

        let status = cmd.status().map_err(|source| ProcessFailure::Spawn {
            command: display.clone(),
            source,
        })?;

        if !status.success() {
            return Err(ProcessFailure::Exited {
                command: display,
                code: status.code(),
                signal: termination_signal(&status),
            });
        }

        Ok(())
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Logs commands without running anything.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&mut self, command: &ClientCommand) -> Result<(), ProcessFailure> {
        log::info!(
            "{} command (dry run): {}",
            command.label(),
            command.display(CLIENT_BINARY)
        );
        Ok(())
    }
}

/// Records every command it is given. Optionally fails the invocation at a given position, which
/// is still recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    commands: Vec<ClientCommand>,
    fail_at: Vec<usize>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the invocation with the zero based `index`, with exit code 1.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at.push(index);
        self
    }

    pub fn commands(&self) -> &[ClientCommand] {
        &self.commands
    }

    /// Rendered command lines, in invocation order.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.display(CLIENT_BINARY))
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &ClientCommand) -> Result<(), ProcessFailure> {
        let index = self.commands.len();
        self.commands.push(command.clone());

        if self.fail_at.contains(&index) {
            return Err(ProcessFailure::Exited {
                command: command.display(CLIENT_BINARY),
                code: Some(1),
                signal: None,
            });
        }

        Ok(())
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, command: &ClientCommand) -> Result<(), ProcessFailure> {
        (**self).run(command)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&mut self, command: &ClientCommand) -> Result<(), ProcessFailure> {
        (**self).run(command)
    }
}
