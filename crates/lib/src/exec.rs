//! External tool execution.
//!
//! The archiver drives tools through the [`CommandRunner`] trait.
//! [`ProcessRunner`] runs each command as a child process and blocks until it
//! exits.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::recipe::ToolCommand;

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The process could not be started.
  #[error("failed to launch {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The process ran and exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {command}")]
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// Runs rendered tool commands.
pub trait CommandRunner {
  /// Run `command` to completion.
  fn run(&self, command: &ToolCommand) -> Result<(), ExecError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
  fn run(&self, command: &ToolCommand) -> Result<(), ExecError> {
    (**self).run(command)
  }
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
  cwd: Option<PathBuf>,
}

impl ProcessRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run every command from `dir` instead of the current directory.
  pub fn with_cwd(mut self, dir: impl AsRef<Path>) -> Self {
    self.cwd = Some(dir.as_ref().to_path_buf());
    self
  }
}

impl CommandRunner for ProcessRunner {
  fn run(&self, command: &ToolCommand) -> Result<(), ExecError> {
    info!(cmd = %command, "executing command");

    let mut process = Command::new(&command.program);
    process.args(&command.args);
    if let Some(dir) = &self.cwd {
      process.current_dir(dir);
    }

    let output = process.output().map_err(|source| ExecError::Spawn {
      program: command.program.clone(),
      source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.trim().is_empty() {
      debug!(stdout = %stdout.trim(), "command stdout");
    }
    if !stderr.trim().is_empty() {
      debug!(stderr = %stderr.trim(), "command stderr");
    }

    if !output.status.success() {
      return Err(ExecError::Failed {
        command: command.to_string(),
        code: output.status.code(),
        stderr: stderr.trim().to_string(),
      });
    }

    Ok(())
  }
}
