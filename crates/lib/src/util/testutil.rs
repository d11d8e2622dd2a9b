//! Test utilities for objar-lib.
//!
//! Cross-platform helpers for tests that need to run real processes, plus a
//! recording [`CommandRunner`] for tests that only care about invocations.

use std::cell::RefCell;
use std::path::Path;

use crate::exec::{CommandRunner, ExecError};
use crate::recipe::ToolCommand;

/// Returns a command that runs `script` through the platform shell.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> ToolCommand {
  ToolCommand {
    program: "/bin/sh".to_string(),
    args: vec!["-c".to_string(), script.to_string()],
  }
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> ToolCommand {
  ToolCommand {
    program: "cmd.exe".to_string(),
    args: vec!["/C".to_string(), script.to_string()],
  }
}

/// Returns a command that creates an empty file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> ToolCommand {
  ToolCommand {
    program: "/usr/bin/touch".to_string(),
    args: vec![filename.to_string()],
  }
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> ToolCommand {
  ToolCommand {
    program: "powershell.exe".to_string(),
    args: vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  }
}

/// Write `path` and set its modification time to `secs` after the epoch.
pub fn write_with_mtime(path: &Path, secs: u64) {
  std::fs::write(path, b"").unwrap();
  set_mtime(path, secs);
}

/// Set the modification time of an existing file.
pub fn set_mtime(path: &Path, secs: u64) {
  filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(secs as i64, 0)).unwrap();
}

/// A runner that records commands instead of running them.
///
/// `fail_at` makes the n-th call (0-indexed) fail with exit code 1.
#[derive(Default)]
pub struct RecordingRunner {
  pub calls: RefCell<Vec<ToolCommand>>,
  pub fail_at: Option<usize>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing_at(index: usize) -> Self {
    Self {
      calls: RefCell::new(Vec::new()),
      fail_at: Some(index),
    }
  }

  pub fn call_count(&self) -> usize {
    self.calls.borrow().len()
  }

  /// The last argument of every recorded call, in order.
  pub fn last_args(&self) -> Vec<String> {
    self
      .calls
      .borrow()
      .iter()
      .filter_map(|c| c.args.last().cloned())
      .collect()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&self, command: &ToolCommand) -> Result<(), ExecError> {
    let index = self.calls.borrow().len();
    self.calls.borrow_mut().push(command.clone());

    if self.fail_at == Some(index) {
      return Err(ExecError::Failed {
        command: command.to_string(),
        code: Some(1),
        stderr: String::new(),
      });
    }
    Ok(())
  }
}
