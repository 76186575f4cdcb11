//! Process execution utilities
//!
//! Runs external programs and maps unsuccessful exits to
//! [`CiderError::Subprocess`].

use crate::error::{CiderError, NOT_FOUND_EXIT_CODE, Result};
use std::{
    path::Path,
    process::{Command, Stdio},
};
use tracing::{debug, info, instrument};

/// Utility for running external processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    debug: bool,
}

impl ProcessRunner {
    /// Create a new process runner
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Run a command, inheriting stdout/stderr
    #[instrument(skip(self))]
    pub fn run(&self, argv: &[String]) -> Result<()> {
        self.run_in(argv, None)
    }

    /// Run a command in a given working directory, inheriting stdout/stderr
    #[instrument(skip(self))]
    pub fn run_in(&self, argv: &[String], dir: Option<&Path>) -> Result<()> {
        let mut cmd = self.command(argv)?;
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());

        let status = cmd.status().map_err(|e| spawn_error(argv, &e))?;
        if !status.success() {
            return Err(CiderError::subprocess(argv, status.code()));
        }

        debug!("Command completed successfully");
        Ok(())
    }

    /// Run a command and capture its standard output
    #[instrument(skip(self))]
    pub fn output(&self, argv: &[String]) -> Result<String> {
        let mut cmd = self.command(argv)?;
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| spawn_error(argv, &e))?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        debug!(
            "Command finished: success={}, exit_code={:?}, stdout_len={}",
            output.status.success(),
            output.status.code(),
            stdout.len()
        );

        if !output.status.success() {
            debug!("Command stderr: {}", String::from_utf8_lossy(&output.stderr));
            return Err(CiderError::subprocess(argv, output.status.code()));
        }

        Ok(stdout)
    }

    /// Whether a command runs and exits successfully, with all output discarded
    #[instrument(skip(self))]
    pub fn succeeds(&self, argv: &[String]) -> bool {
        let Some((program, args)) = argv.split_first() else {
            return false;
        };
        let result = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("Failed to run '{}': {}", program, e);
                false
            }
        }
    }

    /// Check if a command exists in PATH
    pub fn command_exists(&self, command: &str) -> bool {
        let exists = self.succeeds(&["which".to_string(), command.to_string()]);
        debug!("Command '{}' exists: {}", command, exists);
        exists
    }

    fn command(&self, argv: &[String]) -> Result<Command> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CiderError::domain("cannot run an empty command"))?;

        let cmd_str = argv.join(" ");
        if self.debug {
            debug!("Running command: {}", cmd_str);
        } else {
            info!("+ {}", cmd_str);
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(false)
    }
}

fn spawn_error(argv: &[String], e: &std::io::Error) -> CiderError {
    CiderError::Domain {
        message: format!("failed to execute `{}`: {e}", argv.join(" ")),
        exit_code: NOT_FOUND_EXIT_CODE,
    }
}
