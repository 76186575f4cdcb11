//! Homebrew command lines and prerequisite checks

use crate::{
    config::Config,
    error::{CiderError, Prerequisite, Result},
    utils::process::ProcessRunner,
};
use regex::Regex;
use tracing::{debug, instrument};

/// Builds `brew` argv vectors
#[derive(Debug, Clone)]
pub struct Brew {
    program: String,
    /// `user/repo` tap names
    re_tap: Regex,
}

/// Options shared by the mutating brew commands
#[derive(Debug, Clone, Copy, Default)]
pub struct BrewOptions {
    pub cask: bool,
    pub force: bool,
    pub debug: bool,
    pub verbose: bool,
}

impl Brew {
    /// Create a new command builder for the configured `brew`
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            program: config.programs.brew.clone(),
            re_tap: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*/[A-Za-z0-9][A-Za-z0-9_.-]*$")
                .map_err(|e| CiderError::domain(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Reject tap names that are not `user/repo`
    pub fn validate_tap(&self, tap: &str) -> Result<()> {
        if self.re_tap.is_match(tap) {
            Ok(())
        } else {
            Err(CiderError::domain(format!(
                "Invalid tap \"{tap}\": expected USER/REPOSITORY"
            )))
        }
    }

    #[must_use]
    pub fn install(&self, names: &[String], options: BrewOptions) -> Vec<String> {
        self.with_options("install", names, options)
    }

    #[must_use]
    pub fn uninstall(&self, names: &[String], options: BrewOptions) -> Vec<String> {
        self.with_options("uninstall", names, BrewOptions { force: false, ..options })
    }

    #[must_use]
    pub fn tap(&self, tap: &str, options: BrewOptions) -> Vec<String> {
        self.tap_command("tap", tap, options)
    }

    #[must_use]
    pub fn untap(&self, tap: &str, options: BrewOptions) -> Vec<String> {
        self.tap_command("untap", tap, options)
    }

    /// Command listing what is installed: leaves for formulas, all casks
    #[must_use]
    pub fn installed(&self, cask: bool) -> Vec<String> {
        if cask {
            vec![self.program.clone(), "list".into(), "--cask".into(), "-1".into()]
        } else {
            vec![self.program.clone(), "leaves".into()]
        }
    }

    /// Taps take neither `--cask` nor `--force`
    fn tap_command(&self, subcommand: &str, tap: &str, options: BrewOptions) -> Vec<String> {
        let options = BrewOptions {
            cask: false,
            force: false,
            ..options
        };
        self.with_options(subcommand, &[tap.to_string()], options)
    }

    fn with_options(
        &self,
        subcommand: &str,
        names: &[String],
        options: BrewOptions,
    ) -> Vec<String> {
        let mut argv = vec![self.program.clone(), subcommand.to_string()];
        let switches = [
            (options.cask, "--cask"),
            (options.force, "--force"),
            (options.verbose, "--verbose"),
            (options.debug, "--debug"),
        ];
        argv.extend(
            switches
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, switch)| switch.to_string()),
        );
        argv.extend(names.iter().cloned());
        argv
    }
}

/// Make sure Xcode tools and Homebrew are installed, in that order
#[instrument(skip_all)]
pub fn ensure_prerequisites(config: &Config, runner: &ProcessRunner) -> Result<()> {
    if cfg!(target_os = "macos") {
        let probe = vec![config.programs.xcode_select.clone(), "-p".to_string()];
        if !runner.succeeds(&probe) {
            return Err(CiderError::missing_prerequisite(
                Prerequisite::Xcode,
                config.urls.xcode.clone(),
            ));
        }
    }

    if !runner.command_exists(&config.programs.brew) {
        return Err(CiderError::missing_prerequisite(
            Prerequisite::Homebrew,
            config.urls.homebrew.clone(),
        ));
    }

    debug!("Prerequisites present");
    Ok(())
}

/// Parse one-name-per-line output of a listing command
#[must_use]
pub fn parse_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
