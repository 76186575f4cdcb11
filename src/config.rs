//! Configuration management for cider
//!
//! Centralizes paths, program names and prerequisite URLs.

use crate::{cli::Invocation, error::CiderError};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Environment variable overriding the cider directory
pub const CIDER_DIR_ENV: &str = "CIDER_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Directory holding bootstrap.json, defaults.json, icons.json and symlinks/
    pub cider_dir: PathBuf,
    /// External programs
    pub programs: ProgramConfig,
    /// Where to send users who lack a prerequisite
    pub urls: PrerequisiteUrls,
}

/// Names of the external programs cider drives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub brew: String,
    pub defaults: String,
    pub fileicon: String,
    pub xcode_select: String,
    pub shell: String,
}

/// Download pages for missing prerequisites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrerequisiteUrls {
    pub xcode: String,
    pub homebrew: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            cider_dir: default_cider_dir(),
            programs: ProgramConfig::default(),
            urls: PrerequisiteUrls::default(),
        }
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            brew: "brew".to_string(),
            defaults: "defaults".to_string(),
            fileicon: "fileicon".to_string(),
            xcode_select: "xcode-select".to_string(),
            shell: "sh".to_string(),
        }
    }
}

impl Default for PrerequisiteUrls {
    fn default() -> Self {
        Self {
            xcode: "https://apps.apple.com/app/xcode/id497799835".to_string(),
            homebrew: "https://brew.sh".to_string(),
        }
    }
}

fn default_cider_dir() -> PathBuf {
    match env::var_os(CIDER_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cider"),
    }
}

impl Config {
    /// Create configuration for one parsed invocation
    pub fn from_invocation(invocation: &Invocation) -> Result<Self, CiderError> {
        let config = Self {
            debug: invocation.debug(),
            ..Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CiderError> {
        if self.cider_dir.exists() && !self.cider_dir.is_dir() {
            return Err(CiderError::domain(format!(
                "Cider directory is not a directory: {}",
                self.cider_dir.display()
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn bootstrap_file(&self) -> PathBuf {
        self.cider_dir.join("bootstrap.json")
    }

    #[must_use]
    pub fn defaults_file(&self) -> PathBuf {
        self.cider_dir.join("defaults.json")
    }

    #[must_use]
    pub fn icons_file(&self) -> PathBuf {
        self.cider_dir.join("icons.json")
    }

    #[must_use]
    pub fn symlinks_dir(&self) -> PathBuf {
        self.cider_dir.join("symlinks")
    }
}
