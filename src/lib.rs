//! # Cider
//!
//! Declarative Homebrew packages and macOS preferences from the command line.
//! Every change made through cider is recorded in JSON files under the cider
//! directory so the same machine state can be restored elsewhere.
//!
//! ## Features
//!
//! - Formula and cask installation through Homebrew
//! - `defaults` preferences, including the global domain
//! - Custom application icons, dotfile symlinks and post-install scripts
//! - One exit code and one message per failure, so the tool is scriptable
//!
//! ## Example
//!
//! ```no_run
//! use cider::{cli::{self, ConsoleTerminal}, config::Config, core::Cider};
//!
//! let invocation = cli::Invocation::parse("list", &["wget"])?;
//! let mut backend = Cider::new(Config::from_invocation(&invocation)?)?;
//! cli::execute_command(&invocation, &mut backend, &mut ConsoleTerminal::new())?;
//! # Ok::<(), cider::error::CiderError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use error::{CiderError, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| CiderError::domain(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
