//! Turning a failed command into one message and an exit code

use crate::{
    cli::terminal::Terminal,
    error::{CiderError, Prerequisite, USAGE_EXIT_CODE},
};
use std::io;
use tracing::warn;

/// Report `error` to the user and return the exit code for the process.
///
/// Every variant is handled here and nowhere else.
pub fn report<T: Terminal + ?Sized>(error: &CiderError, terminal: &mut T) -> i32 {
    match error {
        CiderError::Usage { message } => {
            terminal.err(&format!("Error: {message}"));
            USAGE_EXIT_CODE
        }
        CiderError::Subprocess { exit_code, .. } => {
            terminal.err(&error.to_string());
            *exit_code
        }
        CiderError::MalformedData { .. } => {
            terminal.err(&error.to_string());
            1
        }
        CiderError::MissingPrerequisite { tool, url } => {
            let prompt = match tool {
                Prerequisite::Xcode => {
                    "First, you need to install Xcode (press any key to redirect)"
                }
                Prerequisite::Homebrew => "Next, install Homebrew (press any key to redirect)",
            };
            terminal.out(prompt);
            redirect(url, terminal)
        }
        CiderError::Domain { message, exit_code } => {
            terminal.err(&format!("Error: {message}"));
            *exit_code
        }
        CiderError::Aborted => {
            terminal.err("Aborted!");
            1
        }
    }
}

fn redirect<T: Terminal + ?Sized>(url: &str, terminal: &mut T) -> i32 {
    match terminal.wait_for_key() {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
            return report(&CiderError::Aborted, terminal);
        }
        Err(e) => warn!("Could not read a keypress: {}", e),
    }
    if let Err(e) = terminal.open_url(url) {
        terminal.err(&format!("Error: could not open {url}: {e}"));
    }
    1
}
