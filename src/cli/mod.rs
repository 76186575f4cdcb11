//! Command-line interface module
//!
//! Provides argument parsing, command dispatch and error reporting.

pub mod args;
pub mod commands;
pub mod invocation;
pub mod report;
pub mod table;
pub mod terminal;

pub use args::{parse_args, Args};
pub use commands::execute_command;
pub use invocation::Invocation;
pub use report::report;
pub use terminal::{ConsoleTerminal, Terminal};
