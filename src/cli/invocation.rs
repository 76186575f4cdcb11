//! One resolved command: its table entry, positionals and flags

use crate::{
    cli::{
        args::{normalize_argv, Args},
        table::{CommandDescriptor, Flag, FlagSet},
    },
    error::{CiderError, Result},
};
use clap::Parser;

/// One parsed command line, consumed by a single dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub descriptor: &'static CommandDescriptor,
    pub positionals: Vec<String>,
    pub flags: FlagSet,
}

impl Invocation {
    /// Parse `verb` and `args` as if they followed `cider` on the command line.
    ///
    /// Aliases and type hints are accepted the same way. A clap failure,
    /// including a request for help, becomes a usage error.
    pub fn parse<S: AsRef<str>>(verb: &str, args: &[S]) -> Result<Self> {
        let argv = ["cider", verb]
            .into_iter()
            .chain(args.iter().map(|arg| arg.as_ref()));
        Args::try_parse_from(normalize_argv(argv))
            .map_err(usage_error)?
            .invocation()
    }

    #[must_use]
    pub const fn has(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Whether debug output was requested for this run
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.has(Flag::Debug)
    }
}

/// First paragraph of clap's message, without its `error: ` prefix
fn usage_error(err: clap::Error) -> CiderError {
    let rendered = err.to_string();
    let message = rendered.strip_prefix("error: ").unwrap_or(&rendered);
    let message = message.split("\n\n").next().unwrap_or(message);
    CiderError::usage(message.trim_end())
}
