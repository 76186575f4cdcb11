//! Command-line argument parsing

use crate::{
    cli::{
        invocation::Invocation,
        table::{self, Flag, FlagSet},
    },
    error::{CiderError, Result},
};
use clap::{Parser, Subcommand};
use std::ffi::OsString;

const EXAMPLE_USAGE: &str = "\
Example usage:
  cider [cask] install FORMULA...
  cider [cask] rm FORMULA...
  cider [cask] list
  cider [cask] missing
  cider tap [TAP]
  cider untap TAP
  cider set-default [-g] NAME KEY VALUE
  cider remove-default [-g] NAME KEY
  cider apply-defaults
  cider set-icon APP ICON
  cider remove-icon APP
  cider apply-icons
  cider run-scripts
  cider restore
  cider relink";

/// Declarative Homebrew packages and macOS preferences
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "cider", after_help = EXAMPLE_USAGE)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install formulas and record them in bootstrap.json
    Install {
        /// Reinstall formulas that are already installed
        #[arg(short, long)]
        force: bool,

        /// Pass --debug to brew and log every step
        #[arg(short, long)]
        debug: bool,

        /// Pass --verbose to brew
        #[arg(short, long)]
        verbose: bool,

        #[arg(value_name = "FORMULA", required = true)]
        formulas: Vec<String>,
    },

    /// Uninstall formulas and forget them
    Rm {
        #[arg(short, long)]
        debug: bool,

        #[arg(short, long)]
        verbose: bool,

        #[arg(value_name = "FORMULA", required = true)]
        formulas: Vec<String>,
    },

    /// Tap a repository, or list the recorded taps
    Tap {
        #[arg(short, long)]
        debug: bool,

        #[arg(short, long)]
        verbose: bool,

        /// Repository in USER/REPOSITORY form
        tap: Option<String>,
    },

    /// Untap a repository and forget it
    Untap {
        #[arg(short, long)]
        debug: bool,

        #[arg(short, long)]
        verbose: bool,

        tap: String,
    },

    /// Recreate the symlinks recorded in bootstrap.json
    Relink {
        #[arg(short, long)]
        debug: bool,

        /// Replace files that are in the way
        #[arg(short, long)]
        force: bool,
    },

    /// List recorded formulas, optionally filtered by name
    List { formula: Option<String> },

    /// List installed formulas that are not recorded
    Missing {
        #[arg(short, long)]
        debug: bool,
    },

    /// Run install, rm, list or missing against casks
    Cask {
        #[arg(short, long)]
        force: bool,

        #[arg(short, long)]
        debug: bool,

        #[arg(short, long)]
        verbose: bool,

        /// Cask command followed by its arguments
        #[arg(value_name = "COMMAND", required = true)]
        args: Vec<String>,
    },

    /// Write a preference with `defaults` and record it
    #[command(allow_negative_numbers = true)]
    SetDefault {
        /// Write to NSGlobalDomain; NAME becomes the key and KEY the value
        #[arg(short = 'g', long = "globalDomain")]
        global_domain: bool,

        /// Write even if the recorded value is unchanged
        #[arg(short, long)]
        force: bool,

        #[arg(short, long)]
        debug: bool,

        /// Treat VALUE as an integer
        #[arg(long)]
        int: bool,

        /// Treat VALUE as a float
        #[arg(long)]
        float: bool,

        /// Treat VALUE as a string
        #[arg(long)]
        string: bool,

        /// Treat VALUE as a boolean
        #[arg(long = "bool")]
        boolean: bool,

        /// Preference domain, e.g. com.apple.dock
        name: String,

        key: String,

        #[arg(required_unless_present = "global_domain")]
        value: Option<String>,
    },

    /// Delete a preference, or a whole domain when KEY is omitted
    RemoveDefault {
        /// Delete from NSGlobalDomain; NAME becomes the key
        #[arg(short = 'g', long = "globalDomain")]
        global_domain: bool,

        #[arg(short, long)]
        debug: bool,

        name: String,

        key: Option<String>,
    },

    /// Write every recorded preference
    ApplyDefaults,

    /// Set a custom application icon and record it
    SetIcon { app: String, icon: String },

    /// Restore an application's original icon
    RemoveIcon { app: String },

    /// Set every recorded icon
    ApplyIcons,

    /// Run the after-scripts of bootstrap.json
    RunScripts {
        #[arg(short, long)]
        debug: bool,
    },

    /// Replay bootstrap.json, defaults.json and icons.json on this machine
    Restore {
        #[arg(short, long)]
        debug: bool,
    },
}

impl Command {
    /// Canonical verb, flags and positional arguments in command-table terms
    fn parts(&self) -> (&'static str, FlagSet, Vec<String>) {
        match self {
            Self::Install {
                force,
                debug,
                verbose,
                formulas,
            } => (
                "install",
                flags(&[
                    (Flag::Force, *force),
                    (Flag::Debug, *debug),
                    (Flag::Verbose, *verbose),
                ]),
                formulas.clone(),
            ),
            Self::Rm {
                debug,
                verbose,
                formulas,
            } => (
                "rm",
                flags(&[(Flag::Debug, *debug), (Flag::Verbose, *verbose)]),
                formulas.clone(),
            ),
            Self::Tap {
                debug,
                verbose,
                tap,
            } => (
                "tap",
                flags(&[(Flag::Debug, *debug), (Flag::Verbose, *verbose)]),
                positionals(&[], tap.as_ref()),
            ),
            Self::Untap {
                debug,
                verbose,
                tap,
            } => (
                "untap",
                flags(&[(Flag::Debug, *debug), (Flag::Verbose, *verbose)]),
                positionals(&[tap], None),
            ),
            Self::Relink { debug, force } => (
                "relink",
                flags(&[(Flag::Debug, *debug), (Flag::Force, *force)]),
                Vec::new(),
            ),
            Self::List { formula } => ("list", FlagSet::EMPTY, positionals(&[], formula.as_ref())),
            Self::Missing { debug } => ("missing", flags(&[(Flag::Debug, *debug)]), Vec::new()),
            Self::Cask {
                force,
                debug,
                verbose,
                args,
            } => (
                "cask",
                flags(&[
                    (Flag::Force, *force),
                    (Flag::Debug, *debug),
                    (Flag::Verbose, *verbose),
                ]),
                args.clone(),
            ),
            Self::SetDefault {
                global_domain,
                force,
                debug,
                int,
                float,
                string,
                boolean,
                name,
                key,
                value,
            } => (
                "set-default",
                flags(&[
                    (Flag::GlobalDomain, *global_domain),
                    (Flag::Force, *force),
                    (Flag::Debug, *debug),
                    (Flag::Int, *int),
                    (Flag::Float, *float),
                    (Flag::Str, *string),
                    (Flag::Bool, *boolean),
                ]),
                positionals(&[name, key], value.as_ref()),
            ),
            Self::RemoveDefault {
                global_domain,
                debug,
                name,
                key,
            } => (
                "remove-default",
                flags(&[(Flag::GlobalDomain, *global_domain), (Flag::Debug, *debug)]),
                positionals(&[name], key.as_ref()),
            ),
            Self::ApplyDefaults => ("apply-defaults", FlagSet::EMPTY, Vec::new()),
            Self::SetIcon { app, icon } => {
                ("set-icon", FlagSet::EMPTY, positionals(&[app, icon], None))
            }
            Self::RemoveIcon { app } => ("remove-icon", FlagSet::EMPTY, positionals(&[app], None)),
            Self::ApplyIcons => ("apply-icons", FlagSet::EMPTY, Vec::new()),
            Self::RunScripts { debug } => {
                ("run-scripts", flags(&[(Flag::Debug, *debug)]), Vec::new())
            }
            Self::Restore { debug } => ("restore", flags(&[(Flag::Debug, *debug)]), Vec::new()),
        }
    }
}

fn flags(switches: &[(Flag, bool)]) -> FlagSet {
    switches
        .iter()
        .filter(|(_, on)| *on)
        .map(|(flag, _)| *flag)
        .collect()
}

fn positionals(required: &[&String], optional: Option<&String>) -> Vec<String> {
    required.iter().copied().chain(optional).cloned().collect()
}

impl Args {
    /// Look the parsed command up in the command table
    pub fn invocation(&self) -> Result<Invocation> {
        let (name, flags, positionals) = self.command.parts();
        let descriptor = table::command(name)
            .ok_or_else(|| CiderError::usage(format!("No such command \"{name}\".")))?;
        Ok(Invocation {
            descriptor,
            positionals,
            flags,
        })
    }
}

/// Rewrite raw arguments into the form clap parses.
///
/// A legacy verb (`write`, `delete`) is replaced by its canonical command.
/// The `defaults` type hints `-int`, `-float`, `-string` and `-bool` are
/// single-dash words, which clap would read as clusters of short flags, so
/// they are respelled as long flags. Nothing after `--` is touched.
pub fn normalize_argv<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut argv = argv.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = argv.next().into_iter().collect();
    let mut verb_seen = false;
    let mut options_done = false;

    for arg in argv {
        let rewritten = match arg.to_str() {
            Some(_) if options_done => None,
            Some("--") if verb_seen => {
                options_done = true;
                None
            }
            Some(text) if !verb_seen && !text.starts_with('-') => {
                verb_seen = true;
                Some(table::resolve_alias(text).to_string())
            }
            Some(text) if verb_seen && is_type_hint(text) => Some(format!("-{text}")),
            _ => None,
        };
        normalized.push(rewritten.map_or(arg, OsString::from));
    }
    normalized
}

fn is_type_hint(arg: &str) -> bool {
    Flag::ALL.iter().any(|flag| flag.type_hint() == Some(arg))
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse_from(normalize_argv(std::env::args_os()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(normalize_argv(argv.iter().copied()))
    }

    #[test]
    fn test_parse_basic_args() {
        let args = parse(&["cider", "install", "wget"]).unwrap();
        match args.command {
            Command::Install {
                force, formulas, ..
            } => {
                assert!(!force);
                assert_eq!(formulas, vec!["wget"]);
            }
            other => panic!("Expected Install command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_cask_flags_anywhere() {
        let args = parse(&["cider", "cask", "install", "-f", "firefox"]).unwrap();
        match args.command {
            Command::Cask { force, args, .. } => {
                assert!(force);
                assert_eq!(args, vec!["install", "firefox"]);
            }
            other => panic!("Expected Cask command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_alias_with_global_flag() {
        let args = parse(&["cider", "write", "-g", "Key", "1"]).unwrap();
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.descriptor.name, "set-default");
        assert!(invocation.has(Flag::GlobalDomain));
        assert_eq!(invocation.positionals, vec!["Key", "1"]);
    }

    #[test]
    fn test_parse_requires_command() {
        assert!(parse(&["cider"]).is_err());
    }

    #[test]
    fn test_command_help_shows_command_usage() {
        let err = parse(&["cider", "remove-default", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(
            err.to_string().contains("Usage: cider remove-default"),
            "{err}"
        );

        let err = parse(&["cider", "delete", "--help"]).unwrap_err();
        assert!(err.to_string().contains("Usage: cider remove-default"));
    }

    #[test]
    fn test_set_default_value_required_without_global_flag() {
        let err = parse(&["cider", "set-default", "com.apple.dock", "autohide"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(parse(&["cider", "set-default", "-g", "Key", "YES"]).is_ok());
    }

    #[test]
    fn test_set_default_accepts_negative_value() {
        let args = parse(&["cider", "set-default", "-int", "dom", "key", "-1"]).unwrap();
        let invocation = args.invocation().unwrap();
        assert!(invocation.has(Flag::Int));
        assert_eq!(invocation.positionals, vec!["dom", "key", "-1"]);
    }

    #[test]
    fn test_normalize_argv() {
        let normalized = normalize_argv(["cider", "write", "-bool", "dom", "key", "-float"]);
        assert_eq!(
            normalized,
            vec!["cider", "set-default", "--bool", "dom", "key", "--float"]
        );

        let normalized = normalize_argv(["cider", "delete", "--", "write", "-int"]);
        assert_eq!(normalized, vec!["cider", "remove-default", "--", "write", "-int"]);

        let normalized = normalize_argv(["cider", "--help"]);
        assert_eq!(normalized, vec!["cider", "--help"]);
    }

    #[test]
    fn test_every_subcommand_is_in_the_table() {
        let cli = Args::command();
        let names: Vec<&str> = cli.get_subcommands().map(|sub| sub.get_name()).collect();
        for name in &names {
            assert!(table::command(name).is_some(), "{name} has no descriptor");
        }
        for descriptor in table::COMMANDS {
            assert!(names.contains(&descriptor.name), "{} is not parsed", descriptor.name);
        }
    }

    #[test]
    fn test_parsed_flags_are_declared_by_descriptor() {
        let args = parse(&[
            "cider",
            "set-default",
            "-gfd",
            "-int",
            "-float",
            "-string",
            "-bool",
            "Key",
            "YES",
        ])
        .unwrap();
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.flags, invocation.descriptor.flags);
    }

    #[test]
    fn test_clap_definition_is_valid() {
        Args::command().debug_assert();
    }
}
