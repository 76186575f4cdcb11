//! Command table, aliases and argument normalization
//!
//! Every verb cider understands is described once by a static
//! [`CommandDescriptor`]. The helpers in this module are pure data
//! transforms: they never touch a backend and never fail.

use std::fmt;

/// Preference domain shared by all applications
pub const GLOBAL_DOMAIN: &str = "NSGlobalDomain";

/// A boolean command-line flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Force,
    Debug,
    Verbose,
    GlobalDomain,
    /// Type hints for `set-default`, accepted and never forwarded
    Int,
    Float,
    Str,
    Bool,
}

impl Flag {
    pub const ALL: [Self; 8] = [
        Self::Force,
        Self::Debug,
        Self::Verbose,
        Self::GlobalDomain,
        Self::Int,
        Self::Float,
        Self::Str,
        Self::Bool,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Single-dash spelling of a `defaults` type hint, e.g. `-int`
    #[must_use]
    pub const fn type_hint(self) -> Option<&'static str> {
        match self {
            Self::Int => Some("-int"),
            Self::Float => Some("-float"),
            Self::Str => Some("-string"),
            Self::Bool => Some("-bool"),
            Self::Force | Self::Debug | Self::Verbose | Self::GlobalDomain => None,
        }
    }
}

/// A set of flags, fixed-size and `Copy`
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSet(u16);

impl FlagSet {
    pub const EMPTY: Self = Self(0);

    /// Build a set from a list of flags
    #[must_use]
    pub const fn of(flags: &[Flag]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < flags.len() {
            bits |= flags[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn contains(self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn insert(&mut self, flag: Flag) {
        self.0 |= flag.bit();
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

/// How many positional arguments a command takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` means unbounded
    pub max: Option<usize>,
}

impl Arity {
    pub const NONE: Self = Self::range(0, Some(0));
    pub const OPTIONAL: Self = Self::range(0, Some(1));
    pub const ONE: Self = Self::range(1, Some(1));
    pub const ONE_OR_MORE: Self = Self::range(1, None);

    #[must_use]
    pub const fn range(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self::range(n, Some(n))
    }

    /// Arity once `-g` has taken the domain slot.
    ///
    /// One fewer argument is required, but never fewer than one. The maximum
    /// is kept: a trailing argument that no longer has a slot is dropped by
    /// [`normalize_global_domain`].
    #[must_use]
    pub fn shifted(self) -> Self {
        Self {
            min: self.min.saturating_sub(1).max(1),
            max: self.max,
        }
    }
}

/// Identifier of the operation a verb dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Remove,
    Tap,
    Untap,
    Relink,
    List,
    Missing,
    Cask,
    SetDefault,
    RemoveDefault,
    ApplyDefaults,
    SetIcon,
    RemoveIcon,
    ApplyIcons,
    RunScripts,
    Restore,
}

/// Static description of one verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Canonical name as typed on the command line
    pub name: &'static str,
    pub operation: Operation,
    /// Flags the command accepts
    pub flags: FlagSet,
    pub arity: Arity,
    /// Names of the positional arguments, used in usage messages
    pub metavars: &'static [&'static str],
}

impl CommandDescriptor {
    const fn new(
        name: &'static str,
        operation: Operation,
        flags: &[Flag],
        arity: Arity,
        metavars: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            operation,
            flags: FlagSet::of(flags),
            arity,
            metavars,
        }
    }

    /// Positional arity once the given flags are applied
    #[must_use]
    pub fn arity_with(&self, flags: FlagSet) -> Arity {
        if self.flags.contains(Flag::GlobalDomain) && flags.contains(Flag::GlobalDomain) {
            self.arity.shifted()
        } else {
            self.arity
        }
    }
}

/// Top-level commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(
        "install",
        Operation::Install,
        &[Flag::Force, Flag::Debug, Flag::Verbose],
        Arity::ONE_OR_MORE,
        &["FORMULA..."],
    ),
    CommandDescriptor::new(
        "rm",
        Operation::Remove,
        &[Flag::Debug, Flag::Verbose],
        Arity::ONE_OR_MORE,
        &["FORMULA..."],
    ),
    CommandDescriptor::new(
        "tap",
        Operation::Tap,
        &[Flag::Debug, Flag::Verbose],
        Arity::OPTIONAL,
        &["TAP"],
    ),
    CommandDescriptor::new(
        "untap",
        Operation::Untap,
        &[Flag::Debug, Flag::Verbose],
        Arity::ONE,
        &["TAP"],
    ),
    CommandDescriptor::new(
        "relink",
        Operation::Relink,
        &[Flag::Debug, Flag::Force],
        Arity::NONE,
        &[],
    ),
    CommandDescriptor::new("list", Operation::List, &[], Arity::OPTIONAL, &["FORMULA"]),
    CommandDescriptor::new("missing", Operation::Missing, &[Flag::Debug], Arity::NONE, &[]),
    CommandDescriptor::new(
        "cask",
        Operation::Cask,
        &[Flag::Force, Flag::Debug, Flag::Verbose],
        Arity::ONE_OR_MORE,
        &["COMMAND", "ARG..."],
    ),
    CommandDescriptor::new(
        "set-default",
        Operation::SetDefault,
        &[
            Flag::GlobalDomain,
            Flag::Force,
            Flag::Debug,
            Flag::Int,
            Flag::Float,
            Flag::Str,
            Flag::Bool,
        ],
        Arity::exactly(3),
        &["NAME", "KEY", "VALUE"],
    ),
    CommandDescriptor::new(
        "remove-default",
        Operation::RemoveDefault,
        &[Flag::GlobalDomain, Flag::Debug],
        Arity::range(1, Some(2)),
        &["NAME", "KEY"],
    ),
    CommandDescriptor::new("apply-defaults", Operation::ApplyDefaults, &[], Arity::NONE, &[]),
    CommandDescriptor::new(
        "set-icon",
        Operation::SetIcon,
        &[],
        Arity::exactly(2),
        &["APP", "ICON"],
    ),
    CommandDescriptor::new("remove-icon", Operation::RemoveIcon, &[], Arity::ONE, &["APP"]),
    CommandDescriptor::new("apply-icons", Operation::ApplyIcons, &[], Arity::NONE, &[]),
    CommandDescriptor::new(
        "run-scripts",
        Operation::RunScripts,
        &[Flag::Debug],
        Arity::NONE,
        &[],
    ),
    CommandDescriptor::new("restore", Operation::Restore, &[Flag::Debug], Arity::NONE, &[]),
];

/// Commands reachable as `cask <command>`; all of them run with `cask=true`
pub static CASK_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(
        "install",
        Operation::Install,
        &[Flag::Force, Flag::Verbose, Flag::Debug],
        Arity::ONE_OR_MORE,
        &["FORMULA..."],
    ),
    CommandDescriptor::new(
        "rm",
        Operation::Remove,
        &[Flag::Verbose, Flag::Debug],
        Arity::ONE_OR_MORE,
        &["FORMULA..."],
    ),
    CommandDescriptor::new("missing", Operation::Missing, &[Flag::Debug], Arity::NONE, &[]),
    CommandDescriptor::new(
        "list",
        Operation::List,
        &[Flag::Debug],
        Arity::OPTIONAL,
        &["FORMULA"],
    ),
];

/// Legacy verbs and the canonical command they stand for
pub static ALIASES: &[(&str, &str)] = &[("write", "set-default"), ("delete", "remove-default")];

/// Map an alias to its canonical verb; anything else passes through unchanged
#[must_use]
pub fn resolve_alias(verb: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == verb)
        .map_or(verb, |(_, canonical)| canonical)
}

/// Look up a canonical top-level command
#[must_use]
pub fn command(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|descriptor| descriptor.name == name)
}

/// Look up a command of the `cask` sub-table
#[must_use]
pub fn cask_command(name: &str) -> Option<&'static CommandDescriptor> {
    CASK_COMMANDS.iter().find(|descriptor| descriptor.name == name)
}

/// Keep only the flags the target command declares
#[must_use]
pub const fn filter_flags(flags: FlagSet, accepted: FlagSet) -> FlagSet {
    flags.intersection(accepted)
}

/// Where a preference write or delete lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTarget {
    pub domain: String,
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Re-map `NAME KEY VALUE` when `-g` is given.
///
/// With `global` set the domain becomes [`GLOBAL_DOMAIN`] and the arguments
/// move one slot to the right: `name` becomes the key, `key` becomes the
/// value and `value` is dropped. A missing `key` leaves the value absent.
#[must_use]
pub fn normalize_global_domain(
    name: String,
    key: Option<String>,
    value: Option<String>,
    global: bool,
) -> DefaultTarget {
    if global {
        DefaultTarget {
            domain: GLOBAL_DOMAIN.to_string(),
            key: Some(name),
            value: key,
        }
    } else {
        DefaultTarget {
            domain: name,
            key,
            value,
        }
    }
}
