//! Routing a parsed invocation to the backend

use crate::{
    cli::{
        invocation::Invocation,
        table::{self, Arity, CommandDescriptor, Flag, FlagSet, Operation},
        terminal::Terminal,
    },
    core::Backend,
    error::{CiderError, Result},
};
use tracing::{debug, instrument};

/// Execute the command described by `invocation`
#[instrument(skip_all, fields(command = invocation.descriptor.name))]
pub fn execute_command<B, T>(
    invocation: &Invocation,
    backend: &mut B,
    terminal: &mut T,
) -> Result<()>
where
    B: Backend + ?Sized,
    T: Terminal + ?Sized,
{
    let descriptor = invocation.descriptor;
    let flags = invocation.flags;
    let args = &invocation.positionals;
    check_arity(descriptor, descriptor.arity_with(flags), flags, args)?;
    debug!("Dispatching {} with {} argument(s)", descriptor.name, args.len());

    let force = flags.contains(Flag::Force);
    let debug = flags.contains(Flag::Debug);
    let verbose = flags.contains(Flag::Verbose);

    match descriptor.operation {
        Operation::Install => backend.install(args, false, force, debug, verbose),
        Operation::Remove => backend.remove(args, false, debug, verbose),
        Operation::Tap => {
            let taps = backend.tap(args.first().map(String::as_str), debug, verbose)?;
            print_lines(terminal, &taps);
            Ok(())
        }
        Operation::Untap => backend.untap(&args[0], debug, verbose),
        Operation::Relink => backend.relink(debug, force),
        Operation::List => {
            let formulas = backend.list(args.first().map(String::as_str), false)?;
            print_lines(terminal, &formulas);
            Ok(())
        }
        Operation::Missing => {
            let missing = backend.list_missing(false, debug)?;
            print_lines(terminal, &missing);
            Ok(())
        }
        Operation::SetDefault => {
            let target = default_target(args, flags);
            match (target.key, target.value) {
                (Some(key), Some(value)) => {
                    backend.set_default(&target.domain, &key, &value, force, debug)
                }
                _ => Err(CiderError::usage("Missing argument \"VALUE\".")),
            }
        }
        Operation::RemoveDefault => {
            // With -g and a single argument the key is deliberately absent
            let target = default_target(args, flags);
            backend.remove_default(&target.domain, target.key.as_deref(), debug)
        }
        Operation::ApplyDefaults => backend.apply_defaults(),
        Operation::SetIcon => backend.set_icon(&args[0], &args[1]),
        Operation::RemoveIcon => backend.remove_icon(&args[0]),
        Operation::ApplyIcons => backend.apply_icons(),
        Operation::RunScripts => backend.run_scripts(debug),
        Operation::Restore => backend.restore(debug),
        Operation::Cask => execute_cask_command(invocation, backend, terminal),
    }
}

/// Run `cask <command> ARGS...` against the cask sub-table
fn execute_cask_command<B, T>(
    invocation: &Invocation,
    backend: &mut B,
    terminal: &mut T,
) -> Result<()>
where
    B: Backend + ?Sized,
    T: Terminal + ?Sized,
{
    let Some((inner, args)) = invocation.positionals.split_first() else {
        return Err(CiderError::usage("Missing argument \"COMMAND\"."));
    };
    let descriptor = table::cask_command(inner)
        .ok_or_else(|| CiderError::usage(format!("No such cask command \"{inner}\".")))?;

    let flags = table::filter_flags(invocation.flags, descriptor.flags);
    check_arity(descriptor, descriptor.arity, flags, args)?;
    debug!("Dispatching cask {} with flags {:?}", descriptor.name, flags);

    let force = flags.contains(Flag::Force);
    let debug = flags.contains(Flag::Debug);
    let verbose = flags.contains(Flag::Verbose);

    match descriptor.operation {
        Operation::Install => backend.install(args, true, force, debug, verbose),
        Operation::Remove => backend.remove(args, true, debug, verbose),
        Operation::Missing => {
            let missing = backend.list_missing(true, debug)?;
            print_lines(terminal, &missing);
            Ok(())
        }
        Operation::List => {
            let casks = backend.list(args.first().map(String::as_str), true)?;
            print_lines(terminal, &casks);
            Ok(())
        }
        other => Err(CiderError::domain(format!(
            "cask table maps {} to unsupported operation {other:?}",
            descriptor.name
        ))),
    }
}

fn default_target(args: &[String], flags: FlagSet) -> table::DefaultTarget {
    let mut args = args.iter().cloned();
    let name = args.next().unwrap_or_default();
    let global = flags.contains(Flag::GlobalDomain);
    table::normalize_global_domain(name, args.next(), args.next(), global)
}

/// Reject missing or surplus positionals before anything reaches the backend
fn check_arity(
    descriptor: &CommandDescriptor,
    arity: Arity,
    flags: FlagSet,
    args: &[String],
) -> Result<()> {
    if args.len() < arity.min {
        // Under -g the first metavar is consumed by the implied domain
        let offset = usize::from(arity != descriptor.arity);
        let metavar = descriptor
            .metavars
            .get(args.len() + offset)
            .or_else(|| descriptor.metavars.last())
            .copied()
            .unwrap_or("ARG");
        debug!("{} rejected with flags {:?}", descriptor.name, flags);
        return Err(CiderError::usage(format!("Missing argument \"{metavar}\".")));
    }
    if let Some(max) = arity.max {
        if let Some(extra) = args.get(max) {
            return Err(CiderError::usage(format!(
                "Got unexpected extra argument ({extra})"
            )));
        }
    }
    Ok(())
}

fn print_lines<T: Terminal + ?Sized>(terminal: &mut T, lines: &[String]) {
    for line in lines {
        terminal.out(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cli::{report::tests::RecordingTerminal, table::GLOBAL_DOMAIN},
        core::{PackageManager, PreferenceStore},
    };

    /// One recorded backend call
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Install(Vec<String>, bool, bool, bool, bool),
        Remove(Vec<String>, bool, bool, bool),
        List(Option<String>, bool),
        Missing(bool, bool),
        Tap(Option<String>, bool, bool),
        Untap(String, bool, bool),
        Relink(bool, bool),
        SetDefault(String, String, String, bool, bool),
        RemoveDefault(String, Option<String>, bool),
        ApplyDefaults,
        SetIcon(String, String),
        RemoveIcon(String),
        ApplyIcons,
        RunScripts(bool),
        Restore(bool),
    }

    #[derive(Default)]
    struct SpyBackend {
        calls: Vec<Call>,
        listing: Vec<String>,
    }

    impl PackageManager for SpyBackend {
        fn install(&mut self, n: &[String], c: bool, f: bool, d: bool, v: bool) -> Result<()> {
            self.calls.push(Call::Install(n.to_vec(), c, f, d, v));
            Ok(())
        }
        fn remove(&mut self, n: &[String], c: bool, d: bool, v: bool) -> Result<()> {
            self.calls.push(Call::Remove(n.to_vec(), c, d, v));
            Ok(())
        }
        fn list(&mut self, filter: Option<&str>, cask: bool) -> Result<Vec<String>> {
            self.calls.push(Call::List(filter.map(String::from), cask));
            Ok(self.listing.clone())
        }
        fn list_missing(&mut self, cask: bool, debug: bool) -> Result<Vec<String>> {
            self.calls.push(Call::Missing(cask, debug));
            Ok(self.listing.clone())
        }
        fn tap(&mut self, name: Option<&str>, d: bool, v: bool) -> Result<Vec<String>> {
            self.calls.push(Call::Tap(name.map(String::from), d, v));
            Ok(Vec::new())
        }
        fn untap(&mut self, name: &str, d: bool, v: bool) -> Result<()> {
            self.calls.push(Call::Untap(name.to_string(), d, v));
            Ok(())
        }
        fn relink(&mut self, debug: bool, force: bool) -> Result<()> {
            self.calls.push(Call::Relink(debug, force));
            Ok(())
        }
    }

    impl PreferenceStore for SpyBackend {
        fn set_default(&mut self, dom: &str, key: &str, val: &str, f: bool, d: bool) -> Result<()> {
            self.calls.push(Call::SetDefault(dom.into(), key.into(), val.into(), f, d));
            Ok(())
        }
        fn remove_default(&mut self, dom: &str, key: Option<&str>, d: bool) -> Result<()> {
            self.calls.push(Call::RemoveDefault(dom.into(), key.map(String::from), d));
            Ok(())
        }
        fn apply_defaults(&mut self) -> Result<()> {
            self.calls.push(Call::ApplyDefaults);
            Ok(())
        }
        fn set_icon(&mut self, app: &str, icon: &str) -> Result<()> {
            self.calls.push(Call::SetIcon(app.into(), icon.into()));
            Ok(())
        }
        fn remove_icon(&mut self, app: &str) -> Result<()> {
            self.calls.push(Call::RemoveIcon(app.into()));
            Ok(())
        }
        fn apply_icons(&mut self) -> Result<()> {
            self.calls.push(Call::ApplyIcons);
            Ok(())
        }
        fn run_scripts(&mut self, debug: bool) -> Result<()> {
            self.calls.push(Call::RunScripts(debug));
            Ok(())
        }
        fn restore(&mut self, debug: bool) -> Result<()> {
            self.calls.push(Call::Restore(debug));
            Ok(())
        }
    }

    fn run(verb: &str, args: &[&str]) -> (Result<()>, SpyBackend, RecordingTerminal) {
        let mut backend = SpyBackend {
            listing: vec!["wget".to_string(), "jq".to_string()],
            ..SpyBackend::default()
        };
        let mut terminal = RecordingTerminal::default();
        let result = Invocation::parse(verb, args)
            .and_then(|inv| execute_command(&inv, &mut backend, &mut terminal));
        (result, backend, terminal)
    }

    fn calls(verb: &str, args: &[&str]) -> Vec<Call> {
        let (result, backend, _) = run(verb, args);
        result.unwrap();
        backend.calls
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_install_plain() {
        assert_eq!(
            calls("install", &["wget"]),
            vec![Call::Install(strings(&["wget"]), false, false, false, false)]
        );
    }

    #[test]
    fn test_install_with_flags() {
        assert_eq!(
            calls("install", &["-f", "-v", "wget", "jq"]),
            vec![Call::Install(strings(&["wget", "jq"]), false, true, false, true)]
        );
    }

    #[test]
    fn test_cask_install_force() {
        assert_eq!(
            calls("cask", &["install", "firefox", "-f"]),
            vec![Call::Install(strings(&["firefox"]), true, true, false, false)]
        );
    }

    #[test]
    fn test_cask_filters_undeclared_flags() {
        assert_eq!(
            calls("cask", &["rm", "-f", "-v", "-d", "firefox"]),
            vec![Call::Remove(strings(&["firefox"]), true, true, true)]
        );
        assert_eq!(calls("cask", &["missing", "-f", "-v"]), vec![Call::Missing(true, false)]);
        assert_eq!(
            calls("cask", &["list", "-fvd"]),
            vec![Call::List(None, true)]
        );
    }

    #[test]
    fn test_cask_list_with_filter_prints() {
        let (result, backend, terminal) = run("cask", &["list", "fire"]);
        result.unwrap();
        assert_eq!(backend.calls, vec![Call::List(Some("fire".into()), true)]);
        assert_eq!(terminal.stdout, strings(&["wget", "jq"]));
    }

    #[test]
    fn test_cask_unknown_inner_command() {
        let (result, backend, _) = run("cask", &["upgrade", "x"]);
        let err = result.unwrap_err();
        assert!(matches!(err, CiderError::Usage { .. }));
        assert_eq!(err.to_string(), "No such cask command \"upgrade\".");
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn test_cask_without_inner_command() {
        let (result, backend, _) = run("cask", &["-f"]);
        assert!(matches!(result, Err(CiderError::Usage { .. })));
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn test_required_arity_checked_before_backend() {
        for (verb, args) in [
            ("install", vec![]),
            ("install", vec!["-f"]),
            ("rm", vec!["-v"]),
            ("untap", vec![]),
            ("set-default", vec!["com.apple.dock", "autohide"]),
            ("set-icon", vec!["Safari"]),
            ("cask", vec!["install"]),
            ("cask", vec!["rm", "-d"]),
        ] {
            let (result, backend, _) = run(verb, &args);
            assert!(
                matches!(result, Err(CiderError::Usage { .. })),
                "{verb} {args:?} should be a usage error"
            );
            assert!(backend.calls.is_empty(), "{verb} {args:?} reached the backend");
        }
    }

    fn invocation(name: &str, positionals: &[&str], flags: &[Flag]) -> Invocation {
        Invocation {
            descriptor: table::command(name).unwrap(),
            positionals: strings(positionals),
            flags: FlagSet::of(flags),
        }
    }

    fn dispatch(invocation: &Invocation) -> (Result<()>, SpyBackend) {
        let mut backend = SpyBackend::default();
        let mut terminal = RecordingTerminal::default();
        let result = execute_command(invocation, &mut backend, &mut terminal);
        (result, backend)
    }

    #[test]
    fn test_missing_argument_message_names_argument() {
        let (result, backend) = dispatch(&invocation("install", &[], &[]));
        assert_eq!(result.unwrap_err().to_string(), "Missing argument \"FORMULA...\".");
        assert!(backend.calls.is_empty());

        let (result, _) = dispatch(&invocation("set-default", &["Key"], &[Flag::GlobalDomain]));
        assert_eq!(result.unwrap_err().to_string(), "Missing argument \"VALUE\".");

        let (result, _, _) = run("set-default", &["-g", "Key"]);
        assert!(matches!(result, Err(CiderError::Usage { .. })));
    }

    #[test]
    fn test_extra_argument_rejected() {
        let (result, backend) = dispatch(&invocation("relink", &["now"], &[]));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Got unexpected extra argument (now)"
        );
        assert!(backend.calls.is_empty());

        let (result, backend, _) = run("relink", &["now"]);
        assert!(matches!(result, Err(CiderError::Usage { .. })));
        assert!(backend.calls.is_empty());

        let (result, _, _) = run("set-default", &["dom", "key", "value", "extra"]);
        assert!(matches!(result, Err(CiderError::Usage { .. })));
    }

    #[test]
    fn test_set_default_global_drops_trailing_value() {
        assert_eq!(
            calls("set-default", &["-g", "A", "B", "C"]),
            vec![Call::SetDefault(
                GLOBAL_DOMAIN.into(),
                "A".into(),
                "B".into(),
                false,
                false
            )]
        );
    }

    #[test]
    fn test_remove_default_global_drops_trailing_key() {
        assert_eq!(
            calls("remove-default", &["-g", "A", "B"]),
            vec![Call::RemoveDefault(GLOBAL_DOMAIN.into(), Some("A".into()), false)]
        );
        let (result, _) = dispatch(&invocation(
            "remove-default",
            &["A", "B"],
            &[Flag::GlobalDomain, Flag::Debug],
        ));
        result.unwrap();
    }

    #[test]
    fn test_set_default_global_domain() {
        assert_eq!(
            calls("set-default", &["-g", "AppleShowAllExtensions", "YES"]),
            vec![Call::SetDefault(
                GLOBAL_DOMAIN.into(),
                "AppleShowAllExtensions".into(),
                "YES".into(),
                false,
                false
            )]
        );
    }

    #[test]
    fn test_global_shift_matches_explicit_domain() {
        assert_eq!(
            calls("set-default", &["-g", "KEY", "VALUE"]),
            calls("set-default", &[GLOBAL_DOMAIN, "KEY", "VALUE"])
        );
        assert_eq!(
            calls("remove-default", &["-g", "KEY"]),
            calls("remove-default", &[GLOBAL_DOMAIN, "KEY"])
        );
    }

    #[test]
    fn test_remove_default_global_single_argument() {
        assert_eq!(
            calls("remove-default", &["-g", "com.apple.finder"]),
            vec![Call::RemoveDefault(
                GLOBAL_DOMAIN.into(),
                Some("com.apple.finder".into()),
                false
            )]
        );
    }

    #[test]
    fn test_remove_default_without_key() {
        assert_eq!(
            calls("remove-default", &["-d", "com.apple.dock"]),
            vec![Call::RemoveDefault("com.apple.dock".into(), None, true)]
        );
    }

    #[test]
    fn test_type_hints_are_not_forwarded() {
        assert_eq!(
            calls("set-default", &["-int", "com.apple.dock", "tilesize", "36"]),
            vec![Call::SetDefault(
                "com.apple.dock".into(),
                "tilesize".into(),
                "36".into(),
                false,
                false
            )]
        );
    }

    #[test]
    fn test_aliases_behave_like_targets() {
        for (alias, target) in table::ALIASES {
            let args = ["-g", "com.apple.finder", "1"];
            let args: &[&str] = if *target == "remove-default" { &args[..2] } else { &args };
            assert_eq!(calls(alias, args), calls(target, args));
        }
    }

    #[test]
    fn test_tap_and_untap() {
        assert_eq!(calls("tap", &[]), vec![Call::Tap(None, false, false)]);
        assert_eq!(
            calls("tap", &["-v", "homebrew/cask-fonts"]),
            vec![Call::Tap(Some("homebrew/cask-fonts".into()), false, true)]
        );
        assert_eq!(
            calls("untap", &["-d", "homebrew/cask-fonts"]),
            vec![Call::Untap("homebrew/cask-fonts".into(), true, false)]
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(calls("relink", &["-f"]), vec![Call::Relink(false, true)]);
        assert_eq!(calls("missing", &["-d"]), vec![Call::Missing(false, true)]);
        assert_eq!(calls("apply-defaults", &[]), vec![Call::ApplyDefaults]);
        assert_eq!(
            calls("set-icon", &["Safari", "~/icons/safari.icns"]),
            vec![Call::SetIcon("Safari".into(), "~/icons/safari.icns".into())]
        );
        assert_eq!(calls("remove-icon", &["Safari"]), vec![Call::RemoveIcon("Safari".into())]);
        assert_eq!(calls("apply-icons", &[]), vec![Call::ApplyIcons]);
        assert_eq!(calls("run-scripts", &["-d"]), vec![Call::RunScripts(true)]);
        assert_eq!(calls("restore", &[]), vec![Call::Restore(false)]);
    }

    #[test]
    fn test_list_prints_backend_output() {
        let (result, backend, terminal) = run("list", &["wg"]);
        result.unwrap();
        assert_eq!(backend.calls, vec![Call::List(Some("wg".into()), false)]);
        assert_eq!(terminal.stdout, strings(&["wget", "jq"]));
    }
}
