#![allow(clippy::cargo_common_metadata)]
use cider::{
    cli::{self, ConsoleTerminal, Terminal},
    config::Config,
    core::Cider,
    error::Result,
    setup_logging,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = cli::parse_args();
    let mut terminal = ConsoleTerminal::new();

    match run(&args, &mut terminal) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = cli::report(&e, &mut terminal);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(args: &cli::Args, terminal: &mut impl Terminal) -> Result<()> {
    let invocation = args.invocation()?;

    // Setup logging based on the command's debug flag
    setup_logging(invocation.debug())?;

    // Initialize configuration
    let config = Config::from_invocation(&invocation)?;
    let mut backend = Cider::new(config)?;

    // Execute the appropriate command
    cli::execute_command(&invocation, &mut backend, terminal)
}
