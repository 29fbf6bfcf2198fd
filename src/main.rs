//! chainsim CLI - chain-reaction simulator
//!
//! Command-line interface for running simulations.

use std::process::ExitCode;

use chainsim::cli::{run_cli, Args};

fn main() -> ExitCode {
    let args = Args::parse();
    let default_filter = if args.verbose() { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    run_cli(args)
}
