//! Markcheck CLI: markdown price verification against the live catalog
//!
//! ## Usage
//!
//! ```bash
//! markcheck run --env staging                # Verify every row
//! markcheck run --env staging --rows 2-5     # Verify a range of rows
//! markcheck reset                            # Clear previous results
//! markcheck envs                             # List configured environments
//! ```

use clap::Parser;
use markcheck_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands, Reporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    logging::init_logging(&config);
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match &cli.command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime
                .block_on(handlers::run(&cli.config, args, &reporter))
                .map(|_| ())
        }
        Commands::Reset(args) => handlers::reset(&cli.config, args, &reporter),
        Commands::Envs => handlers::envs(&cli.config, &reporter),
    }
}
