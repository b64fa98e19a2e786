mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, scan, services};
use probr_common::config::Config;
use terminal::{logging, print};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    let machine_output = matches!(&commands.command, Commands::Scan(args) if args.json);
    logging::init(commands.verbose, machine_output);

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
    };

    if !machine_output {
        print::banner(cfg.no_banner, cfg.quiet);
    }

    let result: anyhow::Result<()> = match commands.command {
        Commands::Scan(args) => scan::scan(args, &cfg).await,
        Commands::Services => {
            services::services(&cfg);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
