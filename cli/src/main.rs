mod commands;
mod input;
mod report;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, check, probe};
use reachr_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
    };

    print::banner(cfg.no_banner, cfg.quiet);

    let code: ExitCode = match commands.command {
        Commands::Check(args) => check::check(args, &cfg).await?,
        Commands::Probe {
            target,
            timeout_secs,
        } => probe::probe(target, timeout_secs, &cfg).await?,
    };

    if cfg.quiet == 0 {
        print::end_of_program();
    }
    Ok(code)
}
