use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use validate_json::config::{ConfigManager, SystemEnvProvider};
use validate_json::error::EXIT_USAGE;
use validate_json::logging::init_logging;
use validate_json::{Cli, app};

#[tokio::main]
async fn main() -> ExitCode {
    if Cli::requests_version(std::env::args_os().skip(1)) {
        println!("{}", Cli::version_string());
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    let config = match ConfigManager::load_config(&cli, &SystemEnvProvider).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprint!("{}", Cli::usage());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    init_logging(config.logging.format, config.logging.level);
    tracing::debug!(?config, "configuration loaded");

    match app::run(&cli, &config, std::io::stdout()).await {
        Ok((status, _)) => status.into(),
        Err(e) => {
            eprintln!("{e}");
            if e.is_usage() {
                eprint!("{}", Cli::usage());
            }
            ExitCode::from(e.exit_code())
        }
    }
}
