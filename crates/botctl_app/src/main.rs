use std::process::ExitCode;

use botctl_app::cli::{self, Cli};
use botctl_app::logging;
use botctl_logging::ctl_error;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(
        cli.log_destination(),
        botctl_logging::level_for_verbosity(cli.verbose),
    );

    match cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            ctl_error!("botctl failed: {:#}", err);
            eprintln!("botctl: {err:#}");
            ExitCode::FAILURE
        }
    }
}
