use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use courier::cli::{self, Cli};
use courier_common::logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    if cli.wants_usage() {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    logging::init();

    match cli::run(&cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(failure) => {
            eprintln!("- Error: {failure}");
            Ok(ExitCode::from(failure.exit_code()))
        }
    }
}
