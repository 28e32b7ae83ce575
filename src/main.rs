use std::process::ExitCode;

use clap::Parser;
use sensorfeed::cli::{self, Cli};
use sensorfeed::utils::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the variables may come from the real environment.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    init_logging();
    if dotenv_loaded {
        log::debug!("Loaded environment from .env");
    }

    let cli = Cli::parse();
    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
