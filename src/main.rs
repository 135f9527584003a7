//! PhishGuard - Main Entry Point

mod cli;
mod logic;
pub mod constants;

use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    std::process::exit(cli::run(args));
}
