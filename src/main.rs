//! cfapi - issue named Cloud Controller V3 requests

use clap::Parser;
use log::info;

use cfapi::cli::{run, Cli};
use cfapi::version::version_string;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting cfapi v{}", version_string());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        if e.requires_login() {
            eprintln!("Log in again to obtain new tokens.");
        }
        std::process::exit(1);
    }
}
