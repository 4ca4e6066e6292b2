mod auth;
mod budget;
mod cli;
mod config;
mod duration;
mod error;
mod merge;
mod output;
mod providers;
mod records;
mod traversal;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting CISteps - GitHub Actions Step Telemetry");
    cli.execute().await?;

    Ok(())
}
