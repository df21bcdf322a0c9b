//! trigdep CLI entry point.

use anyhow::Result;
use clap::Parser;

use trigdep::cli::{commands, Cli, Commands};
use trigdep::infrastructure::logging::LoggerImpl;
use trigdep::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        trigdep::cli::handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Init(args) => commands::init::execute(args, &config, cli.json).await,
        Commands::Host(args) => commands::host::execute(args, &config, cli.json).await,
        Commands::Trigger(args) => commands::trigger::execute(args, &config, cli.json).await,
    }
}
