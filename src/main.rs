use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linguality::cli::{Cli, Commands};
use linguality::{config, content, library, practice, reader, vocabulary};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Read(args) => reader::commands::run(args).await?,
        Commands::Words(args) => vocabulary::commands::run(args).await?,
        Commands::Library(args) => library::commands::run(args).await?,
        Commands::Practice(args) => practice::commands::run(args).await?,
        Commands::Cache(args) => content::commands::run(args)?,
        Commands::Config(args) => config::commands::run(args)?,
    }

    Ok(())
}
