use clap::Parser;
use news_aggregator::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Api => cli::api::run().await,
        Command::Ingest(args) => cli::ingest::run(args).await,
        Command::Migrate => cli::migrate::run().await,
    }
}
