use anyhow::Result;
use clap::Parser;
use tallyhand::cli::Cli;
use tallyhand::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    cli.run().await
}
