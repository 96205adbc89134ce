//! extra CLI entry point.

use clap::Parser;

use extra::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run { immediate } => {
            extra::cli::commands::run::execute(config, immediate, cli.json).await
        }
        Commands::Check => extra::cli::commands::check::execute(config, cli.json).await,
        Commands::Validate { show } => {
            extra::cli::commands::validate::execute(config, show, cli.json)
        }
        Commands::Quota => extra::cli::commands::quota::execute(config, cli.json).await,
    };

    if let Err(err) = result {
        extra::cli::handle_error(err, cli.json);
    }
}
