use clap::Parser;
use tracing_subscriber::EnvFilter;

use wakegate::cli::{Cli, Commands};
use wakegate::handlers::HandlerRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level)?)
        .init();

    match cli.command {
        Commands::Server(args) => wakegate::api::run(args).await?,
        Commands::ListHandlers => list_handlers(),
    }

    Ok(())
}

fn list_handlers() {
    let registry = HandlerRegistry::with_defaults();

    println!("Available handlers:");
    println!("{}", "-".repeat(25));
    for spec in registry.specs() {
        println!("> {}", spec.key);
        println!("{}", spec.summary);
        println!("{}", spec.description);
        if !spec.required_options.is_empty() {
            println!("required options:");
            for key in spec.required_options {
                println!("- {key}");
            }
        }
        println!("{}", "-".repeat(25));
    }
}
