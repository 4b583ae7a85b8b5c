use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wakegate")]
#[command(about = "Wake-on-LAN redirect gateway", long_about = None)]
pub struct Cli {
    /// Log filter directive, e.g. "info" or "wakegate=debug"
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the redirect gateway
    Server(ServerArgs),
    /// List the registered handler types and their required options
    ListHandlers,
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides the configuration)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Configuration file path (overrides $WAKEGATE_CONFIG)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}
