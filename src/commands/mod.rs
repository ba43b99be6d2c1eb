//! Command-line interface.
//!
//! `serve` runs the HTTP API; the other commands work directly on the
//! database file and are meant for the operator of the service.

pub mod admin;
pub mod serve;
pub mod stats;
pub mod students;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve(serve::ServeArgs),
    #[command(about = "Create an admin account")]
    Admin(admin::AdminArgs),
    #[command(about = "List registered students")]
    Students,
    #[command(about = "Show or export completion statistics")]
    Stats(stats::StatsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Serve(args) => serve::cmd(args).await,
            Commands::Admin(args) => admin::cmd(args),
            Commands::Students => students::cmd(),
            Commands::Stats(args) => stats::cmd(args),
        }
    }
}
