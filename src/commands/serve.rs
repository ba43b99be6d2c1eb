use crate::api;
use crate::libs::config::Config;
use crate::libs::messages::macros::enable_log_mode;
use anyhow::Result;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding CLASSDESK_ADDR
    #[arg(short, long)]
    addr: Option<SocketAddr>,

    /// SQLite database file, overriding CLASSDESK_DATABASE
    #[arg(short, long)]
    database: Option<PathBuf>,
}

pub async fn cmd(args: ServeArgs) -> Result<()> {
    enable_log_mode();

    let mut config = Config::read()?;
    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    if let Some(database) = args.database {
        config.database = database;
    }
    tracing::debug!(?config, "resolved configuration");

    api::serve(&config).await
}
