use crate::db::db::Db;
use crate::db::tasks::Tasks;
use crate::libs::config::Config;
use crate::libs::export::{ExportFormat, Exporter};
use crate::libs::messages::Message;
use crate::libs::stats::rank;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Write the report to a file in this format instead of printing it
    #[arg(short, long, value_enum)]
    export: Option<ExportFormat>,

    /// Output file; a timestamped name is generated when omitted
    #[arg(short, long, requires = "export")]
    output: Option<PathBuf>,
}

pub fn cmd(args: StatsArgs) -> Result<()> {
    let db = Db::open(&Config::read_database()?)?;
    let stats = rank(Tasks::new(&db.conn).completion_groups()?);

    if let Some(format) = args.export {
        return Exporter::new(format, args.output).export_stats(&stats);
    }

    if stats.is_empty() {
        msg_info!(Message::NoStatistics);
        return Ok(());
    }
    msg_print!(Message::StatsHeader, true);
    View::stats(&stats);

    Ok(())
}
