//! Export of the completion report to CSV, JSON or Excel.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use classdesk::libs::export::{ExportFormat, Exporter};
//!
//! let exporter = Exporter::new(ExportFormat::Excel, None);
//! exporter.export_stats(&[])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::stats::StudentCompletion;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADERS: [&str; 6] = ["Student ID", "Name", "Email", "Total", "Completed", "Completion %"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }
}

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    /// Without an explicit path the file is named after the current local
    /// time, e.g. `classdesk_stats_20250115_143022.csv`.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let output_path = output_path.unwrap_or_else(|| {
            PathBuf::from(format!(
                "classdesk_stats_{}.{}",
                Local::now().format("%Y%m%d_%H%M%S"),
                format.extension()
            ))
        });

        Self { format, output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export_stats(&self, stats: &[StudentCompletion]) -> Result<()> {
        match self.format {
            ExportFormat::Csv => self.export_csv(stats)?,
            ExportFormat::Json => {
                let json = serde_json::to_string_pretty(stats)?;
                File::create(&self.output_path)?.write_all(json.as_bytes())?;
            }
            ExportFormat::Excel => self.export_excel(stats)?,
        }

        msg_success!(Message::StatsExported(self.output_path.display().to_string()));
        Ok(())
    }

    fn export_csv(&self, stats: &[StudentCompletion]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;
        wtr.write_record(HEADERS)?;

        for row in stats {
            wtr.write_record(&[
                row.student_id.clone(),
                row.student_name.clone(),
                row.student_email.clone(),
                row.total_tasks.to_string(),
                row.completed_tasks.to_string(),
                format!("{:.1}", row.completion_rate),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn export_excel(&self, stats: &[StudentCompletion]) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Completion")?;

        let header_format = Format::new().set_bold().set_background_color(rust_xlsxwriter::Color::Gray);
        let percent_format = Format::new().set_num_format("0.0");

        for (col, title) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        for (i, row) in stats.iter().enumerate() {
            let r = i as u32 + 1;
            worksheet.write_string(r, 0, &row.student_id)?;
            worksheet.write_string(r, 1, &row.student_name)?;
            worksheet.write_string(r, 2, &row.student_email)?;
            worksheet.write_number(r, 3, row.total_tasks as f64)?;
            worksheet.write_number(r, 4, row.completed_tasks as f64)?;
            worksheet.write_number_with_format(r, 5, row.completion_rate, &percent_format)?;
        }

        worksheet.autofit();

        workbook.save(&self.output_path)?;
        Ok(())
    }
}
