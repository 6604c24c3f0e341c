use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::format::{format_percent, format_timestamp};
use crate::system::snapshot::Snapshot;

pub const CSV_HEADER: &str = "Timestamp,CPU Usage (%),Memory Usage (%),Disk Usage (%)";

pub fn console_line(snapshot: &Snapshot) -> String {
    format!(
        "{} - CPU: {}%, Memory: {}%, Disk: {}%",
        format_timestamp(&snapshot.timestamp),
        format_percent(snapshot.cpu_percent),
        format_percent(snapshot.memory_percent),
        format_percent(snapshot.disk_percent),
    )
}

/// Timestamp followed by the three percentages, unrounded.
pub fn csv_record(snapshot: &Snapshot) -> [String; 4] {
    [
        format_timestamp(&snapshot.timestamp),
        snapshot.cpu_percent.to_string(),
        snapshot.memory_percent.to_string(),
        snapshot.disk_percent.to_string(),
    ]
}

/// `csv_record` as one line. No field ever contains a delimiter or quote.
pub fn csv_row(snapshot: &Snapshot) -> String {
    csv_record(snapshot).join(",")
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write console line: {0}")]
    Console(#[from] io::Error),

    #[error("failed to write csv log: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only CSV file, one row per tick.
pub struct CsvLog {
    writer: csv::Writer<File>,
}

impl CsvLog {
    /// Create or truncate `path` and write the header row.
    pub fn create(path: &Path) -> csv::Result<Self> {
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(CSV_HEADER.split(','))?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "logging samples to csv");
        Ok(CsvLog { writer })
    }

    pub fn append(&mut self, snapshot: &Snapshot) -> csv::Result<()> {
        self.writer.write_record(csv_record(snapshot))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes each snapshot to the console sink and, if configured, the CSV log.
pub struct Reporter<W: Write> {
    console: W,
    csv: Option<CsvLog>,
}

impl<W: Write> Reporter<W> {
    pub fn new(console: W, csv: Option<CsvLog>) -> Self {
        Reporter { console, csv }
    }

    pub fn report(&mut self, snapshot: &Snapshot) -> Result<(), ReportError> {
        writeln!(self.console, "{}", console_line(snapshot))?;
        self.console.flush()?;
        if let Some(csv) = self.csv.as_mut() {
            csv.append(snapshot)?;
        }
        Ok(())
    }

    pub fn into_console(self) -> W {
        self.console
    }
}
