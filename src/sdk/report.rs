use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::{fs::OpenOptions, path::Path};
use thiserror::Error;

/// Report columns, in the order they are written.
pub const COLUMNS: [&str; 21] = [
    "pair_id",
    "origin_index",
    "destination_index",
    "origin_name",
    "destination_name",
    "origin_address",
    "destination_address",
    "origin_url",
    "destination_url",
    "origin_plus_code",
    "destination_plus_code",
    "driving_distance",
    "driving_duration",
    "driving_url",
    "transit_distance",
    "transit_duration",
    "transit_hops",
    "transit_url",
    "biking_distance",
    "biking_duration",
    "biking_url",
];

/// One resolved origin/destination pair. Field order must match [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub pair_id: String,
    pub origin_index: usize,
    pub destination_index: usize,
    pub origin_name: String,
    pub destination_name: String,
    pub origin_address: String,
    pub destination_address: String,
    pub origin_url: String,
    pub destination_url: String,
    pub origin_plus_code: Option<String>,
    pub destination_plus_code: Option<String>,
    pub driving_distance: String,
    pub driving_duration: String,
    pub driving_url: String,
    pub transit_distance: String,
    pub transit_duration: String,
    pub transit_hops: u32,
    pub transit_url: String,
    pub biking_distance: String,
    pub biking_duration: String,
    pub biking_url: String,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to access report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Nothing to write.
    Empty,
    /// A new file (with header) replaced whatever was there.
    Created,
    /// Rows were appended under an identical existing header.
    Appended,
}

/// Writes `rows` to `path`, appending when the existing header matches
/// [`COLUMNS`] exactly and starting a fresh file otherwise.
pub fn write_report<P: AsRef<Path>>(
    path: P,
    rows: &[ReportRow],
) -> Result<ReportOutcome, ReportError> {
    let path = path.as_ref();
    if rows.is_empty() {
        return Ok(ReportOutcome::Empty);
    }

    let append = path.exists() && header_matches(path)?;
    let file = if append {
        OpenOptions::new().append(true).open(path)?
    } else {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?
    };

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .has_headers(!append)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(if append {
        ReportOutcome::Appended
    } else {
        ReportOutcome::Created
    })
}

fn header_matches(path: &Path) -> Result<bool, ReportError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = match reader.headers() {
        Ok(headers) => headers,
        // An unreadable header means a file we did not write; start over.
        Err(e) => {
            log::warn!("Could not read header of {}: {}", path.display(), e);
            return Ok(false);
        }
    };
    Ok(headers.iter().eq(COLUMNS.iter().copied()))
}
