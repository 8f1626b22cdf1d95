//! CSV import/export for bulk operations, e.g. a course list exported from
//! a spreadsheet or a log of created records.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::Path;

use tracing::{debug, error};

/// One CSV row keyed by header name.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("CSV file not found: {0}")]
    NotFound(String),
    #[error("CSV file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),
}

/// Read every row of a CSV file with a header line.
pub fn read_csv(path: &Path, delimiter: u8) -> Result<Vec<Record>, CsvError> {
    if !path.exists() {
        error!(path = %path.display(), "File not found");
        return Err(CsvError::NotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: Record = row?;
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "CSV file read");
    Ok(records)
}

/// Append one row, writing the header line first when the file is new or empty.
///
/// Values are written in `headers` order; fields missing from `row` are
/// left empty and fields not named in `headers` are ignored.
pub fn write_csv(
    path: &Path,
    headers: &[&str],
    row: &Record,
    delimiter: u8,
) -> Result<(), CsvError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_new = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(file);

    if is_new {
        writer.write_record(headers)?;
    }
    writer.write_record(
        headers
            .iter()
            .map(|h| row.get(*h).map(String::as_str).unwrap_or("")),
    )?;
    writer.flush()?;
    Ok(())
}
