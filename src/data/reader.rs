//! CSV reading module
//!
//! Reads the projects file from disk and decodes it into a [`Table`]. The
//! file is opened, fully read, and closed within one call; read failures
//! surface as [`TableError`] so the handler can answer 500 instead of
//! crashing or returning a partial body.

use std::fmt;
use std::path::Path;

use csv::ReaderBuilder;
use tokio::fs;

use super::table::Table;

/// Errors raised while loading the data file.
#[derive(Debug)]
pub enum TableError {
    /// The file is missing or unreadable.
    Io(std::io::Error),
    /// The file was read but could not be decoded as CSV.
    Csv(csv::Error),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read data file: {e}"),
            Self::Csv(e) => write!(f, "failed to decode data file: {e}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for TableError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Read and decode the data file at `path`.
///
/// Every call re-reads the file from scratch; no handle or content survives
/// the call, so concurrent requests never share state.
pub async fn read_table(path: &Path) -> Result<Table, TableError> {
    let bytes = fs::read(path).await?;
    parse_table(&bytes)
}

/// Decode CSV bytes: first line is the header, the rest are data rows.
///
/// `flexible` mode lets ragged rows through to [`Table::push_row`], which
/// applies the uniform pad/truncate policy instead of rejecting the row.
fn parse_table(bytes: &[u8]) -> Result<Table, TableError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = reader
        .headers()?
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;

    #[test]
    fn test_parse_basic_file() {
        let csv = "id,school_state,total_donations\n1,CA,350.5\n2,NY,80\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(table.headers(), ["id", "school_state", "total_donations"]);
        assert_eq!(table.row_count(), 2);

        let records = table.to_records();
        assert_eq!(records[0]["total_donations"], json!(350.5));
        assert_eq!(records[1]["id"], json!(2));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let csv = "name,note\n\"Smith, Jane\",\"line one\nline two\"\n\"say \"\"hi\"\"\",plain\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        let records = table.to_records();
        assert_eq!(records[0]["name"], json!("Smith, Jane"));
        assert_eq!(records[0]["note"], json!("line one\nline two"));
        assert_eq!(records[1]["name"], json!("say \"hi\""));
    }

    #[test]
    fn test_header_only_file_is_empty_array() {
        let csv = "id,name,amount\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(table.headers().len(), 3);
        assert!(table.is_empty());
        assert_eq!(table.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let csv = "a,b,c\n1,2\n1,2,3,4\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 2);
        let records = table.to_records();
        assert_eq!(records[0]["c"], Value::Null);
        assert_eq!(records[1].as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_read_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.csv");

        let err = read_table(&path).await.unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }

    #[tokio::test]
    async fn test_read_table_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "id,funded\n10,true\n11,false\n").unwrap();
        drop(file);

        let table = read_table(&path).await.unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.to_records()[0]["funded"], json!(true));
    }
}
