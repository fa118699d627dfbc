//! In-memory table model
//!
//! A `Table` is the header row plus every data row of one CSV read, already
//! coerced to JSON scalars. Each request builds a fresh `Table`; nothing is
//! cached or shared between requests.

use serde_json::{Map, Number, Value};

/// One fully-read CSV file: ordered column names plus ordered rows.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    ///
    /// Column names are kept verbatim, including characters that need JSON
    /// escaping when they later become record keys.
    #[must_use]
    pub const fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append one raw CSV row.
    ///
    /// Rows shorter than the header are padded with trailing nulls; fields
    /// beyond the header width are dropped. Every row therefore ends up with
    /// exactly one field per column.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let width = self.headers.len();
        let mut row: Vec<Value> = fields
            .into_iter()
            .take(width)
            .map(|f| coerce_scalar(f.as_ref()))
            .collect();
        row.resize(width, Value::Null);
        self.rows.push(row);
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows (the header line is not a row).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert every row into a JSON object keyed by column name.
    ///
    /// Key order follows column order (`serde_json` is built with
    /// `preserve_order`), array order follows row order, and the record
    /// count always equals the row count.
    #[must_use]
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::with_capacity(self.headers.len());
                for (name, value) in self.headers.iter().zip(row) {
                    record.insert(name.clone(), value.clone());
                }
                Value::Object(record)
            })
            .collect()
    }

    /// Serialize the whole table as a JSON array of records.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_records())
    }
}

/// Coerce one CSV field into a JSON scalar.
///
/// The rules, applied uniformly to every field:
/// - empty field -> null
/// - `true`/`True`/`false`/`False` -> boolean
/// - text that round-trips as an `i64` -> integer ("007" stays a string so
///   zero-padded identifiers survive)
/// - text that parses as a finite `f64` -> float
/// - everything else -> string, verbatim
fn coerce_scalar(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }

    match field {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(int) = field.parse::<i64>() {
        if int.to_string() == field {
            return Value::Number(int.into());
        }
        // Parses as an integer but not canonically written ("007", "+12"):
        // keep the original text.
        return Value::String(field.to_string());
    }

    if let Ok(float) = field.parse::<f64>() {
        if float.is_finite() {
            if let Some(n) = Number::from_f64(float) {
                return Value::Number(n);
            }
        }
    }

    Value::String(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_records_match_rows_and_columns() {
        let mut table = Table::new(headers(&["id", "school_state", "total_donations"]));
        table.push_row(["1", "CA", "350.5"]);
        table.push_row(["2", "NY", "80"]);

        let records = table.to_records();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.as_object().unwrap().len(), 3);
        }
        assert_eq!(records[0]["school_state"], json!("CA"));
        assert_eq!(records[1]["total_donations"], json!(80));
    }

    #[test]
    fn test_key_order_follows_column_order() {
        let mut table = Table::new(headers(&["zebra", "alpha", "mango"]));
        table.push_row(["1", "2", "3"]);

        let records = table.to_records();
        let keys: Vec<&String> = records[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zebra", "alpha", "mango"]);
    }

    #[test]
    fn test_empty_table_serializes_to_empty_array() {
        let table = Table::new(headers(&["a", "b"]));
        assert!(table.is_empty());
        assert_eq!(table.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_short_row_padded_with_nulls() {
        let mut table = Table::new(headers(&["a", "b", "c"]));
        table.push_row(["1"]);

        let records = table.to_records();
        assert_eq!(records[0]["a"], json!(1));
        assert_eq!(records[0]["b"], Value::Null);
        assert_eq!(records[0]["c"], Value::Null);
    }

    #[test]
    fn test_long_row_truncated_to_header_width() {
        let mut table = Table::new(headers(&["a", "b"]));
        table.push_row(["1", "2", "3", "4"]);

        let records = table.to_records();
        assert_eq!(records[0].as_object().unwrap().len(), 2);
        assert_eq!(records[0]["b"], json!(2));
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(coerce_scalar(""), Value::Null);
        assert_eq!(coerce_scalar("true"), json!(true));
        assert_eq!(coerce_scalar("False"), json!(false));
        assert_eq!(coerce_scalar("3"), json!(3));
        assert_eq!(coerce_scalar("-42"), json!(-42));
        assert_eq!(coerce_scalar("3.5"), json!(3.5));
        assert_eq!(coerce_scalar("1e3"), json!(1000.0));
        // Zero-padded and non-canonical integers stay strings
        assert_eq!(coerce_scalar("007"), json!("007"));
        assert_eq!(coerce_scalar("+5"), json!("+5"));
        // Non-finite floats stay strings
        assert_eq!(coerce_scalar("inf"), json!("inf"));
        assert_eq!(coerce_scalar("NaN"), json!("NaN"));
        assert_eq!(coerce_scalar("highest poverty"), json!("highest poverty"));
    }

    #[test]
    fn test_header_names_preserved_verbatim() {
        let mut table = Table::new(headers(&["na\"me", "with,comma"]));
        table.push_row(["x", "y"]);

        let json = table.to_json().unwrap();
        assert!(json.contains(r#""na\"me":"x""#));
        assert!(json.contains(r#""with,comma":"y""#));
    }
}
