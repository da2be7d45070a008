use csv::ReaderBuilder;
use tracing::debug;

use super::utils::clean_str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the header row, whitespace-trimmed.
    pub headers: Vec<String>,
    /// Each data row, padded or truncated to `headers.len()` fields.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Split decoded text into a header row and data rows.
///
/// The delimiter comes from configuration. Quoted fields follow the usual
/// CSV rules, so a delimiter inside quotes never splits a field.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<RawTable, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(clean_str).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut ragged = 0usize;
    for result in rdr.records() {
        let record = result?;
        if record.len() != width {
            ragged += 1;
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_owned).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    debug!(
        columns = width,
        rows = rows.len(),
        ragged,
        "parsed delimited source"
    );
    Ok(RawTable { headers, rows })
}
