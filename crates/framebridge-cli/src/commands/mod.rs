//! CLI command implementations.

pub mod salaries;
pub mod schemas;
pub mod validate;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use framebridge::{CsvReader, Table};

/// Load a table from a JSON file (column mapping or row list) or a
/// delimited text file.
pub(crate) fn load_table(path: &Path) -> Result<Table, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    log::debug!(
        "loading {} as {}",
        path.display(),
        if is_json { "JSON" } else { "delimited text" }
    );

    if is_json {
        let reader = BufReader::new(File::open(path)?);
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Ok(Table::from_json(&value)?)
    } else {
        Ok(CsvReader::new().read_path(path)?)
    }
}
