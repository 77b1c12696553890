//! CSV/TSV reader with delimiter detection.

use std::cmp::Reverse;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{BridgeError, Result};

use super::frame::Table;
use super::value::Value;

/// Delimiters to try when auto-detecting, in tie-break order.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Records sampled per candidate delimiter.
const SNIFF_RECORDS: usize = 10;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads delimited text into a [`Table`], inferring a scalar kind per column.
pub struct CsvReader {
    config: CsvConfig,
}

impl CsvReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self {
            config: CsvConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Read a file into a table.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| BridgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| BridgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.read_bytes(&contents)
    }

    /// Read delimited bytes into a table.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => self.sniff_delimiter(bytes)?,
        };
        log::debug!("reading delimited data with delimiter {:?}", delimiter as char);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.trim().to_string()).collect()
        } else {
            Vec::new()
        };

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;

            if headers.is_empty() {
                // Generate column names from the first record
                headers = (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect();
                cells = vec![Vec::new(); headers.len()];
            }

            // Pad short rows, drop extra fields
            for (col_idx, column) in cells.iter_mut().enumerate() {
                column.push(record.get(col_idx).unwrap_or("").to_string());
            }
        }

        if headers.is_empty() {
            return Err(BridgeError::InvalidTable("no columns found".to_string()));
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, column)| (name, infer_column(&column)));

        Table::from_columns(columns.collect::<Vec<_>>())
    }

    /// Pick the candidate that splits the leading records into the most
    /// fields, preferring candidates whose record widths all agree.
    ///
    /// Candidates that leave the first record whole are skipped; with none
    /// left the data is read as a single comma-separated column.
    fn sniff_delimiter(&self, bytes: &[u8]) -> Result<u8> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(BridgeError::InvalidTable("no lines to read".to_string()));
        }

        let best = DELIMITERS
            .iter()
            .enumerate()
            .filter_map(|(position, &delimiter)| {
                let widths = self.record_widths(bytes, delimiter);
                let first = *widths.first()?;
                let consistent = widths.iter().all(|&w| w == first);
                (first > 1).then_some(((consistent, first, Reverse(position)), delimiter))
            })
            .max_by_key(|(rank, _)| *rank);

        Ok(best.map_or(b',', |(_, delimiter)| delimiter))
    }

    /// Field counts of the first records when split on `delimiter`.
    fn record_widths(&self, bytes: &[u8], delimiter: u8) -> Vec<usize> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(self.config.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes)
            .records()
            .take(SNIFF_RECORDS)
            .map_while(|record| record.ok())
            .map(|record| record.len())
            .collect()
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the narrowest kind every non-null cell parses as: int, float, bool,
/// then string.
fn infer_column(cells: &[String]) -> Vec<Value> {
    let present = || cells.iter().filter(|c| !Value::is_null_text(c));

    let convert = |parse: &dyn Fn(&str) -> Option<Value>| -> Option<Vec<Value>> {
        cells
            .iter()
            .map(|c| {
                if Value::is_null_text(c) {
                    Some(Value::Null)
                } else {
                    parse(c.trim())
                }
            })
            .collect()
    };

    if present().next().is_none() {
        return vec![Value::Null; cells.len()];
    }

    convert(&|c: &str| c.parse::<i64>().ok().map(Value::Int))
        .or_else(|| convert(&|c: &str| c.parse::<f64>().ok().map(Value::Float)))
        .or_else(|| convert(&|c: &str| Value::parse_bool(c).map(Value::Bool)))
        .unwrap_or_else(|| {
            cells
                .iter()
                .map(|c| {
                    if Value::is_null_text(c) {
                        Value::Null
                    } else {
                        Value::Str(c.clone())
                    }
                })
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        let reader = CsvReader::new();
        assert_eq!(reader.sniff_delimiter(b"a,b,c\n1,2,3\n4,5,6").unwrap(), b',');
        assert_eq!(reader.sniff_delimiter(b"a\tb\tc\n1\t2\t3\n4\t5\t6").unwrap(), b'\t');
        assert_eq!(reader.sniff_delimiter(b"a|b\n1|2").unwrap(), b'|');
    }

    #[test]
    fn test_sniff_delimiter_ignores_quoted_fields() {
        let reader = CsvReader::new();
        let data = b"name;note\n\"Smith, J\";x\n\"Doe, A\";y";
        assert_eq!(reader.sniff_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_sniff_delimiter_prefers_consistent_widths() {
        let reader = CsvReader::new();
        // Commas split the header wider but not every row
        let data = b"a;b,c,d\n1;2\n3;4";
        assert_eq!(reader.sniff_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_sniff_delimiter_edge_cases() {
        let reader = CsvReader::new();
        assert_eq!(reader.sniff_delimiter(b"value\n1\n2").unwrap(), b',');
        assert_eq!(reader.sniff_delimiter(b"a\tb,c\n1\t2,3").unwrap(), b'\t');
        assert!(matches!(
            reader.sniff_delimiter(b" \n\n"),
            Err(BridgeError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_read_csv_infers_kinds() {
        let reader = CsvReader::new();
        let data = b"name,age,salary,is_manager\nAlice,30,75000.5,false\nBob,NA,85000,true";
        let table = reader.read_bytes(data).unwrap();

        assert_eq!(table.column_names(), vec!["name", "age", "salary", "is_manager"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "name"), Some(&Value::from("Alice")));
        assert_eq!(table.get(1, "age"), Some(&Value::Null));
        assert_eq!(table.get(1, "salary"), Some(&Value::Float(85000.0)));
        assert_eq!(table.get(0, "is_manager"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_read_without_header() {
        let reader = CsvReader::with_config(CsvConfig {
            has_header: false,
            ..CsvConfig::default()
        });
        let table = reader.read_bytes(b"1,x\n2,y").unwrap();
        assert_eq!(table.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let reader = CsvReader::with_config(CsvConfig {
            max_rows: Some(1),
            ..CsvConfig::default()
        });
        let table = reader.read_bytes(b"a,b\n1,2\n3,4").unwrap();
        assert_eq!(table.row_count(), 1);
    }
}
