//! Populate an [`IpMap`] from entry files
//!
//! Two formats are understood:
//!
//! - **text**: one entry per line, `KEY [LABEL...]`. The key is an address or
//!   CIDR block, the rest of the line (if any) becomes a string value. Blank
//!   lines and `#` comments are skipped.
//! - **csv**: a header row with an `entry` (or `key`) column; every other
//!   non-empty cell is stored in a JSON object under its column name.
//!
//! Both formats may be gzip-compressed (see [`file_reader`](crate::file_reader)).

use crate::file_reader;
use crate::ip_map::IpMap;
use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Layout of an entry file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryFormat {
    /// Whitespace-separated `KEY [LABEL]` lines
    #[default]
    Text,
    /// CSV with an `entry` or `key` column
    Csv,
}

impl FromStr for EntryFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(EntryFormat::Text),
            "csv" => Ok(EntryFormat::Csv),
            _ => anyhow::bail!("Unknown format: {}. Use 'text' or 'csv'", s),
        }
    }
}

impl fmt::Display for EntryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryFormat::Text => write!(f, "text"),
            EntryFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Build a map from one or more entry files
pub fn load_files<P: AsRef<Path>>(paths: &[P], format: EntryFormat) -> Result<IpMap<Value>> {
    let mut map = IpMap::new();
    for path in paths {
        load_file(&mut map, path, format)?;
    }
    Ok(map)
}

/// Add the entries of one file to `map`, returning how many were added
///
/// Loading stops at the first invalid key; entries before it stay in the map.
pub fn load_file<P: AsRef<Path>>(
    map: &mut IpMap<Value>,
    path: P,
    format: EntryFormat,
) -> Result<usize> {
    let path = path.as_ref();
    let count = match format {
        EntryFormat::Text => load_text(map, path)?,
        EntryFormat::Csv => load_csv(map, path)?,
    };
    debug!(path = %path.display(), %format, count, "loaded entries");
    Ok(count)
}

fn load_text(map: &mut IpMap<Value>, path: &Path) -> Result<usize> {
    let mut reader = file_reader::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let mut line = Vec::new();
    let mut line_num = 0;
    let mut count = 0;

    while file_reader::read_line(&mut reader, &mut line)
        .with_context(|| format!("Failed to read: {}", path.display()))?
    {
        line_num += 1;
        let entry = line.trim_ascii();
        if entry.is_empty() || entry.starts_with(b"#") {
            continue;
        }

        let (key, label) = split_key(entry);
        let value = if label.is_empty() {
            Value::Null
        } else {
            Value::String(String::from_utf8_lossy(label).into_owned())
        };

        map.insert_bytes(key, value)
            .with_context(|| format!("{}:{}: invalid entry", path.display(), line_num))?;
        count += 1;
    }

    Ok(count)
}

/// Split a trimmed line at its first run of whitespace
fn split_key(entry: &[u8]) -> (&[u8], &[u8]) {
    match entry.iter().position(|b| b.is_ascii_whitespace()) {
        Some(pos) => (&entry[..pos], entry[pos..].trim_ascii_start()),
        None => (entry, &[]),
    }
}

fn load_csv(map: &mut IpMap<Value>, path: &Path) -> Result<usize> {
    let input = file_reader::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(input);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let entry_col = headers
        .iter()
        .position(|h| h == "entry" || h == "key")
        .ok_or_else(|| {
            anyhow::anyhow!(
                "CSV must have an 'entry' or 'key' column. Found headers: {}",
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        })?;

    let data_cols: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != entry_col)
        .collect();

    let mut count = 0;
    for (row_num, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row_num + 2;
        let record = result.with_context(|| format!("Failed to read CSV record at row {}", line))?;

        let entry = record
            .get(entry_col)
            .ok_or_else(|| anyhow::anyhow!("Missing entry column at row {}", line))?;

        let mut data = Map::new();
        for (col_idx, col_name) in &data_cols {
            if let Some(cell) = record.get(*col_idx) {
                if !cell.is_empty() {
                    data.insert(col_name.to_string(), typed_cell(cell));
                }
            }
        }

        map.insert(entry.trim(), Value::Object(data))
            .with_context(|| format!("{}:{}: invalid entry {:?}", path.display(), line, entry))?;
        count += 1;
    }

    Ok(count)
}

/// Integers, floats and booleans keep their type; everything else is a string
fn typed_cell(cell: &str) -> Value {
    if let Ok(i) = cell.parse::<i64>() {
        Value::Number(i.into())
    } else if let Ok(u) = cell.parse::<u64>() {
        Value::Number(u.into())
    } else if let Some(n) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        Value::Number(n)
    } else if cell == "true" || cell == "false" {
        Value::Bool(cell == "true")
    } else {
        Value::String(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_text_entries() {
        let file = write_temp(
            "# blocklist\n\
             127.0.0.1 foo\n\
             \n\
             0.0.0.0/8\tbar baz\n\
             0.0.0.4\n",
        );

        let map = load_files(&[file.path()], EntryFormat::Text).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.lookup("127.0.0.1").unwrap(), Some(&json!("foo")));
        assert_eq!(map.lookup("0.0.0.8").unwrap(), Some(&json!("bar baz")));
        assert_eq!(map.lookup("0.0.0.4").unwrap(), Some(&Value::Null));
    }

    #[test]
    fn test_text_invalid_entry_reports_line() {
        let file = write_temp("10.0.0.1\n10.0.0.0/99\n");
        let mut map = IpMap::new();
        let err = load_file(&mut map, file.path(), EntryFormat::Text).unwrap_err();
        assert!(format!("{:#}", err).contains(":2: invalid entry"));
        assert!(format!("{:#}", err).contains("invalid IP"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_text_non_utf8_key() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xff\xfe.0.0.1\n").unwrap();
        file.flush().unwrap();

        let err = load_files(&[file.path()], EntryFormat::Text).unwrap_err();
        assert!(format!("{:#}", err).contains("value must be a string"));
    }

    #[test]
    fn test_csv_entries() {
        let file = write_temp(
            "entry,category,score,blocked\n\
             10.0.0.0/8,private,3,true\n\
             10.1.2.3,,1.5,\n",
        );

        let map = load_files(&[file.path()], EntryFormat::Csv).unwrap();
        assert_eq!(
            map.lookup("10.200.0.1").unwrap(),
            Some(&json!({"category": "private", "score": 3, "blocked": true}))
        );
        assert_eq!(map.lookup("10.1.2.3").unwrap(), Some(&json!({"score": 1.5})));
    }

    #[test]
    fn test_csv_requires_entry_column() {
        let file = write_temp("address,category\n10.0.0.1,x\n");
        let err = load_files(&[file.path()], EntryFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("'entry' or 'key' column"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("text".parse::<EntryFormat>().unwrap(), EntryFormat::Text);
        assert_eq!("csv".parse::<EntryFormat>().unwrap(), EntryFormat::Csv);
        assert!("json".parse::<EntryFormat>().is_err());
        assert_eq!(EntryFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_typed_cell() {
        assert_eq!(typed_cell("42"), json!(42));
        assert_eq!(typed_cell("-7"), json!(-7));
        assert_eq!(typed_cell("18446744073709551615"), json!(u64::MAX));
        assert_eq!(typed_cell("0.25"), json!(0.25));
        assert_eq!(typed_cell("false"), json!(false));
        assert_eq!(typed_cell("NaN"), json!("NaN"));
        assert_eq!(typed_cell("tor-exit"), json!("tor-exit"));
    }
}
