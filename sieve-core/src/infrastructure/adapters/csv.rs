// sieve-core/src/infrastructure/adapters/csv.rs

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::domain::project::configuration::default_na_values;
use crate::domain::table::{RecordTable, Schema, Value};
use crate::error::SieveError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write_with;
use crate::ports::TableStore;

const SUPPORTED_EXTENSIONS: &[&str] = &["csv"];

/// Delimited-file store. Cells are typed on load; tables are written atomically.
#[derive(Debug, Clone)]
pub struct CsvStore {
    delimiter: u8,
    na_values: Vec<String>,
}

impl Default for CsvStore {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: default_na_values(),
        }
    }
}

impl CsvStore {
    /// Only single-byte delimiters are supported by the reader.
    pub fn new(delimiter: char, na_values: Vec<String>) -> Result<Self, SieveError> {
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                InfrastructureError::ConfigError(format!(
                    "delimiter '{}' must be a single ASCII character",
                    delimiter
                ))
            })?;
        Ok(Self {
            delimiter,
            na_values,
        })
    }

    /// Files making up an input: the file itself, or every `*.csv` under a
    /// directory in sorted path order.
    pub fn discover(path: &Path) -> Result<Vec<PathBuf>, SieveError> {
        if !path.exists() {
            return Err(InfrastructureError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", path.display()),
            ))
            .into());
        }
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> Result<RecordTable, SieveError> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let width = headers.len();
        let mut table = RecordTable::new(Schema::new(headers)?);

        for result in reader.records() {
            let record = result?;
            // short rows are padded with Missing, long rows truncated
            let values: Vec<Value> = (0..width)
                .map(|i| {
                    record
                        .get(i)
                        .map(|raw| Value::parse_cell(raw, &self.na_values))
                        .unwrap_or(Value::Missing)
                })
                .collect();
            table.push(values)?;
        }
        debug!(path = ?path, rows = table.len(), "Loaded file");
        Ok(table)
    }

    /// Loads every input in order and concatenates them. All files must share
    /// one header.
    #[instrument(skip(self, inputs))]
    pub fn load_all(&self, inputs: &[PathBuf]) -> Result<RecordTable, SieveError> {
        let mut combined: Option<RecordTable> = None;
        for input in inputs {
            for file in Self::discover(input)? {
                let table = self.read_file(&file)?;
                combined = Some(match combined {
                    None => table,
                    Some(acc) => acc.concat(table)?,
                });
            }
        }
        let table = combined.ok_or_else(|| {
            InfrastructureError::ConfigError(format!("no CSV files found in {:?}", inputs))
        })?;
        info!(rows = table.len(), columns = table.schema().len(), "Input loaded");
        Ok(table)
    }
}

impl TableStore for CsvStore {
    fn load(&self, path: &Path) -> Result<RecordTable, SieveError> {
        self.load_all(&[path.to_path_buf()])
    }

    fn save(&self, table: &RecordTable, path: &Path) -> Result<(), SieveError> {
        atomic_write_with(path, |w| {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_writer(w);
            writer.write_record(table.fields())?;
            for record in table.records() {
                writer.write_record(record.values().iter().map(|v| v.to_string()))?;
            }
            writer.flush()?;
            Ok(())
        })?;
        debug!(path = ?path, rows = table.len(), "Table written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_types_cells_and_pads_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("tools.csv");
        fs::write(
            &path,
            "Tool Name,review_count,average_rating,Website\nAlpha,12,4.5,alpha.io\nBeta,N/A,,\nGamma,3\nDelta,1,2.0,d.io,extra\n",
        )?;

        let table = CsvStore::default().load(&path)?;
        assert_eq!(table.len(), 4);
        assert_eq!(table.value(0, "review_count")?, &Value::Integer(12));
        assert_eq!(table.value(0, "average_rating")?, &Value::Float(4.5));
        assert_eq!(table.value(1, "review_count")?, &Value::Missing);
        assert_eq!(table.value(2, "Website")?, &Value::Missing);
        assert_eq!(table.value(3, "Website")?, &Value::text("d.io"));
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"Company\nCaf\xe9 Labs\n")?;

        let table = CsvStore::default().load(&path)?;
        assert_eq!(table.value(0, "Company")?, &Value::text("Caf\u{FFFD} Labs"));
        Ok(())
    }

    #[test]
    fn test_directory_inputs_are_concatenated_in_order() -> Result<()> {
        let dir = tempdir()?;
        let raw = dir.path().join("raw");
        fs::create_dir_all(&raw)?;
        fs::write(raw.join("b.csv"), "name\nsecond\n")?;
        fs::write(raw.join("a.csv"), "name\nfirst\n")?;
        fs::write(raw.join("notes.txt"), "ignored")?;

        let table = CsvStore::default().load(&raw)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "name")?, &Value::text("first"));

        fs::write(raw.join("c.csv"), "other\nx\n")?;
        assert!(CsvStore::default().load(&raw).is_err());
        Ok(())
    }

    #[test]
    fn test_save_round_trips_through_disk() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("cleaned.csv");
        let table = RecordTable::from_rows(
            ["Tool Name", "Launch Year", "average_rating"],
            vec![
                vec![Value::text("Alpha, Inc"), Value::Integer(2020), Value::Float(15.0)],
                vec![Value::text("Beta"), Value::Missing, Value::Float(4.25)],
            ],
        )?;

        CsvStore::default().save(&table, &path)?;
        let written = fs::read_to_string(&path)?;
        assert_eq!(
            written,
            "Tool Name,Launch Year,average_rating\n\"Alpha, Inc\",2020,15.0\nBeta,,4.25\n"
        );
        Ok(())
    }

    #[test]
    fn test_semicolon_delimiter() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("eu.csv");
        fs::write(&path, "a;b\n1;x\n")?;
        let table = CsvStore::new(';', default_na_values())?.load(&path)?;
        assert_eq!(table.value(0, "b")?, &Value::text("x"));
        assert!(CsvStore::new('→', vec![]).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let store = CsvStore::default();
        assert!(store.load(Path::new("/definitely/not/here.csv")).is_err());
    }
}
