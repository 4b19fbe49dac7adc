//! Header handling shared by the CSV loaders.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};

/// Open a headed CSV file. Short rows are allowed; missing cells read as empty.
pub(crate) fn open_reader(path: &Path) -> Result<Reader<File>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::csv(path, error))
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_ascii_lowercase()
}

/// Column positions by normalized (trimmed, lowercase) header name.
pub(crate) struct HeaderIndex {
    columns: BTreeMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn read(reader: &mut Reader<File>, path: &Path) -> Result<Self> {
        let headers = reader
            .headers()
            .map_err(|error| IngestError::csv(path, error))?;
        Ok(Self::new(headers))
    }

    /// The first occurrence of a repeated header wins.
    pub(crate) fn new(headers: &StringRecord) -> Self {
        let mut columns = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            columns.entry(normalize_header(header)).or_insert(idx);
        }
        Self { columns }
    }

    pub(crate) fn required(&self, column: &str, path: &Path) -> Result<usize> {
        self.optional(column)
            .ok_or_else(|| IngestError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })
    }

    pub(crate) fn optional(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }
}

/// Trimmed cell value, empty when the column or cell is absent.
pub(crate) fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .unwrap_or("")
}

pub(crate) fn optional_text(record: &StringRecord, index: Option<usize>) -> Option<String> {
    let value = field(record, index);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}
