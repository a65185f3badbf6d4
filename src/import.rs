//! Import Reconciler: merges a delimited producer file into the Record Store.
//!
//! Header names are matched case-insensitively in any order. Rows are handled
//! independently: short rows (blank lines included) and blank names are
//! counted as malformed, names
//! already in the store are counted as duplicates, and processing continues.
//! Only a storage failure stops the import; rows committed before it remain.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::delimited::parse_records;
use crate::models::ProducerFields;
use crate::store::{RecordStore, StoreError};

/// Column names every import header must contain.
pub const REQUIRED_COLUMNS: [&str; 5] = ["name", "contact", "address", "products", "category"];

/// File extensions accepted by `import_file`.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "txt"];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Import header is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unsupported import format: {0} (expected .csv or .txt)")]
    UnsupportedFormat(String),

    #[error("Cannot read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import failed at row {row}: {source}")]
    ImportFailed {
        row: usize,
        #[source]
        source: StoreError,
    },
}

/// Per-import counters reported back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_duplicates: usize,
    pub skipped_malformed: usize,
}

impl ImportSummary {
    pub fn total_rows(&self) -> usize {
        self.imported + self.skipped_duplicates + self.skipped_malformed
    }
}

/// Positions of the five producer fields within the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    name: usize,
    contact: usize,
    address: usize,
    products: usize,
    category: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, ImportError> {
        let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        // A repeated header name maps to its last occurrence.
        let position = |col: &str| normalized.iter().rposition(|h| h == col);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| position(col).is_none())
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        // Every lookup succeeded above; fall back to 0 only to stay total.
        let at = |col: &str| position(col).unwrap_or(0);
        Ok(Self {
            name: at("name"),
            contact: at("contact"),
            address: at("address"),
            products: at("products"),
            category: at("category"),
        })
    }

    fn max_index(&self) -> usize {
        [self.name, self.contact, self.address, self.products, self.category]
            .into_iter()
            .max()
            .unwrap_or(0)
    }

    /// Extract trimmed fields, or `None` when the row is too short.
    fn fields(&self, row: &[String]) -> Option<ProducerFields> {
        if row.len() <= self.max_index() {
            return None;
        }
        Some(
            ProducerFields::new(
                row[self.name].as_str(),
                row[self.contact].as_str(),
                row[self.address].as_str(),
                row[self.products].as_str(),
                row[self.category].as_str(),
            )
            .trimmed(),
        )
    }
}

/// Import producers from a `.csv` or `.txt` file.
pub fn import_file(store: &RecordStore, path: &Path) -> Result<ImportSummary, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(path.display().to_string()));
    }

    let text = std::fs::read_to_string(path)?;
    tracing::info!(path = %path.display(), bytes = text.len(), "Importing producers");
    import_delimited(store, &text)
}

/// Import producers from delimited text whose first record is the header.
pub fn import_delimited(store: &RecordStore, text: &str) -> Result<ImportSummary, ImportError> {
    let mut records = parse_records(text).into_iter();
    let header = records.next().unwrap_or_default();
    let columns = ColumnMap::from_header(&header)?;

    let mut summary = ImportSummary::default();

    // Row numbers are 1-based and count the header as row 1.
    for (offset, row) in records.enumerate() {
        let row_number = offset + 2;

        let Some(fields) = columns.fields(&row) else {
            tracing::debug!(row = row_number, columns = row.len(), "Skipping short row");
            summary.skipped_malformed += 1;
            continue;
        };
        if fields.name.is_empty() {
            tracing::debug!(row = row_number, "Skipping row with blank name");
            summary.skipped_malformed += 1;
            continue;
        }

        let exists = store
            .exists_by_name(&fields.name)
            .map_err(|source| ImportError::ImportFailed { row: row_number, source })?;
        if exists {
            summary.skipped_duplicates += 1;
            continue;
        }

        match store.create(&fields) {
            Ok(_) => summary.imported += 1,
            Err(StoreError::DuplicateName(_)) => summary.skipped_duplicates += 1,
            Err(StoreError::EmptyName) => summary.skipped_malformed += 1,
            Err(source) => {
                tracing::error!(row = row_number, error = %source, "Import aborted");
                return Err(ImportError::ImportFailed { row: row_number, source });
            }
        }
    }

    tracing::info!(
        imported = summary.imported,
        skipped_duplicates = summary.skipped_duplicates,
        skipped_malformed = summary.skipped_malformed,
        "Producer import complete"
    );
    Ok(summary)
}
