// CSV ability sheet backend.
//
// The header row names the columns; the `champion_id` column (the first
// column when no header is named that) keys the rows case-insensitively.
// Every other column is returned verbatim, in header order.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{AbilitySource, LookupError};
use crate::champion::{AbilitySlot, ChampionRecord, ViewMode, MISSING_VALUE};

const ID_COLUMN: &str = "champion_id";

/// An in-memory copy of the ability sheet.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    columns: Vec<String>,
    /// Lowercased champion id -> (id as written, values in column order).
    rows: HashMap<String, (String, Vec<String>)>,
    /// Champion ids in file order.
    order: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

impl CsvSource {
    /// Load the sheet at `path`. A missing or unreadable file yields an empty
    /// sheet, so every lookup reports not found.
    pub fn load(path: &Path) -> Self {
        match Self::open(path) {
            Ok(sheet) => {
                info!(
                    "Loaded {} champions ({} columns) from {}",
                    sheet.len(),
                    sheet.columns.len(),
                    path.display()
                );
                sheet
            }
            Err(e) => {
                warn!("Ability sheet unavailable: {}", e);
                CsvSource::default()
            }
        }
    }

    pub fn open(path: &Path) -> Result<Self, SheetError> {
        let file = std::fs::File::open(path).map_err(|e| SheetError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file).map_err(|e| SheetError::Csv {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let headers = reader.headers()?.clone();
        let id_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(ID_COLUMN))
            .unwrap_or(0);
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut sheet = CsvSource {
            columns,
            rows: HashMap::new(),
            order: Vec::new(),
        };

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("skipping malformed sheet row: {}", e);
                    continue;
                }
            };
            let id = record.get(id_idx).unwrap_or_default().to_string();
            if id.is_empty() {
                continue;
            }
            let values: Vec<String> = (0..headers.len())
                .filter(|i| *i != id_idx)
                .map(|i| record.get(i).unwrap_or(MISSING_VALUE).to_string())
                .collect();

            let key = id.to_lowercase();
            if sheet.rows.contains_key(&key) {
                warn!("duplicate sheet row for '{}', using latest values", id);
            } else {
                sheet.order.push(id.clone());
            }
            sheet.rows.insert(key, (id, values));
        }

        Ok(sheet)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn record(&self, canonical_id: &str) -> Option<ChampionRecord> {
        // Directory names may carry spaces the sheet ids lack ("Lee Sin" vs "leesin").
        let key = canonical_id.trim().to_lowercase();
        let (id, values) = self
            .rows
            .get(&key)
            .or_else(|| self.rows.get(&key.replace(' ', "")))?;
        let slots = self
            .columns
            .iter()
            .zip(values)
            .map(|(label, value)| AbilitySlot::plain(label.clone(), value.clone()))
            .collect();
        Some(ChampionRecord {
            canonical_id: id.clone(),
            display_name: canonical_id.trim().to_string(),
            slots,
            portrait_ref: None,
            portrait: None,
        })
    }
}

#[async_trait]
impl AbilitySource for CsvSource {
    async fn fetch_abilities(
        &self,
        canonical_id: &str,
        _view_mode: ViewMode,
    ) -> Result<ChampionRecord, LookupError> {
        self.record(canonical_id)
            .ok_or_else(|| LookupError::NotFound(canonical_id.to_string()))
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn local_names(&self) -> Vec<String> {
        self.order.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
