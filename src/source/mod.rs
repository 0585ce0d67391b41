//! Tabular record source.
//!
//! Loads a CSV edge list into a [`Dataset`], resolves which columns hold the
//! endpoint identifiers, types every other cell into a [`Scalar`] attribute,
//! and decides directedness from an explicit flag or a validated marker
//! column. The core never sees CSV; it only receives [`EdgeRecord`]s.

pub mod cache;

pub use cache::{CacheStats, DatasetCache};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

use crate::graph::models::{EdgeRecord, Scalar};

/// Header names picked up automatically (case-insensitive).
pub const AUTO_SOURCE_COLUMN: &str = "source";
pub const AUTO_TARGET_COLUMN: &str = "target";

/// Hex SHA-256 of the raw bytes, used as the dataset identity.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ============================================================================
// Column selection
// ============================================================================

/// Which columns hold the endpoints and how directedness is decided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSelection {
    /// Source column; `None` picks a header named `Source`
    pub source: Option<String>,
    /// Target column; `None` picks a header named `Target`
    pub target: Option<String>,
    pub direction: Directedness,
}

/// How the graph's `directed` flag is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Directedness {
    /// Fixed by the caller
    Explicit(bool),
    /// Read from a column whose values are `directed` / `undirected`
    Column(String),
}

impl Default for Directedness {
    fn default() -> Self {
        Self::Explicit(false)
    }
}

/// Column positions after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub source: usize,
    pub target: usize,
    /// Marker column, left out of the edge attributes
    pub direction: Option<usize>,
}

// ============================================================================
// Dataset
// ============================================================================

/// A parsed CSV table, kept as raw strings until records are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    fingerprint: String,
}

impl Dataset {
    /// Read and parse a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse CSV content. The first line is the header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .context("Missing CSV header")?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Malformed CSV row {}", i + 1))?;
            rows.push(record.iter().map(String::from).collect());
        }

        debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV dataset");

        Ok(Self {
            headers,
            rows,
            fingerprint: fingerprint(bytes),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    }

    fn require_column(&self, name: &str, role: &str) -> Result<usize> {
        match self.column_index(name) {
            Some(idx) => Ok(idx),
            None => bail!(
                "No {} column '{}' (available: {})",
                role,
                name,
                self.headers.join(", ")
            ),
        }
    }

    /// Resolve column names to positions.
    pub fn resolve_columns(&self, selection: &ColumnSelection) -> Result<ResolvedColumns> {
        let source_name = selection.source.as_deref().unwrap_or(AUTO_SOURCE_COLUMN);
        let target_name = selection.target.as_deref().unwrap_or(AUTO_TARGET_COLUMN);
        let source = self.require_column(source_name, "source")?;
        let target = self.require_column(target_name, "target")?;
        if source == target {
            bail!("Source and target both resolve to column '{}'", self.headers[source]);
        }
        let direction = match &selection.direction {
            Directedness::Column(name) => Some(self.require_column(name, "direction")?),
            Directedness::Explicit(_) => None,
        };
        Ok(ResolvedColumns {
            source,
            target,
            direction,
        })
    }

    /// Decide directedness.
    ///
    /// A marker column must hold only `directed` / `undirected`
    /// (case-insensitive, blanks ignored) and every row must agree. A column
    /// with no markers at all means undirected.
    pub fn resolve_direction(&self, selection: &ColumnSelection) -> Result<bool> {
        let name = match &selection.direction {
            Directedness::Explicit(directed) => return Ok(*directed),
            Directedness::Column(name) => name,
        };
        let idx = self.require_column(name, "direction")?;

        let mut decided: Option<(bool, usize)> = None;
        for (i, row) in self.rows.iter().enumerate() {
            let raw = row.get(idx).map(|s| s.trim()).unwrap_or_default();
            if raw.is_empty() {
                continue;
            }
            let directed = match raw.to_ascii_lowercase().as_str() {
                "directed" => true,
                "undirected" => false,
                _ => bail!(
                    "Row {}: direction marker '{}' is neither 'directed' nor 'undirected'",
                    i + 1,
                    raw
                ),
            };
            match decided {
                None => decided = Some((directed, i + 1)),
                Some((first, first_row)) if first != directed => bail!(
                    "Row {}: direction marker disagrees with row {}",
                    i + 1,
                    first_row
                ),
                Some(_) => {}
            }
        }
        Ok(decided.map(|(d, _)| d).unwrap_or(false))
    }

    /// Convert rows into edge records.
    ///
    /// Blank identifiers come through as `None` so the builder can report
    /// the row. Every other non-blank cell becomes a typed attribute.
    pub fn edge_records(&self, columns: &ResolvedColumns) -> Vec<EdgeRecord> {
        self.rows
            .iter()
            .map(|row| {
                let cell = |idx: usize| {
                    row.get(idx)
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                };
                let mut record = EdgeRecord {
                    source: cell(columns.source),
                    target: cell(columns.target),
                    ..Default::default()
                };
                for (idx, header) in self.headers.iter().enumerate() {
                    if idx == columns.source || idx == columns.target || Some(idx) == columns.direction
                    {
                        continue;
                    }
                    if let Some(value) = row.get(idx).and_then(|raw| Scalar::parse_cell(raw)) {
                        record.attributes.insert(header.clone(), value);
                    }
                }
                record
            })
            .collect()
    }
}

/// Records plus the directedness decision, ready for [`build`](crate::graph::build).
pub fn prepare(dataset: &Dataset, selection: &ColumnSelection) -> Result<(Vec<EdgeRecord>, bool)> {
    let columns = dataset.resolve_columns(selection)?;
    let directed = dataset.resolve_direction(selection)?;
    Ok((dataset.edge_records(&columns), directed))
}

// ============================================================================
// Tests
// ============================================================================
