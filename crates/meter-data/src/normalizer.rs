//! Schema recovery for consumption sheets.
//!
//! Turns a [`RawGrid`] whose labels sit on the second row into a
//! [`NormalizedTable`] with unique column names, a parsed date column and
//! numeric readings. Malformed cells degrade to missing values; only a grid
//! that cannot hold a table at all is an error.

use std::collections::{HashMap, HashSet};

use meter_core::data_processors::{DateCoercer, LabelExtractor, NumberCoercer};
use meter_core::models::{CellValue, ColumnLabel, NormalizedTable, RawGrid, TableRow};
use meter_core::SchemaError;
use tracing::{debug, warn};

/// Row holding the candidate column labels.
const LABEL_ROW: usize = 1;

/// First row holding readings.
const FIRST_DATA_ROW: usize = 2;

// ── NormalizerConfig ──────────────────────────────────────────────────────────

/// Naming rules applied while recovering the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Name forced onto the first column.
    pub date_column: String,
    /// Label substituted for blank header cells before de-duplication.
    pub placeholder: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            placeholder: "Untitled".to_string(),
        }
    }
}

// ── NormalizationReport ───────────────────────────────────────────────────────

/// What the normalizer had to discard or degrade.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct NormalizationReport {
    /// Columns removed because every cell was empty.
    pub empty_columns_dropped: usize,
    /// Header cells that were blank and received the placeholder.
    pub placeholder_labels: usize,
    /// Rows below the label row.
    pub data_rows: usize,
    /// Rows dropped because their date cell did not parse.
    pub rows_dropped: usize,
    /// Non-empty reading cells that were not numeric.
    pub cells_coerced_missing: usize,
}

// ── SchemaNormalizer ──────────────────────────────────────────────────────────

/// Recovers a typed table from a raw sheet grid.
#[derive(Debug, Clone, Default)]
pub struct SchemaNormalizer {
    config: NormalizerConfig,
}

impl SchemaNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize `grid`, discarding the report.
    pub fn normalize(&self, grid: RawGrid) -> Result<NormalizedTable, SchemaError> {
        self.normalize_with_report(grid).map(|(table, _)| table)
    }

    /// Normalize `grid` and describe what was dropped along the way.
    ///
    /// 1. Drop columns that are empty in every row.
    /// 2. Read labels from row 1, substituting the placeholder for blanks.
    /// 3. Make labels unique with `_1`, `_2`, ... suffixes.
    /// 4. Rename the first column to the canonical date name.
    /// 5. For each row from index 2: parse the date (dropping the row on
    ///    failure) and coerce every other cell to a number or missing.
    pub fn normalize_with_report(
        &self,
        grid: RawGrid,
    ) -> Result<(NormalizedTable, NormalizationReport), SchemaError> {
        if grid.row_count() <= FIRST_DATA_ROW {
            return Err(SchemaError::TooFewRows {
                found: grid.row_count(),
            });
        }

        let kept = Self::non_empty_columns(&grid);
        if kept.is_empty() {
            return Err(SchemaError::NoColumns);
        }

        let mut report = NormalizationReport {
            empty_columns_dropped: grid.column_count() - kept.len(),
            data_rows: grid.row_count() - FIRST_DATA_ROW,
            ..Default::default()
        };

        let header: Vec<&CellValue> = kept.iter().map(|&c| grid.cell(LABEL_ROW, c)).collect();
        report.placeholder_labels = header.iter().filter(|c| c.is_empty()).count();
        let raw_labels = Self::substitute_missing_labels(&header, &self.config.placeholder);
        let mut labels = Self::resolve_unique_labels(&raw_labels);
        Self::apply_date_label(&mut labels, &self.config.date_column);

        let mut rows = Vec::with_capacity(report.data_rows);
        for r in FIRST_DATA_ROW..grid.row_count() {
            let Some(date) = DateCoercer::coerce(grid.cell(r, kept[0])) else {
                report.rows_dropped += 1;
                continue;
            };

            let values = kept[1..]
                .iter()
                .map(|&c| {
                    let cell = grid.cell(r, c);
                    let value = NumberCoercer::coerce(cell);
                    if value.is_none() && !cell.is_empty() {
                        report.cells_coerced_missing += 1;
                    }
                    value
                })
                .collect();
            rows.push(TableRow::new(date, values));
        }

        if report.rows_dropped > 0 {
            warn!(
                "SchemaNormalizer: dropped {} of {} rows with unparseable dates",
                report.rows_dropped, report.data_rows
            );
        }
        debug!(
            "SchemaNormalizer: {} columns kept, {} empty dropped, {} rows kept, {} cells coerced to missing",
            kept.len(),
            report.empty_columns_dropped,
            rows.len(),
            report.cells_coerced_missing
        );

        let date_column = labels.remove(0);
        Ok((NormalizedTable::new(date_column, labels, rows), report))
    }

    // ── Passes ────────────────────────────────────────────────────────────────

    /// Indices of columns holding at least one non-empty cell in any row.
    pub fn non_empty_columns(grid: &RawGrid) -> Vec<usize> {
        (0..grid.column_count())
            .filter(|&c| (0..grid.row_count()).any(|r| !grid.cell(r, c).is_empty()))
            .collect()
    }

    /// Render header cells as labels, using `placeholder` for blank ones.
    pub fn substitute_missing_labels(header: &[&CellValue], placeholder: &str) -> Vec<String> {
        header
            .iter()
            .map(|cell| LabelExtractor::extract(cell).unwrap_or_else(|| placeholder.to_string()))
            .collect()
    }

    /// Make labels pairwise distinct, left to right.
    ///
    /// The first occurrence of a label is kept as is; later occurrences get
    /// `_<n>` with a per-label counter starting at 1. A candidate that would
    /// collide with a label already emitted skips to the next `n`, so
    /// `["A", "A_1", "A"]` becomes `["A", "A_1", "A_2"]`.
    pub fn resolve_unique_labels(labels: &[String]) -> Vec<ColumnLabel> {
        let mut counters: HashMap<&str, usize> = HashMap::new();
        let mut used: HashSet<String> = HashSet::with_capacity(labels.len());
        let mut resolved = Vec::with_capacity(labels.len());

        for label in labels {
            let first = !counters.contains_key(label.as_str()) && !used.contains(label);
            let counter = counters.entry(label.as_str()).or_insert(0);
            let name = if first {
                label.clone()
            } else {
                next_free_suffix(label, counter, &used)
            };
            used.insert(name.clone());
            resolved.push(name);
        }

        resolved
    }

    /// Force the canonical date name onto the first label, renaming any
    /// later column that already carries it.
    fn apply_date_label(labels: &mut [ColumnLabel], date_column: &str) {
        let Some(first) = labels.first_mut() else {
            return;
        };
        *first = date_column.to_string();

        let mut used: HashSet<String> = labels.iter().cloned().collect();
        let mut counter = 0;
        for label in labels.iter_mut().skip(1) {
            if label == date_column {
                let name = next_free_suffix(date_column, &mut counter, &used);
                used.insert(name.clone());
                *label = name;
            }
        }
    }
}

/// Advance `counter` until `"{base}_{counter}"` is not in `used`.
fn next_free_suffix(base: &str, counter: &mut usize, used: &HashSet<String>) -> String {
    loop {
        *counter += 1;
        let candidate = format!("{}_{}", base, counter);
        if !used.contains(&candidate) {
            return candidate;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
