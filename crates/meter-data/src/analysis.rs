//! Dashboard pipeline.
//!
//! [`load_table`] decodes and normalizes a report once; [`build_view`] then
//! derives everything the dashboard shows for a date range and a column
//! selection: KPI cards and a mean comparison for the multi-selection, a
//! trend line for one column, and the filtered table.

use std::path::{Path, PathBuf};

use chrono::Utc;
use meter_core::models::{
    ColumnLabel, ColumnStats, DateRange, MeanComparison, NormalizedTable, Selection, SeriesPoint,
};
use meter_core::{DashboardError, Result};
use serde::Serialize;
use tracing::info;

use crate::aggregator::AggregationEngine;
use crate::normalizer::{NormalizationReport, NormalizerConfig, SchemaNormalizer};
use crate::reader::load_grid;

// ── Loading ───────────────────────────────────────────────────────────────────

/// Metadata produced alongside a loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct LoadMetadata {
    /// RFC 3339 timestamp of the load.
    pub generated_at: String,
    pub source: PathBuf,
    pub sheet: String,
    /// Rows in the decoded grid, metadata and label rows included.
    pub grid_rows: usize,
    /// Wall-clock seconds spent decoding the file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent recovering the schema.
    pub normalize_time_seconds: f64,
}

/// The output of [`load_table`].
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub table: NormalizedTable,
    pub report: NormalizationReport,
    pub metadata: LoadMetadata,
}

/// Decode `path` (selecting `sheet` for workbooks) and normalize it.
pub fn load_table(path: &Path, sheet: &str, config: &NormalizerConfig) -> Result<LoadedTable> {
    let load_start = std::time::Instant::now();
    let grid = load_grid(path, sheet)?;
    let load_time = load_start.elapsed().as_secs_f64();
    let grid_rows = grid.row_count();

    let normalize_start = std::time::Instant::now();
    let (table, report) = SchemaNormalizer::new(config.clone()).normalize_with_report(grid)?;
    let normalize_time = normalize_start.elapsed().as_secs_f64();

    info!(
        "Normalized {} rows across {} equipment columns ({:.3}s load, {:.3}s normalize)",
        table.len(),
        table.numeric_columns().len(),
        load_time,
        normalize_time
    );

    Ok(LoadedTable {
        table,
        report,
        metadata: LoadMetadata {
            generated_at: Utc::now().to_rfc3339(),
            source: path.to_path_buf(),
            sheet: sheet.to_string(),
            grid_rows,
            load_time_seconds: load_time,
            normalize_time_seconds: normalize_time,
        },
    })
}

// ── View ──────────────────────────────────────────────────────────────────────

/// Mean / max / min for one selected column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub column: ColumnLabel,
    #[serde(flatten)]
    pub stats: ColumnStats,
}

/// Readings of one column over the filtered range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    pub column: ColumnLabel,
    pub points: Vec<SeriesPoint>,
}

/// Everything rendered for one date range and selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Applied window; `None` only when the table holds no readings.
    pub range: Option<DateRange>,
    /// One card per multi-selected column, in selection order.
    pub kpis: Vec<KpiCard>,
    pub comparison: Vec<MeanComparison>,
    pub trend: Option<TrendView>,
    pub table: NormalizedTable,
}

/// Build the dashboard for `table`.
///
/// `range` defaults to the table's date bounds. `multi` may be empty, in
/// which case no KPI cards or comparison are produced. `single` defaults to
/// the first numeric column. Any selected label the table does not have is
/// reported as [`DashboardError::UnknownColumn`].
pub fn build_view(
    table: &NormalizedTable,
    range: Option<DateRange>,
    multi: &[ColumnLabel],
    single: Option<&str>,
) -> Result<DashboardView> {
    for column in multi.iter().map(String::as_str).chain(single) {
        if !table.has_column(column) {
            return Err(DashboardError::UnknownColumn(column.to_string()));
        }
    }

    let range = range.or_else(|| DateRange::full(table));
    let overview =
        AggregationEngine::aggregate(table, range.as_ref(), &Selection::Multi(multi.to_vec()));

    let kpis = multi
        .iter()
        .map(|column| KpiCard {
            column: column.clone(),
            stats: overview.stats.get(column).copied().unwrap_or_default(),
        })
        .collect();

    let trend_column = single
        .map(str::to_string)
        .or_else(|| overview.filtered.numeric_columns().first().cloned());
    let trend = trend_column.map(|column| {
        let focus = AggregationEngine::aggregate(
            &overview.filtered,
            None,
            &Selection::Single(column.clone()),
        );
        TrendView {
            column,
            points: focus.series.unwrap_or_default(),
        }
    });

    Ok(DashboardView {
        range,
        kpis,
        comparison: overview.comparison,
        trend,
        table: overview.filtered,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
