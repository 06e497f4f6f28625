//! Date filtering and per-column statistics over a normalized table.

use std::collections::HashMap;

use meter_core::models::{
    ColumnLabel, ColumnStats, DateRange, MeanComparison, NormalizedTable, Selection, SeriesPoint,
};
use serde::Serialize;
use tracing::debug;

// ── AggregateResult ───────────────────────────────────────────────────────────

/// Everything the dashboard shows for one date range and selection.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    /// Applied window; `None` means the whole table.
    pub range: Option<DateRange>,
    /// Rows of the source table inside `range`.
    pub filtered: NormalizedTable,
    /// KPI triple per selected column.
    pub stats: HashMap<ColumnLabel, ColumnStats>,
    /// Means in selection order, for the comparison chart.
    pub comparison: Vec<MeanComparison>,
    /// Trend line; present only for a single-column selection.
    pub series: Option<Vec<SeriesPoint>>,
}

// ── AggregationEngine ─────────────────────────────────────────────────────────

/// Stateless helper computing views over an immutable table.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Rows whose calendar date lies in `range` (inclusive). Time of day is
    /// ignored; an inverted range yields an empty table.
    pub fn filter_by_range(table: &NormalizedTable, range: &DateRange) -> NormalizedTable {
        let filtered = table.retain_rows(|row| range.contains(row.date.date()));
        debug!(
            "AggregationEngine: {} of {} rows in {} ..= {}",
            filtered.len(),
            table.len(),
            range.start,
            range.end
        );
        filtered
    }

    /// Mean / max / min per column over non-missing values.
    ///
    /// Columns with no values (including unknown columns) map to
    /// [`ColumnStats::undefined`].
    pub fn summarize(
        table: &NormalizedTable,
        columns: &[ColumnLabel],
    ) -> HashMap<ColumnLabel, ColumnStats> {
        columns
            .iter()
            .map(|column| (column.clone(), Self::column_stats(table, column)))
            .collect()
    }

    /// Stats for one column.
    pub fn column_stats(table: &NormalizedTable, column: &str) -> ColumnStats {
        match table.column_index(column) {
            Some(i) => ColumnStats::from_values(table.rows().iter().map(|r| r.value(i))),
            None => ColumnStats::undefined(),
        }
    }

    /// `(date, value)` for every row in table order; missing values stay
    /// `None`. Unknown columns yield an empty series.
    pub fn series(table: &NormalizedTable, column: &str) -> Vec<SeriesPoint> {
        let Some(i) = table.column_index(column) else {
            return Vec::new();
        };
        table
            .rows()
            .iter()
            .map(|row| SeriesPoint {
                date: row.date,
                value: row.value(i),
            })
            .collect()
    }

    /// Mean of each column in the order given, undefined means included.
    pub fn compare_means(table: &NormalizedTable, columns: &[ColumnLabel]) -> Vec<MeanComparison> {
        columns
            .iter()
            .map(|column| MeanComparison {
                column: column.clone(),
                mean: Self::column_stats(table, column).mean,
            })
            .collect()
    }

    /// Filter by `range` (the whole table when `None`), then compute the
    /// views `selection` calls for.
    pub fn aggregate(
        table: &NormalizedTable,
        range: Option<&DateRange>,
        selection: &Selection,
    ) -> AggregateResult {
        let filtered = match range {
            Some(r) => Self::filter_by_range(table, r),
            None => table.clone(),
        };
        let columns = selection.columns();

        let stats = Self::summarize(&filtered, columns);
        let comparison = Self::compare_means(&filtered, columns);
        let series = match selection {
            Selection::Single(column) => Some(Self::series(&filtered, column)),
            Selection::Multi(_) => None,
        };

        AggregateResult {
            range: range.copied(),
            filtered,
            stats,
            comparison,
            series,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
