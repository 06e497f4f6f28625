use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

/// Name of a column in a normalized table.
pub type ColumnLabel = String;

// ── CellValue ─────────────────────────────────────────────────────────────────

/// A single spreadsheet cell as decoded from the sheet, before any typing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// A cell the workbook already stores as a date-time.
    Date(NaiveDateTime),
    /// Any numeric cell (integers, floats and booleans all land here).
    Number(f64),
    /// Free text, including numbers and dates typed as strings.
    Text(String),
    /// An empty or error cell.
    Missing,
}

impl CellValue {
    /// Build a cell from a text field: empty strings become [`CellValue::Missing`].
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Missing
        } else {
            CellValue::Text(s.to_string())
        }
    }

    /// `true` for missing cells and text that is only whitespace.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from_text(s)
    }
}

// ── RawGrid ───────────────────────────────────────────────────────────────────

static MISSING_CELL: CellValue = CellValue::Missing;

/// Rows × columns of untyped cells exactly as read from a sheet.
///
/// Rows may be ragged; cells past the end of a short row read as
/// [`CellValue::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor from string rows; empty strings are missing.
    pub fn from_strings<R, S>(rows: &[R]) -> Self
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let rows = rows
            .iter()
            .map(|r| {
                r.as_ref()
                    .iter()
                    .map(|s| CellValue::from_text(s.as_ref()))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&MISSING_CELL)
    }
}

// ── NormalizedTable ───────────────────────────────────────────────────────────

/// One reading: a timestamp plus one optional value per numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDateTime,
    /// Positional values aligned with [`NormalizedTable::numeric_columns`].
    pub values: Vec<Option<f64>>,
}

impl TableRow {
    pub fn new(date: NaiveDateTime, values: Vec<Option<f64>>) -> Self {
        Self { date, values }
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}

/// Typed table with a canonical date column and uniquely named numeric
/// columns. Immutable once built; filtering produces a new table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTable {
    date_column: ColumnLabel,
    columns: Vec<ColumnLabel>,
    rows: Vec<TableRow>,
    #[serde(skip)]
    index: HashMap<ColumnLabel, usize>,
}

impl NormalizedTable {
    /// Assemble a table. `columns` are the numeric columns in sheet order and
    /// every row must carry one value slot per column.
    pub fn new(
        date_column: impl Into<ColumnLabel>,
        columns: Vec<ColumnLabel>,
        rows: Vec<TableRow>,
    ) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            date_column: date_column.into(),
            columns,
            rows,
            index,
        }
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Column identifiers offered for selection: every column except the date.
    pub fn numeric_columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    /// All column labels in sheet order, date column first.
    pub fn labels(&self) -> Vec<&str> {
        std::iter::once(self.date_column.as_str())
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Value of `label` in `row`; `None` when the cell is missing or the
    /// column does not exist.
    pub fn value(&self, row: &TableRow, label: &str) -> Option<f64> {
        self.column_index(label).and_then(|i| row.value(i))
    }

    /// Earliest and latest reading dates, or `None` for an empty table.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let start = self.rows.iter().map(|r| r.date.date()).min()?;
        let end = self.rows.iter().map(|r| r.date.date()).max()?;
        Some(DateRange::new(start, end))
    }

    /// A new table with the same schema holding only rows accepted by `keep`.
    pub fn retain_rows(&self, mut keep: impl FnMut(&TableRow) -> bool) -> Self {
        Self {
            date_column: self.date_column.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
            index: self.index.clone(),
        }
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive calendar-date window. `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A one-day window.
    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// The window spanning every reading in `table`, `None` when it is empty.
    pub fn full(table: &NormalizedTable) -> Option<Self> {
        table.date_bounds()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

// ── ColumnStats ───────────────────────────────────────────────────────────────

/// KPI triple for one column. Each field is `None` when no value was present,
/// which is distinct from a genuine `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ColumnStats {
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    /// Number of non-missing values the statistics were computed from.
    pub count: usize,
}

impl ColumnStats {
    /// Stats for a column with no values in range.
    pub fn undefined() -> Self {
        Self::default()
    }

    /// Compute mean/max/min over the present values, skipping `None`s.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;

        for v in values.into_iter().flatten() {
            sum += v;
            count += 1;
            max = max.max(v);
            min = min.min(v);
        }

        if count == 0 {
            return Self::undefined();
        }

        Self {
            mean: Some(sum / count as f64),
            max: Some(max),
            min: Some(min),
            count,
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.count == 0
    }
}

// ── Series / comparison points ────────────────────────────────────────────────

/// One point of a trend line; `value` is `None` for a gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDateTime,
    pub value: Option<f64>,
}

/// Mean of one column, used for the side-by-side comparison bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanComparison {
    pub column: ColumnLabel,
    pub mean: Option<f64>,
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Which columns the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// One column, shown as KPIs plus a trend line.
    Single(ColumnLabel),
    /// Several columns, shown as KPIs plus a mean comparison.
    Multi(Vec<ColumnLabel>),
}

impl Selection {
    pub fn columns(&self) -> &[ColumnLabel] {
        match self {
            Selection::Single(c) => std::slice::from_ref(c),
            Selection::Multi(cs) => cs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
