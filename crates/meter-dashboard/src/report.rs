//! Plain-text rendering of a [`DashboardView`].
//!
//! Sections mirror the dashboard: key indicators per selected column, a
//! mean comparison bar chart, the trend of one column, and optionally the
//! filtered table. Labels are aligned by display width so right-to-left and
//! wide characters line up.

use std::io::{self, Write};

use meter_core::formatting::{
    format_energy, format_reading, format_stat, format_timestamp, NO_DATA,
};
use meter_core::models::NormalizedTable;
use meter_data::analysis::DashboardView;
use unicode_width::UnicodeWidthStr;

/// Width of the longest comparison bar.
const BAR_WIDTH: usize = 30;

pub fn render_text<W: Write>(out: &mut W, view: &DashboardView, show_table: bool) -> io::Result<()> {
    match &view.range {
        Some(range) => {
            writeln!(
                out,
                "Equipment consumption {} .. {} ({} readings)",
                range.start,
                range.end,
                view.table.len()
            )?;
            if range.is_inverted() {
                writeln!(out, "Start date is after end date; no readings selected.")?;
            }
        }
        None => writeln!(out, "Equipment consumption: the report holds no readings")?,
    }

    if !view.kpis.is_empty() {
        writeln!(out)?;
        writeln!(out, "Key indicators")?;
        let width = label_width(view.kpis.iter().map(|k| k.column.as_str()));
        for card in &view.kpis {
            writeln!(
                out,
                "  {}  mean {:>16}  max {:>16}  min {:>16}",
                pad_right(&card.column, width),
                format_stat(card.stats.mean),
                format_stat(card.stats.max),
                format_stat(card.stats.min),
            )?;
        }
    }

    if !view.comparison.is_empty() {
        writeln!(out)?;
        writeln!(out, "Mean comparison")?;
        let width = label_width(view.comparison.iter().map(|c| c.column.as_str()));
        let peak = view
            .comparison
            .iter()
            .filter_map(|c| c.mean)
            .fold(0.0_f64, |acc, m| acc.max(m.abs()));
        for entry in &view.comparison {
            let (bar, value) = match entry.mean {
                Some(mean) => (bar(mean, peak), format_energy(mean)),
                None => (String::new(), NO_DATA.to_string()),
            };
            writeln!(
                out,
                "  {}  {} {}",
                pad_right(&entry.column, width),
                pad_right(&bar, BAR_WIDTH),
                value
            )?;
        }
    }

    if let Some(trend) = &view.trend {
        writeln!(out)?;
        writeln!(out, "Trend: {}", trend.column)?;
        if trend.points.is_empty() {
            writeln!(out, "  {NO_DATA}")?;
        }
        for point in &trend.points {
            writeln!(
                out,
                "  {:<16}  {:>12}",
                format_timestamp(&point.date),
                format_reading(point.value)
            )?;
        }
    }

    if show_table {
        writeln!(out)?;
        render_table(out, &view.table)?;
    }

    Ok(())
}

/// Print `table` with one line per reading; missing cells render as `-`.
pub fn render_table<W: Write>(out: &mut W, table: &NormalizedTable) -> io::Result<()> {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            std::iter::once(format_timestamp(&row.date))
                .chain(row.values.iter().map(|v| format_reading(*v)))
                .collect()
        })
        .collect();

    let header = table.labels();
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, label)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.width())
                .chain(std::iter::once(label.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_line: Vec<String> = header
        .iter()
        .zip(&widths)
        .map(|(label, w)| pad_right(label, *w))
        .collect();
    writeln!(out, "{}", header_line.join("  ").trim_end())?;

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| if i == 0 { pad_right(cell, *w) } else { pad_left(cell, *w) })
            .collect();
        writeln!(out, "{}", line.join("  "))?;
    }

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.width()).max().unwrap_or(0)
}

fn bar(value: f64, peak: f64) -> String {
    if peak <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value.abs() / peak) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.min(BAR_WIDTH))
}

fn pad_right(s: &str, width: usize) -> String {
    format!("{s}{}", " ".repeat(width.saturating_sub(s.width())))
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{}{s}", " ".repeat(width.saturating_sub(s.width())))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
