mod bootstrap;
mod report;

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use meter_core::models::DateRange;
use meter_core::settings::Settings;
use meter_data::analysis::{build_view, load_table};
use meter_data::normalizer::NormalizerConfig;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("meter-dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "File: {}, Sheet: {}, Format: {}",
        settings.file.display(),
        settings.sheet,
        settings.format
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&settings, &mut out)?;
    out.flush()?;

    Ok(())
}

/// Load the report named by `settings` and write the dashboard to `out`.
fn run<W: Write>(settings: &Settings, out: &mut W) -> Result<()> {
    let config = NormalizerConfig {
        date_column: settings.date_column.clone(),
        placeholder: settings.placeholder.clone(),
    };

    let loaded = load_table(&settings.file, &settings.sheet, &config)
        .with_context(|| format!("Failed to load {}", settings.file.display()))?;

    tracing::info!(
        "Columns: {}",
        loaded.table.numeric_columns().join(", ")
    );

    let range = resolve_range(settings.start, settings.end, loaded.table.date_bounds());
    if range.is_some_and(|r| r.is_inverted()) {
        tracing::warn!("Start date is after end date; the selection is empty");
    }

    let view = build_view(
        &loaded.table,
        range,
        &settings.columns,
        settings.trend.as_deref(),
    )?;

    if settings.wants_json() {
        let payload = serde_json::json!({
            "metadata": loaded.metadata,
            "normalization": loaded.report,
            "view": view,
        });
        serde_json::to_writer_pretty(&mut *out, &payload)?;
        writeln!(out)?;
    } else {
        report::render_text(out, &view, settings.table)?;
    }

    Ok(())
}

/// Fill whichever of `start` / `end` was not given from the table bounds.
fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    bounds: Option<DateRange>,
) -> Option<DateRange> {
    match (start, end) {
        (None, None) => bounds,
        (Some(s), Some(e)) => Some(DateRange::new(s, e)),
        (Some(s), None) => Some(DateRange::new(s, bounds.map_or(s, |b| b.end))),
        (None, Some(e)) => Some(DateRange::new(bounds.map_or(e, |b| b.start), e)),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn write_report(dir: &TempDir) -> String {
        let path = dir.path().join("report.csv");
        std::fs::write(
            &path,
            "x\ndate_raw,Pump\n2024-01-01,10\n2024-01-02,bad\n2024-01-03,30\n",
        )
        .unwrap();
        path.to_string_lossy().to_string()
    }

    fn run_with(args: &[&str]) -> Result<String> {
        let settings = Settings::try_parse_from(args)?;
        let mut buf = Vec::new();
        run(&settings, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    // ── resolve_range ─────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_range_defaults_to_bounds() {
        let bounds = Some(DateRange::new(day(1), day(31)));
        assert_eq!(resolve_range(None, None, bounds), bounds);
        assert_eq!(
            resolve_range(Some(day(5)), None, bounds),
            Some(DateRange::new(day(5), day(31)))
        );
        assert_eq!(
            resolve_range(None, Some(day(7)), bounds),
            Some(DateRange::new(day(1), day(7)))
        );
    }

    #[test]
    fn test_resolve_range_keeps_inverted_dates() {
        let range = resolve_range(Some(day(9)), Some(day(2)), None).unwrap();
        assert!(range.is_inverted());
    }

    #[test]
    fn test_resolve_range_empty_table() {
        assert_eq!(resolve_range(None, None, None), None);
        assert_eq!(
            resolve_range(Some(day(3)), None, None),
            Some(DateRange::single(day(3)))
        );
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_run_text_report() {
        let dir = TempDir::new().unwrap();
        let file = write_report(&dir);
        let text = run_with(&["meter-dashboard", &file, "--columns", "Pump"]).unwrap();

        assert!(text.contains("Key indicators"));
        assert!(text.contains("20.00 MWh"));
        assert!(text.contains("Trend: Pump"));
    }

    #[test]
    fn test_run_json_report() {
        let dir = TempDir::new().unwrap();
        let file = write_report(&dir);
        let text = run_with(&[
            "meter-dashboard",
            &file,
            "--columns",
            "Pump",
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-02",
            "--format",
            "json",
        ])
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(json["view"]["kpis"][0]["mean"].is_null());
        assert_eq!(json["normalization"]["cells_coerced_missing"], 1);
    }

    #[test]
    fn test_run_unknown_column_fails() {
        let dir = TempDir::new().unwrap();
        let file = write_report(&dir);
        let err = run_with(&["meter-dashboard", &file, "--trend", "Kiln"]).unwrap_err();
        assert!(err.to_string().contains("Kiln"));
    }

    #[test]
    fn test_run_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.xlsx");
        let err = run_with(&["meter-dashboard", &missing.to_string_lossy()]).unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
    }
}
