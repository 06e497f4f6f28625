//! Display helpers for readings and KPI values.
//!
//! The pipeline returns unrounded numbers; rounding to two decimals and the
//! distinct "no data" rendering happen only here.

use chrono::{NaiveDateTime, NaiveTime};

/// Unit appended to consumption figures.
pub const ENERGY_UNIT: &str = "MWh";

/// Rendering for a statistic computed over zero values.
pub const NO_DATA: &str = "no data";

/// Rendering for a missing cell in a table.
pub const MISSING_CELL: &str = "-";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places. Non-finite values render as `inf` / `-inf` / `NaN`.
///
/// # Examples
///
/// ```
/// use meter_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a scaled epsilon so exact binary midpoints (1.005) round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let fixed = format!("{:.prec$}", rounded, prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a consumption figure with two decimals and the energy unit.
///
/// # Examples
///
/// ```
/// use meter_core::formatting::format_energy;
///
/// assert_eq!(format_energy(1234.567), "1,234.57 MWh");
/// ```
pub fn format_energy(value: f64) -> String {
    format!("{} {}", format_number(value, 2), ENERGY_UNIT)
}

/// Format a KPI that may be undefined. `None` renders as [`NO_DATA`] so it
/// can never be mistaken for a real zero.
///
/// # Examples
///
/// ```
/// use meter_core::formatting::format_stat;
///
/// assert_eq!(format_stat(Some(0.0)), "0.00 MWh");
/// assert_eq!(format_stat(None), "no data");
/// ```
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format_energy(v),
        None => NO_DATA.to_string(),
    }
}

/// Format a single table cell: two decimals, or [`MISSING_CELL`].
pub fn format_reading(value: Option<f64>) -> String {
    match value {
        Some(v) => format_number(v, 2),
        None => MISSING_CELL.to_string(),
    }
}

/// Format a reading timestamp, omitting the time when it is midnight.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
