use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

// ── Text timestamps ───────────────────────────────────────────────────────────

/// Date-time patterns tried in order after RFC 3339.
///
/// ISO forms come first; for slash forms month-first wins over day-first so
/// that `"01/02/2024"` reads as January 2nd.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only patterns, interpreted as midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y",
];

/// Parse a textual timestamp into a naive (wall-clock) date-time.
///
/// Accepts RFC 3339 (the offset is dropped, keeping local wall-clock time),
/// the patterns in [`DATETIME_FORMATS`] and the date-only patterns in
/// [`DATE_FORMATS`]. Leading and trailing whitespace is ignored.
/// Returns `None` for empty strings or unrecognised formats.
pub fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

// ── Excel serial dates ────────────────────────────────────────────────────────

/// Largest serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Convert an Excel serial day number (1900 date system) to a date-time.
///
/// Day 0 is 1899-12-30, which absorbs Excel's phantom 1900-02-29 for every
/// serial from March 1900 onwards. The fractional part is the time of day,
/// rounded to the nearest second. Returns `None` for negative, non-finite or
/// out-of-range serials.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(seconds))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    // ── parse_datetime_text ──────────────────────────────────────────────────

    #[test]
    fn test_parse_iso_date_only() {
        let dt = parse_datetime_text("2024-01-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_iso_datetime_with_space() {
        let dt = parse_datetime_text("2024-03-05 14:30:00").unwrap();
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let dt = parse_datetime_text("2024-03-20T14:00:00+05:00").unwrap();
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn test_parse_z_suffix() {
        let dt = parse_datetime_text("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_slash_forms_month_first() {
        let dt = parse_datetime_text("01/02/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (1, 2));
    }

    #[test]
    fn test_parse_slash_forms_day_first_fallback() {
        // 25 cannot be a month, so the day-first pattern applies.
        let dt = parse_datetime_text("25/12/2023").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 12, 25));
    }

    #[test]
    fn test_parse_year_first_slashes() {
        let dt = parse_datetime_text("2024/07/09").unwrap();
        assert_eq!((dt.month(), dt.day()), (7, 9));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_datetime_text("  2024-01-01 ").is_some());
    }

    #[test]
    fn test_parse_empty_returns_none() {
        assert!(parse_datetime_text("").is_none());
        assert!(parse_datetime_text("   ").is_none());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_datetime_text("meta1").is_none());
        assert!(parse_datetime_text("2024-13-45").is_none());
    }

    // ── excel_serial_to_datetime ─────────────────────────────────────────────

    #[test]
    fn test_excel_serial_known_date() {
        // 45292 is 2024-01-01 in the 1900 date system.
        let dt = excel_serial_to_datetime(45292.0).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
    }

    #[test]
    fn test_excel_serial_fraction_is_time_of_day() {
        let dt = excel_serial_to_datetime(45292.75).unwrap();
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_excel_serial_rejects_out_of_range() {
        assert!(excel_serial_to_datetime(-1.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
        assert!(excel_serial_to_datetime(3_000_000.0).is_none());
    }
}
