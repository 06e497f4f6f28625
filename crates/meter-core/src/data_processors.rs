use chrono::NaiveDateTime;
use tracing::trace;

use crate::models::CellValue;
use crate::time_utils::{excel_serial_to_datetime, parse_datetime_text};

// ── DateCoercer ───────────────────────────────────────────────────────────────

/// Turns a raw cell into a timestamp for the date column.
pub struct DateCoercer;

impl DateCoercer {
    /// Attempt to read `cell` as a date-time.
    ///
    /// Handles:
    /// * `Date`    → passed through.
    /// * `Number`  → Excel serial day number (1900 date system).
    /// * `Text`    → RFC 3339 or one of the common date / date-time patterns.
    /// * `Missing` → `None`.
    pub fn coerce(cell: &CellValue) -> Option<NaiveDateTime> {
        match cell {
            CellValue::Date(dt) => Some(*dt),
            CellValue::Number(n) => excel_serial_to_datetime(*n),
            CellValue::Text(s) => {
                let parsed = parse_datetime_text(s);
                if parsed.is_none() {
                    trace!("DateCoercer: could not parse \"{}\"", s);
                }
                parsed
            }
            CellValue::Missing => None,
        }
    }
}

// ── NumberCoercer ─────────────────────────────────────────────────────────────

/// Turns a raw cell into a reading value; anything non-numeric is missing.
pub struct NumberCoercer;

impl NumberCoercer {
    /// Attempt to read `cell` as a number.
    ///
    /// `Number` passes through, `Text` is trimmed and parsed as a float,
    /// everything else (dates included) is missing. `NaN` and infinities in
    /// either form are missing so they never leak into statistics.
    pub fn coerce(cell: &CellValue) -> Option<f64> {
        let value = match cell {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Date(_) | CellValue::Missing => return None,
        };
        if value.is_finite() {
            Some(value)
        } else {
            None
        }
    }
}

// ── LabelExtractor ────────────────────────────────────────────────────────────

/// Reads a header cell as a column label.
pub struct LabelExtractor;

impl LabelExtractor {
    /// Render `cell` as label text, or `None` when it is missing or blank.
    ///
    /// Whole numbers drop their fractional part (`2023.0` → `"2023"`) and
    /// dates render as `%Y-%m-%d` (with the time when it is not midnight).
    pub fn extract(cell: &CellValue) -> Option<String> {
        match cell {
            CellValue::Missing => None,
            CellValue::Text(s) => {
                if s.trim().is_empty() {
                    None
                } else {
                    Some(s.clone())
                }
            }
            CellValue::Number(n) => Some(Self::format_number(*n)),
            CellValue::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    Some(dt.format("%Y-%m-%d").to_string())
                } else {
                    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
                }
            }
        }
    }

    fn format_number(n: f64) -> String {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    // ── DateCoercer ──────────────────────────────────────────────────────────

    #[test]
    fn test_date_passthrough() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        assert_eq!(DateCoercer::coerce(&CellValue::Date(dt)), Some(dt));
    }

    #[test]
    fn test_date_from_text() {
        let dt = DateCoercer::coerce(&text("2024-01-02")).unwrap();
        assert_eq!(dt.day(), 2);
    }

    #[test]
    fn test_date_from_excel_serial() {
        let dt = DateCoercer::coerce(&CellValue::Number(45293.5)).unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (1, 2, 12));
    }

    #[test]
    fn test_date_missing_and_garbage() {
        assert!(DateCoercer::coerce(&CellValue::Missing).is_none());
        assert!(DateCoercer::coerce(&text("total")).is_none());
        assert!(DateCoercer::coerce(&CellValue::Number(-3.0)).is_none());
    }

    // ── NumberCoercer ────────────────────────────────────────────────────────

    #[test]
    fn test_number_passthrough() {
        assert_eq!(NumberCoercer::coerce(&CellValue::Number(12.5)), Some(12.5));
    }

    #[test]
    fn test_number_from_text() {
        assert_eq!(NumberCoercer::coerce(&text("10")), Some(10.0));
        assert_eq!(NumberCoercer::coerce(&text(" 3.25 ")), Some(3.25));
        assert_eq!(NumberCoercer::coerce(&text("-1e3")), Some(-1000.0));
    }

    #[test]
    fn test_number_bad_text_is_missing() {
        assert_eq!(NumberCoercer::coerce(&text("bad")), None);
        assert_eq!(NumberCoercer::coerce(&text("1,234")), None);
        assert_eq!(NumberCoercer::coerce(&text("")), None);
    }

    #[test]
    fn test_number_nan_is_missing() {
        assert_eq!(NumberCoercer::coerce(&CellValue::Number(f64::NAN)), None);
        assert_eq!(NumberCoercer::coerce(&text("NaN")), None);
    }

    #[test]
    fn test_number_infinity_is_missing() {
        assert_eq!(NumberCoercer::coerce(&text("inf")), None);
        assert_eq!(NumberCoercer::coerce(&text("-inf")), None);
        assert_eq!(NumberCoercer::coerce(&text(" infinity ")), None);
        assert_eq!(NumberCoercer::coerce(&CellValue::Number(f64::INFINITY)), None);
    }

    #[test]
    fn test_number_from_date_is_missing() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(NumberCoercer::coerce(&CellValue::Date(dt)), None);
        assert_eq!(NumberCoercer::coerce(&CellValue::Missing), None);
    }

    // ── LabelExtractor ───────────────────────────────────────────────────────

    #[test]
    fn test_label_text_kept_verbatim() {
        assert_eq!(
            LabelExtractor::extract(&text("Ball Mill 2")),
            Some("Ball Mill 2".to_string())
        );
    }

    #[test]
    fn test_label_blank_is_none() {
        assert_eq!(LabelExtractor::extract(&text("  ")), None);
        assert_eq!(LabelExtractor::extract(&CellValue::Missing), None);
    }

    #[test]
    fn test_label_whole_number_has_no_fraction() {
        assert_eq!(
            LabelExtractor::extract(&CellValue::Number(2023.0)),
            Some("2023".to_string())
        );
        assert_eq!(
            LabelExtractor::extract(&CellValue::Number(1.5)),
            Some("1.5".to_string())
        );
    }

    #[test]
    fn test_label_midnight_date_is_date_only() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            LabelExtractor::extract(&CellValue::Date(dt)),
            Some("2024-02-01".to_string())
        );
    }
}
