//! Backend timestamp handling.
//!
//! The backend emits ISO-ish datetimes, sometimes suffixed with a
//! bracketed zone annotation such as `[UTC]` or `[America/Guayaquil]`.
//! Every consumer goes through [`parse_backend_date`]; an unparseable
//! value is a [`DateError`] for the caller to handle, never a silent
//! default.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Ecuador wall-clock offset (UTC-05:00, no daylight saving).
pub const ECUADOR_OFFSET_SECS: i32 = -5 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("empty date string")]
    Empty,
    #[error("unparseable date '{0}'")]
    Unparseable(String),
}

/// Fixed offset for Ecuador local time.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(ECUADOR_OFFSET_SECS).expect("offset within range")
}

/// The current instant in Ecuador local time.
pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&local_offset())
}

/// Strips the bracketed zone suffix, if any, plus surrounding whitespace.
pub fn clean_date_str(raw: &str) -> &str {
    let cut = match raw.find('[') {
        Some(index) => &raw[..index],
        None => raw,
    };
    cut.trim()
}

/// Parses a backend `fecha` string into a concrete instant.
///
/// Accepts RFC 3339 (explicit offset or `Z`) and the naive
/// `YYYY-MM-DDTHH:MM[:SS[.fff]]` the schedule endpoints use; naive values
/// are interpreted as Ecuador wall-clock time.
pub fn parse_backend_date(raw: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let cleaned = clean_date_str(raw);
    if cleaned.is_empty() {
        return Err(DateError::Empty);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(cleaned) {
        return Ok(instant);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, format) {
            return naive
                .and_local_timezone(local_offset())
                .single()
                .ok_or_else(|| DateError::Unparseable(raw.to_string()));
        }
    }

    Err(DateError::Unparseable(raw.to_string()))
}

/// First instant of `date` in Ecuador local time.
pub fn start_of_day(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(local_offset())
        .unwrap()
}

/// Last filterable second of `date` in Ecuador local time.
///
/// 23:59:59, end-of-day inclusive; range filters compare with `<=`.
pub fn end_of_day(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_hms_opt(23, 59, 59)
        .unwrap()
        .and_local_timezone(local_offset())
        .unwrap()
}

/// Formats an instant the way the original screens do: short es-EC
/// format in Guayaquil time.
pub fn format_local(instant: DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(&local_offset())
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

/// Parse-then-format for display, with the fixed fallback label the
/// screens show for bad data.
pub fn display_date(raw: &str) -> String {
    match parse_backend_date(raw) {
        Ok(instant) => format_local(instant),
        Err(_) => "Fecha inválida".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_bracketed_suffix() {
        assert_eq!(
            clean_date_str("2025-07-20T14:30:00-05:00[America/Guayaquil]"),
            "2025-07-20T14:30:00-05:00"
        );
        assert_eq!(clean_date_str("2025-07-20T14:30:00Z[UTC]"), "2025-07-20T14:30:00Z");
        assert_eq!(clean_date_str("  2025-07-20T14:30 "), "2025-07-20T14:30");
        assert_eq!(clean_date_str("sin corchetes"), "sin corchetes");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let instant = parse_backend_date("2025-07-20T14:30:00-05:00[America/Guayaquil]").unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-07-20T14:30:00-05:00");
    }

    #[test]
    fn parses_utc_suffix_form() {
        let instant = parse_backend_date("2025-07-20T19:30:00Z[UTC]").unwrap();
        // Same instant as 14:30 in Guayaquil.
        assert_eq!(
            instant.with_timezone(&local_offset()).to_rfc3339(),
            "2025-07-20T14:30:00-05:00"
        );
    }

    #[test]
    fn naive_values_are_local_wall_clock() {
        let with_seconds = parse_backend_date("2025-07-20T14:30:00").unwrap();
        let without_seconds = parse_backend_date("2025-07-20T14:30").unwrap();
        assert_eq!(with_seconds, without_seconds);
        assert_eq!(with_seconds.offset().local_minus_utc(), ECUADOR_OFFSET_SECS);
    }

    #[test]
    fn empty_and_garbage_are_distinct_errors() {
        assert_eq!(parse_backend_date(""), Err(DateError::Empty));
        assert_eq!(parse_backend_date("   [UTC]"), Err(DateError::Empty));
        assert_eq!(
            parse_backend_date("mañana a las diez"),
            Err(DateError::Unparseable("mañana a las diez".to_string()))
        );
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
        assert_eq!(start_of_day(date).to_rfc3339(), "2025-07-20T00:00:00-05:00");
        assert_eq!(end_of_day(date).to_rfc3339(), "2025-07-20T23:59:59-05:00");
    }

    #[test]
    fn display_falls_back_on_bad_input() {
        assert_eq!(display_date("2025-07-20T14:30:00-05:00[UTC]"), "20/07/2025 14:30");
        assert_eq!(display_date("no es fecha"), "Fecha inválida");
    }
}
