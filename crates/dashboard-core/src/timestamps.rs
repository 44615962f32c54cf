use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses purchase timestamps from the formats found in exported order tables.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp cell into a naive local date-time.
    ///
    /// Handles, in order:
    /// * RFC 3339 with an offset (the offset is dropped, wall-clock kept).
    /// * Common date-time patterns, with or without a `T` separator and
    ///   fractional seconds.
    /// * Date-only patterns, interpreted as midnight.
    ///
    /// Slash dates are read month-first; `DD/MM/YYYY` is only tried when the
    /// month-first reading is not a valid date (`13/01/2017`).
    ///
    /// Returns `None` for empty or unrecognised input.
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
            "%m/%d/%Y %H:%M:%S",
            "%d/%m/%Y %H:%M:%S",
        ];
        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        if let Some(date) = Self::parse_date(s) {
            return date.and_hms_opt(0, 0, 0);
        }

        warn!("TimestampParser: could not parse timestamp \"{}\"", s);
        None
    }

    /// Parse a bare calendar date (`YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`,
    /// or `DD/MM/YYYY` when the month-first reading is impossible).
    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];
        let s = s.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
