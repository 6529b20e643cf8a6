use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Handles parsing timestamps and date bounds used in usage reports.
///
/// Every instant leaving this module is in UTC, so day boundaries computed
/// from it are UTC calendar days.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a log timestamp into a DateTime<Utc>.
    /// Offsets are converted to UTC; naive timestamps are taken as UTC.
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        let timestamp = timestamp_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(naive.and_utc());
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }

    /// Parse a report date bound given as `YYYYMMDD` or `YYYY-MM-DD`.
    pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
        let date_str = date_str.trim();
        let format = if date_str.contains('-') { "%Y-%m-%d" } else { "%Y%m%d" };

        NaiveDate::parse_from_str(date_str, format).with_context(|| {
            format!("Invalid date '{}'. Use YYYYMMDD or YYYY-MM-DD", date_str)
        })
    }

    /// Midnight UTC at the start of `date`.
    pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
        date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC at the start of the calendar day after `date`.
    pub fn start_of_next_day(date: NaiveDate) -> DateTime<Utc> {
        match date.succ_opt() {
            Some(next) => Self::start_of_day(next),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_z_suffix() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000Z").unwrap();
        assert_eq!(result.hour(), 12);
    }

    #[test]
    fn test_parse_offset_normalized_to_utc() {
        let result = TimestampParser::parse("2024-01-01T23:30:00+09:00").unwrap();
        assert_eq!(result.day(), 1);
        assert_eq!(result.hour(), 14);

        let result = TimestampParser::parse("2024-01-01T20:00:00-05:00").unwrap();
        assert_eq!(result.day(), 2);
        assert_eq!(result.hour(), 1);
    }

    #[test]
    fn test_parse_naive() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000").unwrap();
        assert_eq!(result.hour(), 12);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(TimestampParser::parse("invalid").is_err());
        assert!(TimestampParser::parse("").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(TimestampParser::parse_date("20250115").unwrap(), expected);
        assert_eq!(TimestampParser::parse_date("2025-01-15").unwrap(), expected);
        assert!(TimestampParser::parse_date("2025/01/15").is_err());
        assert!(TimestampParser::parse_date("20251315").is_err());
    }

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(
            TimestampParser::start_of_day(date).to_rfc3339(),
            "2024-02-28T00:00:00+00:00"
        );
        assert_eq!(
            TimestampParser::start_of_next_day(date).to_rfc3339(),
            "2024-02-29T00:00:00+00:00"
        );
    }
}
