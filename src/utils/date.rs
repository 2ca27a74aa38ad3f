use anyhow::{Result, bail};
use serde::{Serialize, Serializer};
use std::fmt;

/// UTC datetime without timezone complexity.
///
/// Field order gives the derived `Ord` chronological meaning, which is what
/// collection sorting relies on. A page without a date is `None`, and
/// `Option`'s ordering (`None < Some`) makes the missing date the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Parse from "YYYY-MM-DD" or "YYYY-MM-DDTHH:MM:SSZ" format
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        // Parse date part
        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        // Check for time part (RFC3339)
        let (hour, minute, second) = if bytes.len() >= 20 && bytes[10] == b'T' && bytes[19] == b'Z'
        {
            if bytes[13] != b':' || bytes[16] != b':' {
                return None;
            }
            (
                parse_u8(&bytes[11..13])?,
                parse_u8(&bytes[14..16])?,
                parse_u8(&bytes[17..19])?,
            )
        } else if bytes.len() == 10 {
            (0, 0, 0)
        } else {
            return None;
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    /// Format the date part as "YYYY/MM/DD" (used by page id generation).
    pub fn ymd_path(&self) -> String {
        format!("{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }

    #[inline]
    fn is_leap_year(year: u16) -> bool {
        year.is_multiple_of(4) && (!year.is_multiple_of(100) || year.is_multiple_of(400))
    }

    #[inline]
    fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }
}

impl fmt::Display for DateTimeUtc {
    /// "YYYY-MM-DD" for midnight dates, full RFC3339 otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hour == 0 && self.minute == 0 && self.second == 0 {
            write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
        } else {
            write!(
                f,
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            )
        }
    }
}

impl Serialize for DateTimeUtc {
    /// Dates land in render contexts as their canonical string form.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + d as u16;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_utc_new() {
        let dt = DateTimeUtc::new(2024, 6, 15, 14, 30, 45);
        assert_eq!(dt.year, 2024);
        assert_eq!(dt.month, 6);
        assert_eq!(dt.day, 15);
        assert_eq!(dt.hour, 14);
        assert_eq!(dt.minute, 30);
        assert_eq!(dt.second, 45);
    }

    #[test]
    fn test_datetime_utc_from_ymd() {
        let dt = DateTimeUtc::from_ymd(2024, 12, 25);
        assert_eq!(dt.year, 2024);
        assert_eq!(dt.month, 12);
        assert_eq!(dt.day, 25);
        assert_eq!(dt.hour, 0);
        assert_eq!(dt.minute, 0);
        assert_eq!(dt.second, 0);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = DateTimeUtc::parse("2024-03-05").unwrap();
        assert_eq!(dt, DateTimeUtc::from_ymd(2024, 3, 5));
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = DateTimeUtc::parse("2024-03-05T14:30:45Z").unwrap();
        assert_eq!(dt, DateTimeUtc::new(2024, 3, 5, 14, 30, 45));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let dt = DateTimeUtc::parse(" 2024-03-05 ").unwrap();
        assert_eq!(dt, DateTimeUtc::from_ymd(2024, 3, 5));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(DateTimeUtc::parse("not a date").is_none());
        assert!(DateTimeUtc::parse("2024-3-5").is_none());
        assert!(DateTimeUtc::parse("2024-13-01").is_none());
        assert!(DateTimeUtc::parse("2024-02-30").is_none());
        assert!(DateTimeUtc::parse("").is_none());
    }

    #[test]
    fn test_datetime_utc_validate_valid() {
        // Valid date
        assert!(DateTimeUtc::new(2024, 6, 15, 14, 30, 45).validate().is_ok());

        // Edge cases - start of day
        assert!(DateTimeUtc::new(2024, 1, 1, 0, 0, 0).validate().is_ok());

        // Edge cases - end of day
        assert!(
            DateTimeUtc::new(2024, 12, 31, 23, 59, 59)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_datetime_utc_validate_invalid_month() {
        // Month 0
        assert!(DateTimeUtc::new(2024, 0, 15, 12, 0, 0).validate().is_err());

        // Month 13
        assert!(DateTimeUtc::new(2024, 13, 15, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_datetime_utc_validate_invalid_day() {
        // Day 0
        assert!(DateTimeUtc::new(2024, 6, 0, 12, 0, 0).validate().is_err());

        // Day 32 in a 31-day month
        assert!(DateTimeUtc::new(2024, 1, 32, 12, 0, 0).validate().is_err());

        // Day 31 in a 30-day month
        assert!(DateTimeUtc::new(2024, 4, 31, 12, 0, 0).validate().is_err());

        // Day 29 in February (non-leap year)
        assert!(DateTimeUtc::new(2023, 2, 29, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_datetime_utc_validate_leap_year() {
        // Leap year - Feb 29 is valid
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok()); // divisible by 400

        // Non-leap year - Feb 29 is invalid
        assert!(DateTimeUtc::new(2023, 2, 29, 12, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err()); // divisible by 100 but not 400
    }

    #[test]
    fn test_ordering_chronological() {
        let early = DateTimeUtc::from_ymd(2024, 1, 1);
        let mid = DateTimeUtc::from_ymd(2024, 2, 1);
        let late = DateTimeUtc::new(2024, 2, 1, 10, 0, 0);

        assert!(early < mid);
        assert!(mid < late);
        assert!(early < late);
    }

    #[test]
    fn test_ordering_none_is_minimum() {
        // Collection sorting relies on None < Some
        let none: Option<DateTimeUtc> = None;
        let some = Some(DateTimeUtc::from_ymd(1970, 1, 1));
        assert!(none < some);
    }

    #[test]
    fn test_display_date_only() {
        let dt = DateTimeUtc::from_ymd(2024, 3, 5);
        assert_eq!(dt.to_string(), "2024-03-05");
    }

    #[test]
    fn test_display_with_time() {
        let dt = DateTimeUtc::new(2024, 3, 5, 14, 30, 45);
        assert_eq!(dt.to_string(), "2024-03-05T14:30:45Z");
    }

    #[test]
    fn test_ymd_path() {
        let dt = DateTimeUtc::from_ymd(2024, 3, 5);
        assert_eq!(dt.ymd_path(), "2024/03/05");
    }

    #[test]
    fn test_serialize_as_string() {
        let dt = DateTimeUtc::from_ymd(2024, 3, 5);
        let json = serde_json::to_string(&dt).unwrap();
        assert_eq!(json, "\"2024-03-05\"");
    }
}
