//! Provider-neutral event boundary types.
//!
//! An event boundary is either a calendar date (all-day events, no time of
//! day and no zone) or an instant. The two are mutually exclusive: a staged
//! boundary is always exactly one of them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day boundary
    Date(NaiveDate),
    /// Timed boundary as RFC 3339 text, handed to the provider verbatim
    DateTime(String),
}

impl EventTime {
    /// Reduce an instant to the calendar date it falls on in `tz`,
    /// discarding the time of day.
    ///
    /// A bare date (`2025-07-10`) is taken as-is.
    pub fn date_from_instant(value: &str, tz: &Tz) -> CoreResult<Self> {
        if let Ok(date) = value.parse::<NaiveDate>() {
            return Ok(EventTime::Date(date));
        }

        Ok(EventTime::Date(parse_instant(value, tz)?.date_naive()))
    }

    /// This boundary as a calendar date in `tz`.
    pub fn to_date(&self, tz: &Tz) -> CoreResult<NaiveDate> {
        match self {
            EventTime::Date(date) => Ok(*date),
            EventTime::DateTime(value) => Ok(parse_instant(value, tz)?.date_naive()),
        }
    }

    /// This boundary as RFC 3339 text. Dates become local midnight in `tz`.
    pub fn to_date_time(&self, tz: &Tz) -> CoreResult<String> {
        match self {
            EventTime::DateTime(value) => Ok(value.clone()),
            EventTime::Date(date) => {
                let midnight = date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| CoreError::InvalidTime(date.to_string()))?;
                let local = tz
                    .from_local_datetime(&midnight)
                    .earliest()
                    .ok_or_else(|| CoreError::InvalidTime(date.to_string()))?;
                Ok(local.to_rfc3339())
            }
        }
    }
}

/// Parse an instant, accepting RFC 3339 or a zone-less local date-time
/// (interpreted in `tz`).
pub fn parse_instant(value: &str, tz: &Tz) -> CoreResult<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(tz));
    }

    if let Ok(naive) = value.parse::<NaiveDateTime>() {
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| CoreError::InvalidTime(value.to_string()));
    }

    Err(CoreError::InvalidTime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_utc_instant() {
        let time = EventTime::date_from_instant("2025-07-10T00:00:00Z", &Tz::UTC).unwrap();

        assert_eq!(
            time,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap())
        );
    }

    #[test]
    fn test_date_from_instant_uses_local_zone() {
        // 02:00 UTC is still the previous evening in New York
        let time =
            EventTime::date_from_instant("2025-07-10T02:00:00Z", &Tz::America__New_York).unwrap();

        assert_eq!(
            time,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 9).unwrap())
        );
    }

    #[test]
    fn test_date_from_bare_date() {
        let time = EventTime::date_from_instant("2025-07-11", &Tz::Asia__Tokyo).unwrap();

        assert_eq!(
            time,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 11).unwrap())
        );
    }

    #[test]
    fn test_date_from_naive_local_instant() {
        let time = EventTime::date_from_instant("2025-07-10T23:30:00", &Tz::Europe__Berlin).unwrap();

        assert_eq!(
            time,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap())
        );
    }

    #[test]
    fn test_invalid_instant_is_rejected() {
        let err = EventTime::date_from_instant("next tuesday", &Tz::UTC).unwrap_err();

        assert_eq!(err, CoreError::InvalidTime("next tuesday".to_string()));
        assert_eq!(err.to_string(), "Invalid time value: next tuesday");
    }

    #[test]
    fn test_date_to_date_time_is_local_midnight() {
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap());

        assert_eq!(
            date.to_date_time(&Tz::UTC).unwrap(),
            "2025-07-10T00:00:00+00:00"
        );
        assert_eq!(
            date.to_date_time(&Tz::Europe__Berlin).unwrap(),
            "2025-07-10T00:00:00+02:00"
        );
    }

    #[test]
    fn test_date_time_is_passed_through() {
        let time = EventTime::DateTime("2025-07-10T09:00:00Z".to_string());

        assert_eq!(time.to_date_time(&Tz::UTC).unwrap(), "2025-07-10T09:00:00Z");
        assert_eq!(
            time.to_date(&Tz::UTC).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 10).unwrap()
        );
    }
}
