// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveTime;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::types::date::Date;

/// A UTC timestamp with millisecond precision.
///
/// The text form is RFC 3339 with a `Z` suffix. Parsing accepts any RFC 3339
/// string with an explicit offset and normalizes it to UTC; strings without an
/// offset are rejected.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    /// Converts a timestamp into a `DateTime<Utc>`.
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// The current timestamp.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Midnight UTC at the start of the given date.
    pub fn start_of(date: Date) -> Self {
        Self(date.into_inner().and_time(NaiveTime::MIN).and_utc())
    }

    /// The UTC date component of this timestamp.
    pub fn date(self) -> Date {
        Date::new(self.0.date_naive())
    }

    /// The last representable instant of this timestamp's UTC day.
    pub fn end_of_day(self) -> Self {
        let start = Self::start_of(self.date());
        Self(start.0 + Duration::days(1) - Duration::milliseconds(1))
    }

    /// This timestamp shifted by a whole number of days, saturating at the
    /// limits of the representable range.
    pub fn plus_days(self, days: i64) -> Self {
        let shifted = Duration::try_days(days).and_then(|d| self.0.checked_add_signed(d));
        match shifted {
            Some(dt) => Self(dt),
            None if days < 0 => Self(DateTime::<Utc>::MIN_UTC.trunc_subsecs(3)),
            None => Self(DateTime::<Utc>::MAX_UTC.trunc_subsecs(3)),
        }
    }

    /// Whole days elapsed from `earlier` to `self`, truncated toward zero.
    pub fn whole_days_since(self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let dt = DateTime::parse_from_rfc3339(value.trim()).map_err(|_| {
            ErrorReport::new(format!(
                "Failed to parse timestamp: '{value}'. Timestamps must carry an explicit offset."
            ))
        })?;
        Ok(Timestamp::new(dt.with_timezone(&Utc)))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_timestamp_to_string() {
        assert_eq!(
            ts("2023-10-05T14:30:15.123Z").to_string(),
            "2023-10-05T14:30:15.123Z"
        );
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        assert_eq!(
            ts("2023-10-05T14:30:15+02:00").to_string(),
            "2023-10-05T12:30:15.000Z"
        );
    }

    #[test]
    fn test_naive_timestamp_is_rejected() {
        assert!(Timestamp::try_from("2023-10-05T14:30:15.123".to_string()).is_err());
        assert!(Timestamp::try_from("2023-10-05 14:30:15".to_string()).is_err());
    }

    #[test]
    fn test_subseconds_are_truncated() {
        assert_eq!(
            ts("2023-10-05T14:30:15.123456Z").to_string(),
            "2023-10-05T14:30:15.123Z"
        );
    }

    #[test]
    fn test_serde() {
        let t = ts("2023-10-05T14:30:15.123Z");
        let serialized = serde_json::to_string(&t).unwrap();
        assert_eq!(serialized, "\"2023-10-05T14:30:15.123Z\"");
        let back: Timestamp = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_end_of_day() {
        assert_eq!(
            ts("2024-01-10T08:00:00Z").end_of_day(),
            ts("2024-01-10T23:59:59.999Z")
        );
    }

    #[test]
    fn test_start_of() {
        let date = Date::new(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(Timestamp::start_of(date), ts("2024-02-29T00:00:00Z"));
    }

    #[test]
    fn test_whole_days_truncate() {
        let a = ts("2024-01-01T12:00:00Z");
        assert_eq!(ts("2024-01-02T11:59:59Z").whole_days_since(a), 0);
        assert_eq!(ts("2024-01-02T12:00:00Z").whole_days_since(a), 1);
        assert_eq!(ts("2024-01-11T12:00:00Z").whole_days_since(a), 10);
    }

    #[test]
    fn test_plus_days() {
        assert_eq!(
            ts("2024-01-10T00:00:00Z").plus_days(13),
            ts("2024-01-23T00:00:00Z")
        );
    }
}
