//! Serde helpers for the loosely-typed date and time fields editors send.
//!
//! Form clients submit `""` for an unset date or time, so both helpers map the
//! empty string to `None` and serialize `None` back as `""`.

use chrono::{NaiveDate, NaiveTime};

/// Wire format for event dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for event times (seconds are accepted on input).
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses an event date, treating blank input as unset.
pub fn parse_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map(Some)
}

/// Parses an event time, treating blank input as unset.
pub fn parse_time(value: &str) -> Result<Option<NaiveTime>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(Some)
}

pub mod optional_date {
    use super::{parse_date, DATE_FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) => parse_date(&s).map_err(|_| {
                serde::de::Error::custom(format!("invalid date '{}', expected YYYY-MM-DD", s))
            }),
            None => Ok(None),
        }
    }
}

pub mod optional_time {
    use super::{parse_time, TIME_FORMAT};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(TIME_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) => parse_time(&s).map_err(|_| {
                serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", s))
            }),
            None => Ok(None),
        }
    }
}
