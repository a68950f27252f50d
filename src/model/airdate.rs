//! Serde adapter for episode air dates.
//!
//! The backend sends air dates as `YYYY-MM-DD` and uses an empty string for
//! episodes without a known air date.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%d";

pub(super) fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
        None => serializer.serialize_str(""),
    }
}

pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
