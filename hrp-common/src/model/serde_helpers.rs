//! Deserialization helpers for the loosely-typed upstream JSON
//!
//! The upstream API omits or nulls optional collections freely. Everything is
//! normalized here so resolver code never has to branch on absent fields.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Treat `null` as `T::default()` (use with `#[serde(default)]` for absent keys)
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date part
pub(crate) fn flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
        #[serde(default, deserialize_with = "flexible_date")]
        date: Option<NaiveDate>,
    }

    #[test]
    fn test_null_and_absent_collections_become_empty() {
        let sample: Sample = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(sample.items.is_empty());

        let sample: Sample = serde_json::from_str("{}").unwrap();
        assert!(sample.items.is_empty());
        assert!(sample.date.is_none());
    }

    #[test]
    fn test_flexible_date_formats() {
        let sample: Sample = serde_json::from_str(r#"{"date": "2024-03-05"}"#).unwrap();
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2024, 3, 5));

        let sample: Sample =
            serde_json::from_str(r#"{"date": "2024-03-05T10:30:00.000Z"}"#).unwrap();
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2024, 3, 5));

        let sample: Sample = serde_json::from_str(r#"{"date": ""}"#).unwrap();
        assert!(sample.date.is_none());

        assert!(serde_json::from_str::<Sample>(r#"{"date": "next tuesday"}"#).is_err());
    }
}
