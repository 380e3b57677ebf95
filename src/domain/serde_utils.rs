//! Serde utilities for catalog payloads.

/// Wire format of catalog dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Module to handle `yyyy-MM-dd` release dates that may be absent, `null` or empty.
///
/// The catalog sometimes sends a zero-length string instead of `null`; both
/// decode to `None`. A value in any other format is logged and treated as absent.
pub mod release_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    /// Serializes an optional date as `yyyy-MM-dd`, or `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional `yyyy-MM-dd` date.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a string nor `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    fn parse(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(value, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(value, error = %e, "Release date is not in the expected format");
                None
            }
        }
    }
}
