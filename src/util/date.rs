//! Lenient ISO-8601 date handling.
//!
//! CityJSON carries `creationDate`/`terminationDate` literals as plain
//! `YYYY-MM-DD` strings. Malformed literals decode to "absent" and traversal
//! continues; they never abort a document decode.

use time::macros::format_description;
use time::Date;

/// Parse a `YYYY-MM-DD` literal. Returns `None` on any parse failure.
pub fn parse_date(literal: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(literal, format).ok()
}

/// Format a date as a `YYYY-MM-DD` literal.
pub fn format_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(format).unwrap_or_else(|_| date.to_string())
}

/// Serde adapter for optional date fields with lenient decode.
///
/// Use with `#[serde(with = "crate::util::date::iso_date")]`.
pub mod iso_date {
    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::Deserialize;
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        // Anything that is not a well-formed date string decodes to None.
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(s)) => {
                let date = super::parse_date(&s);
                if date.is_none() {
                    tracing::warn!(literal = %s, "skipping malformed date literal");
                }
                date
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-01"), Some(date!(2024 - 03 - 01)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_format_roundtrip() {
        let d = date!(1999 - 12 - 31);
        assert_eq!(parse_date(&format_date(d)), Some(d));
    }
}
