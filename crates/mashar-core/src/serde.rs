//! Deserializers for the loosely typed values the front-end sends.
//!
//! Form fields arrive as strings as often as native JSON values: `"true"`
//! for booleans, `"100"` for numbers, `""` for "not set".

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// Accepts `true`, `false`, `"true"`, `"false"` (case-insensitive) and `""` as false.
pub fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid boolean: {other}"))),
        },
    }
}

/// Accepts a number or a numeric string; empty strings are `None`.
pub fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

/// Accepts a string or a number and always yields a string.
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::String(s) => Ok(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Flag {
        #[serde(deserialize_with = "deserialize_bool_or_string")]
        active: bool,
    }

    #[derive(Deserialize)]
    struct Num {
        #[serde(default, deserialize_with = "deserialize_optional_number")]
        value: Option<f64>,
    }

    #[derive(Deserialize)]
    struct Text {
        #[serde(deserialize_with = "deserialize_string_or_number")]
        value: String,
    }

    #[test]
    fn test_bool_variants() {
        let f: Flag = serde_json::from_str(r#"{"active":true}"#).unwrap();
        assert!(f.active);
        let f: Flag = serde_json::from_str(r#"{"active":"true"}"#).unwrap();
        assert!(f.active);
        let f: Flag = serde_json::from_str(r#"{"active":"False"}"#).unwrap();
        assert!(!f.active);
        assert!(serde_json::from_str::<Flag>(r#"{"active":"maybe"}"#).is_err());
    }

    #[test]
    fn test_number_variants() {
        let n: Num = serde_json::from_str(r#"{"value":"12.5"}"#).unwrap();
        assert_eq!(n.value, Some(12.5));
        let n: Num = serde_json::from_str(r#"{"value":7}"#).unwrap();
        assert_eq!(n.value, Some(7.0));
        let n: Num = serde_json::from_str(r#"{"value":""}"#).unwrap();
        assert_eq!(n.value, None);
        let n: Num = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(n.value, None);
        assert!(serde_json::from_str::<Num>(r#"{"value":"abc"}"#).is_err());
    }

    #[test]
    fn test_string_or_number() {
        let t: Text = serde_json::from_str(r#"{"value":2024}"#).unwrap();
        assert_eq!(t.value, "2024");
        let t: Text = serde_json::from_str(r#"{"value":"2024"}"#).unwrap();
        assert_eq!(t.value, "2024");
    }
}
