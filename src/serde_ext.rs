//! Lenient deserializers for backend payloads.
//!
//! The scoring backend is not strict about JSON types: numeric columns can
//! arrive as strings ("95.00") and identifiers as integers.

use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid number {:?}: {}", s, e))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    opt_id(d)?.ok_or_else(|| D::Error::custom("missing id"))
}

pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected an id, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::opt_f64")]
        value: Option<f64>,
        #[serde(default, deserialize_with = "super::opt_id")]
        id: Option<String>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let p: Probe = serde_json::from_str(r#"{"value":"95.50","id":42}"#).unwrap();
        assert_eq!(p.value, Some(95.5));
        assert_eq!(p.id.as_deref(), Some("42"));

        let p: Probe = serde_json::from_str(r#"{"value":120,"id":"u-1"}"#).unwrap();
        assert_eq!(p.value, Some(120.0));
        assert_eq!(p.id.as_deref(), Some("u-1"));
    }

    #[test]
    fn null_blank_and_missing_are_absent() {
        let p: Probe = serde_json::from_str(r#"{"value":null}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Probe = serde_json::from_str(r#"{"value":"  "}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(p.value, None);
        assert_eq!(p.id, None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Probe>(r#"{"value":"ninety"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"value":[1]}"#).is_err());
    }
}
