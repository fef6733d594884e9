//! Cookie wire format: a compact JSON object of the present UTM values

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::record::{AttributionRecord, UtmKey};

/// Encode the present entries of `record` as compact JSON.
/// Absent keys are omitted.
pub fn encode(record: &AttributionRecord) -> String {
    let object: Map<String, Value> = record
        .present()
        .map(|(key, value)| (key.as_str().to_string(), Value::String(value.to_string())))
        .collect();
    Value::Object(object).to_string()
}

/// Decode a raw cookie payload.
///
/// Never fails: anything that is not a JSON object decodes to an empty map.
/// Null entries, nested values and non-canonical keys are dropped. Numbers
/// keep their textual form; `true` becomes `"1"` and `false` becomes `""`.
pub fn decode(raw: &str) -> BTreeMap<UtmKey, String> {
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            tracing::debug!("ignoring attribution cookie that is not an object: {}", other);
            return BTreeMap::new();
        }
        Err(e) => {
            tracing::debug!("ignoring malformed attribution cookie: {}", e);
            return BTreeMap::new();
        }
    };

    object
        .into_iter()
        .filter_map(|(name, value)| {
            let key = UtmKey::from_canonical(&name)?;
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "1".to_string(),
                Value::Bool(false) => String::new(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_omits_absent_keys() {
        let mut record = AttributionRecord::new();
        record.set(UtmKey::Medium, "cpc");
        assert_eq!(encode(&record), r#"{"utm_medium":"cpc"}"#);
    }

    #[test]
    fn test_encode_empty_record() {
        assert_eq!(encode(&AttributionRecord::new()), "{}");
    }

    #[test]
    fn test_full_record_survives_encoding() {
        let record: AttributionRecord = [
            (UtmKey::Campaign, "spring"),
            (UtmKey::Medium, "cpc"),
            (UtmKey::Source, "google"),
            (UtmKey::Term, "running shoes"),
            (UtmKey::Content, "banner-a"),
        ]
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect();

        let decoded: AttributionRecord = decode(&encode(&record)).into_iter().collect();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_malformed_is_empty() {
        assert!(decode("not json").is_empty());
        assert!(decode("").is_empty());
        assert!(decode(r#"{"utm_source":"#).is_empty());
    }

    #[test]
    fn test_decode_non_object_is_empty() {
        assert!(decode(r#"["utm_source"]"#).is_empty());
        assert!(decode(r#""google""#).is_empty());
        assert!(decode("null").is_empty());
    }

    #[test]
    fn test_decode_drops_nulls_and_unknown_keys() {
        let decoded = decode(r#"{"utm_source":"old","utm_medium":null,"gclid":"abc"}"#);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[&UtmKey::Source], "old");
    }

    #[test]
    fn test_decode_stringifies_scalars() {
        let decoded = decode(
            r#"{"utm_term":42,"utm_content":true,"utm_source":false,"utm_campaign":{"a":1}}"#,
        );
        assert_eq!(decoded[&UtmKey::Term], "42");
        assert_eq!(decoded[&UtmKey::Content], "1");
        assert_eq!(decoded[&UtmKey::Source], "");
        assert!(!decoded.contains_key(&UtmKey::Campaign));
    }
}
