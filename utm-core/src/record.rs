//! The five canonical UTM keys and the attribution record built from them

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{UtmError, UtmResult};

/// Prefix shared by every canonical key
pub const UTM_PREFIX: &str = "utm_";

/// One of the five canonical UTM parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UtmKey {
    Campaign,
    Medium,
    Source,
    Term,
    Content,
}

impl UtmKey {
    /// All keys in canonical order
    pub const ALL: [UtmKey; 5] = [
        UtmKey::Campaign,
        UtmKey::Medium,
        UtmKey::Source,
        UtmKey::Term,
        UtmKey::Content,
    ];

    /// Query-string / cookie name of this key
    pub fn as_str(&self) -> &'static str {
        match self {
            UtmKey::Campaign => "utm_campaign",
            UtmKey::Medium => "utm_medium",
            UtmKey::Source => "utm_source",
            UtmKey::Term => "utm_term",
            UtmKey::Content => "utm_content",
        }
    }

    /// Resolve a caller-supplied key, adding the `utm_` prefix when missing.
    ///
    /// `"source"` and `"utm_source"` both resolve to [`UtmKey::Source`].
    pub fn parse(key: &str) -> UtmResult<Self> {
        let prefixed = if key.starts_with(UTM_PREFIX) {
            key.to_string()
        } else {
            format!("{UTM_PREFIX}{key}")
        };

        Self::from_canonical(&prefixed).ok_or(UtmError::UnknownKey(prefixed))
    }

    /// Exact match against the canonical names, no prefixing
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for UtmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the five UTM values associated with a visitor
///
/// Always carries exactly the five canonical keys; a key with no value is
/// `None`, never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionRecord {
    values: [Option<String>; 5],
}

impl AttributionRecord {
    /// Record with every key absent
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: UtmKey) -> Option<&str> {
        self.values[key.index()].as_deref()
    }

    pub fn set(&mut self, key: UtmKey, value: impl Into<String>) {
        self.values[key.index()] = Some(value.into());
    }

    /// Copy every present value of `other` over this record.
    /// Keys absent in `other` keep their current value.
    pub fn overlay(&mut self, other: &AttributionRecord) {
        for (key, value) in other.present() {
            self.set(key, value);
        }
    }

    /// All five entries in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (UtmKey, Option<&str>)> {
        UtmKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    /// Only the entries that carry a value
    pub fn present(&self) -> impl Iterator<Item = (UtmKey, &str)> {
        self.iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
    }

    /// True when no key carries a value
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

impl FromIterator<(UtmKey, String)> for AttributionRecord {
    fn from_iter<I: IntoIterator<Item = (UtmKey, String)>>(iter: I) -> Self {
        let mut record = AttributionRecord::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

impl Serialize for AttributionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(UtmKey::ALL.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_adds_prefix() {
        assert_eq!(UtmKey::parse("source").unwrap(), UtmKey::Source);
        assert_eq!(UtmKey::parse("utm_source").unwrap(), UtmKey::Source);
        assert_eq!(UtmKey::parse("content").unwrap(), UtmKey::Content);
    }

    #[test]
    fn test_parse_unknown_key_reports_prefixed_name() {
        let err = UtmKey::parse("bogus").unwrap_err();
        assert_eq!(err, UtmError::UnknownKey("utm_bogus".to_string()));

        let err = UtmKey::parse("utm_id").unwrap_err();
        assert_eq!(err, UtmError::UnknownKey("utm_id".to_string()));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(UtmKey::parse("Source").is_err());
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = AttributionRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.iter().count(), 5);
        assert_eq!(record.present().count(), 0);
    }

    #[test]
    fn test_overlay_keeps_values_missing_from_other() {
        let mut base: AttributionRecord = [(UtmKey::Source, "old".to_string())]
            .into_iter()
            .collect();
        let other: AttributionRecord = [(UtmKey::Medium, "cpc".to_string())]
            .into_iter()
            .collect();

        base.overlay(&other);

        assert_eq!(base.get(UtmKey::Source), Some("old"));
        assert_eq!(base.get(UtmKey::Medium), Some("cpc"));
        assert_eq!(base.get(UtmKey::Term), None);
    }

    #[test]
    fn test_overlay_replaces_conflicting_values() {
        let mut base: AttributionRecord = [(UtmKey::Source, "old".to_string())]
            .into_iter()
            .collect();
        let other: AttributionRecord = [(UtmKey::Source, "new".to_string())]
            .into_iter()
            .collect();

        base.overlay(&other);
        assert_eq!(base.get(UtmKey::Source), Some("new"));
    }

    #[test]
    fn test_serialize_exposes_all_five_keys() {
        let record: AttributionRecord = [(UtmKey::Campaign, "spring".to_string())]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 5);
        assert_eq!(obj["utm_campaign"], "spring");
        assert!(obj["utm_medium"].is_null());
        assert!(obj["utm_content"].is_null());
    }
}
