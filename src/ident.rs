//! Property identifier resolution.
//!
//! Property ids arrive in three surface forms: a JSON number (`7`), a
//! digit-only string (`"7"`) and the legacy `prop-` form with any amount of
//! zero padding (`"prop-007"`). [`resolve`] is the single place where those
//! forms are normalised into a [`PropertyId`]; everything that accepts a
//! property id from the outside (path segments, query strings, request
//! bodies) goes through it. Resolution is purely syntactic and never touches
//! the store.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

// ---

const LEGACY_PREFIX: &str = "prop-";

/// Canonical property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PropertyId(i64);

impl PropertyId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Legacy display form, e.g. `prop-001`.
    pub fn legacy(self) -> String {
        format!("{LEGACY_PREFIX}{:03}", self.0)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PropertyId> for i64 {
    fn from(id: PropertyId) -> Self {
        id.0
    }
}

/// An identifier as received from a client, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawId<'a> {
    Number(i64),
    Text(&'a str),
}

impl From<i64> for RawId<'_> {
    fn from(n: i64) -> Self {
        RawId::Number(n)
    }
}

impl<'a> From<&'a str> for RawId<'a> {
    fn from(s: &'a str) -> Self {
        RawId::Text(s)
    }
}

impl<'a> From<&'a String> for RawId<'a> {
    fn from(s: &'a String) -> Self {
        RawId::Text(s.as_str())
    }
}

/// Normalise a raw identifier.
///
/// Returns `None` when the input matches none of the accepted forms. Callers
/// must surface that as "not found"; there is no fallback id.
pub fn resolve<'a>(raw: impl Into<RawId<'a>>) -> Option<PropertyId> {
    // ---
    match raw.into() {
        RawId::Number(n) => Some(PropertyId(n)),
        RawId::Text(s) => resolve_text(s),
    }
}

fn resolve_text(s: &str) -> Option<PropertyId> {
    // ---
    if is_digits(s) {
        return s.parse().ok().map(PropertyId);
    }

    if let Some(rest) = s.strip_prefix(LEGACY_PREFIX) {
        // Leading zeros are absorbed by the integer parse.
        if is_digits(rest) {
            return rest.parse().ok().map(PropertyId);
        }
        return None;
    }

    s.trim().parse().ok().map(PropertyId)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Request bodies and query strings carry property ids in any surface form.
impl<'de> Deserialize<'de> for PropertyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PropertyIdVisitor)
    }
}

struct PropertyIdVisitor;

impl de::Visitor<'_> for PropertyIdVisitor {
    type Value = PropertyId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a property id such as 7, \"7\" or \"prop-007\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<PropertyId, E> {
        Ok(PropertyId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<PropertyId, E> {
        i64::try_from(v)
            .map(PropertyId)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PropertyId, E> {
        resolve(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_all_forms_resolve_to_same_id() {
        // ---
        for n in [0_i64, 1, 7, 42, 100, 12345] {
            let expected = Some(PropertyId::new(n));
            assert_eq!(resolve(n), expected);
            assert_eq!(resolve(n.to_string().as_str()), expected);
            for width in 0..8 {
                let padded = format!("prop-{:0width$}", n, width = width);
                assert_eq!(resolve(padded.as_str()), expected, "{padded}");
            }
        }
    }

    #[test]
    fn test_legacy_zero_padding() {
        // ---
        assert_eq!(resolve("prop-001"), Some(PropertyId::new(1)));
        assert_eq!(resolve("prop-1"), Some(PropertyId::new(1)));
        assert_eq!(resolve("prop-000"), Some(PropertyId::new(0)));
        assert_eq!(resolve("prop-0000000000000000000000042"), Some(PropertyId::new(42)));
    }

    #[test]
    fn test_generic_integer_fallback() {
        // ---
        assert_eq!(resolve(" 12 "), Some(PropertyId::new(12)));
        assert_eq!(resolve("+3"), Some(PropertyId::new(3)));
    }

    #[test]
    fn test_unresolvable_inputs() {
        // ---
        for bad in ["", "abc", "prop-", "prop-abc", "prop-12a", "PROP-001", "1.5", "99999999999999999999"] {
            assert_eq!(resolve(bad), None, "{bad:?} should not resolve");
        }
    }

    #[test]
    fn test_legacy_display() {
        // ---
        assert_eq!(PropertyId::new(1).legacy(), "prop-001");
        assert_eq!(PropertyId::new(1234).legacy(), "prop-1234");
    }

    #[test]
    fn test_deserialize_accepts_every_form() {
        // ---
        let ids: Vec<PropertyId> = serde_json::from_str(r#"[5, "5", "prop-005"]"#).unwrap();
        assert!(ids.iter().all(|id| *id == PropertyId::new(5)));

        let bad = serde_json::from_str::<PropertyId>(r#""unit-5""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        // ---
        assert_eq!(serde_json::to_string(&PropertyId::new(9)).unwrap(), "9");
    }
}
