//! JSON conversion for [`Identifier`].
//!
//! On the wire an identifier is always a JSON string holding the canonical form. Decoding only
//! accepts strings; every other JSON value kind is rejected with the same [`ParseError`] that
//! malformed text produces.

use crate::{Identifier, ParseError, ParseErrorKind, UuidResult};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Encodes an identifier as a JSON string literal.
///
/// Quoting and escaping are done by `serde_json`. Rendering a [`Value`] cannot fail, so this
/// returns the text directly instead of a `Result`.
///
/// # Returns
///
/// Returns the canonical form wrapped in JSON string quotes.
pub fn to_json_text(id: &Identifier) -> String {
    Value::String(id.render()).to_string()
}

/// Decodes an identifier from JSON text holding a single string.
///
/// # Errors
///
/// Returns [`ParseError`] if `text` is not valid JSON, is not a JSON string, or holds a string
/// that [`Identifier::parse`] rejects.
pub fn from_json_text(text: &str) -> UuidResult<Identifier> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ParseError::new(ParseErrorKind::MalformedJson(e.to_string())))?;

    match value {
        Value::String(s) => Identifier::parse(&s),
        other => Err(not_a_string(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn not_a_string(kind: &'static str) -> ParseError {
    ParseError::new(ParseErrorKind::NotAString(kind))
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Self-describing formats hand over whatever value is present so that non-strings
        // surface as a ParseError rather than a generic type mismatch.
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(IdentifierVisitor)
        } else {
            deserializer.deserialize_str(IdentifierVisitor)
        }
    }
}

struct IdentifierVisitor;

impl<'de> Visitor<'de> for IdentifierVisitor {
    type Value = Identifier;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a canonical hyphenated UUID string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Identifier, E> {
        Identifier::parse(v).map_err(E::custom)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Identifier, E> {
        Err(E::custom(not_a_string("boolean")))
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Identifier, E> {
        Err(E::custom(not_a_string("number")))
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Identifier, E> {
        Err(E::custom(not_a_string("number")))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Identifier, E> {
        Err(E::custom(not_a_string("number")))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Identifier, E> {
        Err(E::custom(not_a_string("null")))
    }

    fn visit_none<E: de::Error>(self) -> Result<Identifier, E> {
        Err(E::custom(not_a_string("null")))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<Identifier, A::Error> {
        Err(de::Error::custom(not_a_string("array")))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<Identifier, A::Error> {
        Err(de::Error::custom(not_a_string("object")))
    }
}
