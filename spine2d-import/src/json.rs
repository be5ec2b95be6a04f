//! Spine JSON document access.
//!
//! The document is kept as a `serde_json` object and individual elements are deserialized
//! one at a time, so a single malformed bone, slot or key is reported and dropped instead
//! of failing the whole parse.

use crate::Error;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A parsed skeleton document whose root is a JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonDocument {
    root: Map<String, Value>,
}

impl SkeletonDocument {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::InvalidDocument {
                message: format!("expected a JSON object at the root, found {}", kind(&other)),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.root.keys().map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.root.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn spine_version(&self) -> Option<String> {
        let header: SkeletonHeader = serde_json::from_value(self.get("skeleton")?.clone()).ok()?;
        header.spine
    }
}

#[derive(Debug, Deserialize)]
struct SkeletonHeader {
    #[serde(default)]
    spine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoneDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub length: Option<Value>,
    #[serde(default)]
    pub x: Option<Value>,
    #[serde(default)]
    pub y: Option<Value>,
    #[serde(default)]
    pub rotation: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlotDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bone: Option<String>,
    #[serde(default)]
    pub attachment: Option<AttachmentDef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AttachmentDef {
    Name(String),
    Sized {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        width: Option<Value>,
        #[serde(default)]
        height: Option<Value>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyDef {
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub x: Option<Value>,
    #[serde(default)]
    pub y: Option<Value>,
    #[serde(default)]
    pub angle: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Accepts JSON numbers and numeric strings; anything non-finite is rejected.
pub(crate) fn number(value: &Value) -> Option<f32> {
    let n = match value {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => s.trim().parse::<f32>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Reads an optional numeric field. A present but unusable value comes back as `Err`
/// holding its JSON text.
pub(crate) fn number_or(value: Option<&Value>, default: f32) -> Result<f32, String> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(v) => number(v).ok_or_else(|| v.to_string()),
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// True for `null`, `[]`, `{}` and `""`.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_must_be_an_object() {
        assert!(SkeletonDocument::from_json_str("{}").is_ok());
        let err = SkeletonDocument::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
        let err = SkeletonDocument::from_json_str("{ bones: ").unwrap_err();
        assert!(matches!(err, Error::JsonParse { .. }));
    }

    #[test]
    fn keys_keep_document_order() {
        let doc = SkeletonDocument::from_json_str(r#"{ "zeta": 1, "alpha": 2, "mid": 3 }"#)
            .unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        assert_eq!(number(&json!(1.5)), Some(1.5));
        assert_eq!(number(&json!(" -2 ")), Some(-2.0));
        assert_eq!(number(&json!("abc")), None);
        assert_eq!(number(&json!(true)), None);
        assert_eq!(number_or(None, 7.0), Ok(7.0));
        assert_eq!(number_or(Some(&Value::Null), 7.0), Ok(7.0));
        assert_eq!(number_or(Some(&json!([1])), 7.0), Err("[1]".to_string()));
    }

    #[test]
    fn header_version_is_optional() {
        let doc =
            SkeletonDocument::from_json_str(r#"{ "skeleton": { "spine": "4.2.43" } }"#).unwrap();
        assert_eq!(doc.spine_version().as_deref(), Some("4.2.43"));
        assert_eq!(SkeletonDocument::default().spine_version(), None);
    }
}
