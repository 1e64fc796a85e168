//! Documents and view query results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque JSON document
///
/// The library only reads documents and annotates copies with `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON value; `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a field if it holds a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The `id` field, falling back to the store's `_id`
    pub fn id(&self) -> Option<&str> {
        self.get_str("id").or_else(|| self.get_str("_id"))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Login credentials, as stored in an auth file: `{"user": ..., "pass": ...}`
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}

/// One row of a view response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// Source document id; absent for reduced rows
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
}

impl ViewRow {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: Some(id.into()),
            key: Value::Null,
            value,
        }
    }
}

/// Response of one view page query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewQueryResult {
    /// Row count of the unpaged result set
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}

/// Paging parameters for a view query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub skip: usize,
    /// `None` returns every remaining row
    pub limit: Option<usize>,
}

impl ViewOptions {
    /// Every row, unpaged
    pub fn all() -> Self {
        Self::default()
    }

    /// One page of `limit` rows starting at `skip`
    pub fn page(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: Some(limit),
        }
    }

    /// Zero-row page, used for counting
    pub fn count_only() -> Self {
        Self::page(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_from_value() {
        assert!(Document::from_value(json!({"a": 1})).is_some());
        assert!(Document::from_value(json!("text")).is_none());
        assert!(Document::from_value(Value::Null).is_none());
    }

    #[test]
    fn test_document_id_fallback() {
        let doc = Document::from_value(json!({"_id": "abc"})).unwrap();
        assert_eq!(doc.id(), Some("abc"));
        let doc = Document::from_value(json!({"_id": "abc", "id": "def"})).unwrap();
        assert_eq!(doc.id(), Some("def"));
    }

    #[test]
    fn test_view_result_decodes_couch_shape() {
        let raw = r#"{"total_rows":3,"offset":1,"rows":[
            {"id":"a","key":"a","value":{"name":"x"}},
            {"id":"b","key":"b","value":null}
        ]}"#;
        let result: ViewQueryResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.total_rows, 3);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].id.as_deref(), Some("a"));
        assert!(result.rows[1].value.is_null());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("scribe", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("scribe"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_view_options() {
        assert_eq!(ViewOptions::all().limit, None);
        assert_eq!(ViewOptions::page(10, 5), ViewOptions { skip: 10, limit: Some(5) });
        assert_eq!(ViewOptions::count_only().limit, Some(0));
    }
}
