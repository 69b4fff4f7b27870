//! Types for the list-item REST API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ListStoreConfig {
    /// Absolute URL of the site hosting the lists (e.g. "https://tenant.example.com/sites/pmo")
    pub site_url: String,
    /// Optional bearer token for authentication
    pub access_token: Option<String>,
    /// Request timeout in milliseconds (default: none, requests may hang)
    pub timeout_ms: Option<u64>,
}

impl Default for ListStoreConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:8080".to_string(),
            access_token: None,
            timeout_ms: None,
        }
    }
}

/// OData query options for collection reads
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    /// `$filter` expression evaluated by the store
    pub filter: Option<String>,
    /// `$select` field names
    pub select: Vec<String>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_select(mut self, fields: &[&str]) -> Self {
        self.select = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref filter) = self.filter {
            params.push(("$filter", filter.clone()));
        }
        if !self.select.is_empty() {
            params.push(("$select", self.select.join(",")));
        }
        params
    }
}

/// Entity-type marker required on every write body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(rename = "type")]
    pub entity_type: String,
}

impl ItemMetadata {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
        }
    }
}

/// Multi-valued field.
///
/// Always written as `{"results": [...]}`. Read from either that shape or a
/// bare array, since the store answers in both depending on the metadata level
/// requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiValue<T> {
    pub results: Vec<T>,
}

impl<T> MultiValue<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self { results }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.results
    }
}

impl<T> Default for MultiValue<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<T> FromIterator<T> for MultiValue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for MultiValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape<T> {
            Bare(Vec<T>),
            Wrapped { results: Vec<T> },
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Bare(results) | Shape::Wrapped { results } => Self { results },
        })
    }
}

/// A principal from the site user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteUser {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// 1 = user, 2 = distribution list, 4 = security group, 8 = site group
    pub principal_type: u32,
}

/// Collection response in either light (`{"value": [...]}`) or verbose
/// (`{"d": {"results": [...]}}`) form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Collection<T> {
    Light { value: Vec<T> },
    Verbose { d: VerboseResults<T> },
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerboseResults<T> {
    results: Vec<T>,
}

impl<T> Collection<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Collection::Light { value } => value,
            Collection::Verbose { d } => d.results,
        }
    }
}

/// Decode a single entity, unwrapping the verbose `{"d": {...}}` envelope.
pub(crate) fn decode_entity<T: DeserializeOwned>(mut value: serde_json::Value) -> serde_json::Result<T> {
    if let Some(inner) = value.get_mut("d") {
        if inner.is_object() {
            let inner = inner.take();
            return serde_json::from_value(inner);
        }
    }
    serde_json::from_value(value)
}

/// Pull the human-readable message out of a store error body.
///
/// Recognizes `{"error": {"message": {"value": ...}}}` and the light
/// `odata.error` variant. Anything else comes back as the raw body.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    for pointer in [
        "/error/message/value",
        "/odata.error/message/value",
        "/error/message",
    ] {
        if let Some(message) = value.pointer(pointer).and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multi_value_reads_both_shapes() {
        let bare: MultiValue<String> = serde_json::from_value(json!(["Frontend", "Backend"])).unwrap();
        let wrapped: MultiValue<String> =
            serde_json::from_value(json!({"results": ["Frontend", "Backend"]})).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.into_vec(), vec!["Frontend", "Backend"]);
    }

    #[test]
    fn test_multi_value_writes_wrapped() {
        let value = serde_json::to_value(MultiValue::new(vec![10u64, 11])).unwrap();
        assert_eq!(value, json!({"results": [10, 11]}));
    }

    #[test]
    fn test_collection_shapes() {
        let light: Collection<SiteUser> = serde_json::from_value(json!({
            "value": [{"Id": 1, "Title": "Ada", "PrincipalType": 1}]
        }))
        .unwrap();
        let verbose: Collection<SiteUser> = serde_json::from_value(json!({
            "d": {"results": [{"Id": 1, "Title": "Ada", "PrincipalType": 1}]}
        }))
        .unwrap();
        assert_eq!(light.into_vec(), verbose.into_vec());
    }

    #[test]
    fn test_decode_entity_unwraps_verbose() {
        let user: SiteUser = decode_entity(json!({
            "d": {"Id": 3, "Title": "Grace", "PrincipalType": 1}
        }))
        .unwrap();
        assert_eq!(user.id, 3);
    }

    #[test]
    fn test_error_message_structured() {
        let body = r#"{"error":{"code":"-1","message":{"lang":"en-US","value":"Column 'Foo' does not exist."}}}"#;
        assert_eq!(error_message(body), "Column 'Foo' does not exist.");

        let light = r#"{"odata.error":{"message":{"value":"Access denied."}}}"#;
        assert_eq!(error_message(light), "Access denied.");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(r#"{"status":"oops"}"#), r#"{"status":"oops"}"#);
    }

    #[test]
    fn test_item_query_params() {
        let query = ItemQuery::new()
            .with_filter("DocTypeId eq 1")
            .with_select(&["Id", "Title"]);
        assert_eq!(
            query.to_params(),
            vec![
                ("$filter", "DocTypeId eq 1".to_string()),
                ("$select", "Id,Title".to_string())
            ]
        );
    }
}
