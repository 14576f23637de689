//! Request and response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Token pair returned by login, signup and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GithubToken<'a> {
    pub gh_access_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkGithubRequest<'a> {
    pub gh_access_token: &'a str,
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest {
    pub session_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub password: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub token: &'a str,
}

/// Plain `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Search parameters, e.g. `state`, `county`, `locality`, `record_categories`.
///
/// Keys are kept sorted, so two parameter sets with the same entries are
/// equal and produce the same cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(BTreeMap<String, Value>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop parameters whose value is falsy: `null`, `false`, `0` or `""`.
    pub fn strip_falsy(mut self) -> Self {
        self.0.retain(|_, v| is_truthy(v));
        self
    }

    /// Flatten into query pairs. Arrays repeat the key, nulls are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    pairs.extend(items.iter().map(|v| (key.clone(), scalar_to_string(v))));
                }
                other => pairs.push((key.clone(), scalar_to_string(other))),
            }
        }
        pairs
    }

    /// Stable cache key for this parameter set.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Result of looking up a followed search.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowedSearchLookup {
    /// The user follows a search with exactly these parameters.
    Found(SearchParams),
    /// The user follows no such search.
    NotFound,
    /// No user is signed in.
    Unauthenticated,
}

/// Body of `GET /search/follow`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FollowedSearchesResponse {
    pub data: Vec<SearchParams>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Data sources
// ─────────────────────────────────────────────────────────────────────────────

/// Previous and next ids around a data source in the last search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub previous: Option<String>,
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_falsy() {
        let params: SearchParams = serde_json::from_value(json!({
            "state": "Pennsylvania",
            "county": "",
            "locality": null,
            "id": 0,
            "archived": false,
            "record_categories": ["Police & Public Interactions"],
        }))
        .unwrap();

        let stripped = params.strip_falsy();
        assert_eq!(stripped.len(), 2);
        assert_eq!(stripped.get("state"), Some(&json!("Pennsylvania")));
        assert!(stripped.get("record_categories").is_some());
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = SearchParams::new().with("state", "PA").with("county", "Allegheny");
        let b = SearchParams::new().with("county", "Allegheny").with("state", "PA");
        assert_eq!(a, b);
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a, b.clone().with("locality", "Pittsburgh"));
    }

    #[test]
    fn test_query_pairs() {
        let params = SearchParams::new()
            .with("state", "PA")
            .with("record_categories", json!(["Agency-Published Resources", "Jails & Courts"]))
            .with("page", 2)
            .with("locality", Value::Null);

        assert_eq!(
            params.query_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                (
                    "record_categories".to_string(),
                    "Agency-Published Resources".to_string()
                ),
                ("record_categories".to_string(), "Jails & Courts".to_string()),
                ("state".to_string(), "PA".to_string()),
            ]
        );
    }

    #[test]
    fn test_followed_searches_response() {
        let body: FollowedSearchesResponse = serde_json::from_value(json!({
            "data": [{"state": "PA", "county": null}],
            "metadata": {"count": 1}
        }))
        .unwrap();
        assert_eq!(body.data.len(), 1);
    }
}
