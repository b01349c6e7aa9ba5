use crate::filters::FilterState;
use crate::models::Property;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

pub const PROPERTIES_PATH: &str = "/api/properties";
pub const FAVORITES_PATH: &str = "/api/me/favorites";
pub const SEARCH_HISTORY_PATH: &str = "/api/me/search-history";
pub const SAVED_SEARCHES_PATH: &str = "/api/saved-searches";

/// Body of `GET /api/properties`; older deployments return a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertiesResponse {
    List(Vec<Value>),
    Envelope {
        #[serde(alias = "data")]
        properties: Vec<Value>,
    },
}

impl PropertiesResponse {
    /// Rows that cannot be read as a property are skipped, not fatal
    pub fn into_properties(self) -> Vec<Property> {
        let rows = match self {
            Self::List(rows) | Self::Envelope { properties: rows } => rows,
        };

        rows.into_iter()
            .filter_map(|row| {
                let id = row.get("id").cloned();
                serde_json::from_value(row)
                    .map_err(|e| warn!("Skipping unreadable listing {:?}: {}", id, e))
                    .ok()
            })
            .collect()
    }
}

/// Ids of the properties the signed-in user has favorited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet(HashSet<String>);

impl FavoriteSet {
    pub fn contains(&self, property_id: &str) -> bool {
        self.0.contains(property_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Read the favorites payload.
    ///
    /// Accepts a list (or a `favorites`/`data` envelope) whose entries are
    /// property ids, property objects, or `{ "propertyId": .. }` records.
    pub fn from_json(value: &Value) -> Self {
        let entries: &[Value] = match value {
            Value::Array(entries) => entries.as_slice(),
            Value::Object(object) => object
                .get("favorites")
                .or_else(|| object.get("data"))
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        };

        entries.iter().filter_map(favorite_id).collect()
    }
}

impl FromIterator<String> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn favorite_id(entry: &Value) -> Option<String> {
    match entry {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        Value::Object(object) => object
            .get("propertyId")
            .or_else(|| object.get("property").and_then(|p| p.get("id")))
            .or_else(|| object.get("id"))
            .and_then(favorite_id),
        _ => None,
    }
}

/// Body of the favorites mutations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest<'a> {
    pub property_id: &'a str,
}

/// A search the user ran, for the "recent searches" list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub path: String,
    /// Canonical query string
    pub query: String,
    pub filters: FilterState,
    pub searched_at: DateTime<Utc>,
}

/// A named search the user asked to keep
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub name: String,
    pub path: String,
    pub query: String,
    pub filters: FilterState,
}
