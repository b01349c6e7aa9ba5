use crate::client::types::{FavoriteSet, SavedSearch, SearchHistoryEntry};
use crate::error::Result;
use crate::filters::api::ApiParams;
use crate::models::Property;
use async_trait::async_trait;

/// Backend endpoints used by the listings page.
///
/// Kept behind a trait so the loader and favorites store can run against an
/// in-memory backend in tests.
#[async_trait]
pub trait ListingsApi: Send + Sync {
    /// `GET /api/properties`
    async fn fetch_properties(&self, params: &ApiParams) -> Result<Vec<Property>>;

    /// `GET /api/me/favorites`; an unauthorized caller has no favorites
    async fn fetch_favorites(&self) -> Result<FavoriteSet>;

    async fn add_favorite(&self, property_id: &str) -> Result<()>;

    async fn remove_favorite(&self, property_id: &str) -> Result<()>;

    /// `POST /api/me/search-history`
    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()>;

    /// `POST /api/saved-searches`
    async fn save_search(&self, search: &SavedSearch) -> Result<()>;
}
