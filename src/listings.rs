//! Listings fetch for one page location, with stale responses discarded.

use crate::client::{ListingsApi, SavedSearch, SearchHistoryEntry};
use crate::error::Result;
use crate::filters::{
    paginate, refine, route_transaction_type, ApiQueryBuilder, ListingQuery, Paginated,
};
use crate::models::Property;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Refined listings for one location
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedListings {
    pub path: String,
    pub query: ListingQuery,
    pub properties: Vec<Property>,
}

impl LoadedListings {
    /// The page named in the query
    pub fn page(&self) -> Paginated<'_, Property> {
        paginate(&self.properties, self.query.page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Arc<LoadedListings>),
    /// A newer load started before this one finished; its result was dropped
    Superseded,
}

/// Split `/buy?bhk=2%20BHK` into path and query
pub fn split_location(location: &str) -> (&str, &str) {
    let location = location.split('#').next().unwrap_or_default();
    match location.split_once('?') {
        Some((path, query)) => (path, query),
        None => (location, ""),
    }
}

/// Loads listings and keeps the result of the newest request only
pub struct ListingsLoader<A> {
    api: Arc<A>,
    fetch_limit: usize,
    generation: AtomicU64,
    current: RwLock<Option<Arc<LoadedListings>>>,
}

impl<A: ListingsApi> ListingsLoader<A> {
    pub fn new(api: Arc<A>, fetch_limit: usize) -> Self {
        Self {
            api,
            fetch_limit,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Most recent successful load
    pub async fn current(&self) -> Option<Arc<LoadedListings>> {
        self.current.read().await.clone()
    }

    /// Fetch, refine and store the listings for `location`.
    ///
    /// Earlier loads still in flight are not cancelled; when they complete
    /// their results (or errors) are ignored.
    pub async fn load(&self, location: &str) -> Result<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (path, query) = split_location(location);
        let query = ListingQuery::decode(query);
        let route = route_transaction_type(path);

        let params = ApiQueryBuilder::new(&query.filters)
            .route_transaction(route)
            .sort(query.sort)
            .limit(self.fetch_limit)
            .offset(0)
            .build();
        debug!(generation, ?params, "fetching listings");

        let fetched = self.api.fetch_properties(&params).await;

        let mut current = self.current.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded listings response");
            return Ok(LoadOutcome::Superseded);
        }

        let properties = refine(fetched?, &query.filters, route, query.sort);
        info!(
            "Loaded {} listings for {}{}",
            properties.len(),
            path,
            if query.filters.is_empty() { "" } else { " (filtered)" }
        );

        let loaded = Arc::new(LoadedListings {
            path: path.to_string(),
            query,
            properties,
        });
        *current = Some(loaded.clone());
        Ok(LoadOutcome::Loaded(loaded))
    }

    /// Add the search to the user's history.
    ///
    /// History is best effort: failures are logged and otherwise ignored.
    /// Unfiltered searches are not recorded.
    pub async fn record_search(&self, listings: &LoadedListings) {
        if listings.query.filters.is_empty() {
            return;
        }

        let entry = SearchHistoryEntry {
            path: listings.path.clone(),
            query: listings.query.encode(),
            filters: listings.query.filters.clone(),
            searched_at: Utc::now(),
        };
        if let Err(e) = self.api.record_search(&entry).await {
            warn!("Failed to record search history: {}", e);
        }
    }

    /// Save the loaded search under `name`
    pub async fn save_search(&self, name: &str, listings: &LoadedListings) -> Result<SavedSearch> {
        // saved searches always restart at the first page
        let query = listings.query.update(|query| query.page = 1);
        let search = SavedSearch {
            name: name.trim().to_string(),
            path: listings.path.clone(),
            query: query.encode(),
            filters: query.filters,
        };

        self.api.save_search(&search).await?;
        info!("Saved search '{}'", search.name);
        Ok(search)
    }
}
