//! Favorites with invalidate-and-refetch reconciliation.

use crate::client::{FavoriteSet, ListingsApi};
use crate::error::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// What a toggle request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// A toggle for the same property was still in flight
    Skipped,
}

/// Cached favorites of the current user
pub struct Favorites<A> {
    api: Arc<A>,
    ids: RwLock<FavoriteSet>,
    pending: Mutex<HashSet<String>>,
}

impl<A: ListingsApi> Favorites<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            ids: RwLock::new(FavoriteSet::default()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Reload the favorites list from the backend
    pub async fn refresh(&self) -> Result<()> {
        let fresh = self.api.fetch_favorites().await?;
        debug!("Loaded {} favorites", fresh.len());
        *self.ids.write().await = fresh;
        Ok(())
    }

    pub async fn is_favorite(&self, property_id: &str) -> bool {
        self.ids.read().await.contains(property_id)
    }

    pub async fn snapshot(&self) -> FavoriteSet {
        self.ids.read().await.clone()
    }

    /// Whether the toggle control for this property should be disabled
    pub fn is_pending(&self, property_id: &str) -> bool {
        self.pending_ids().contains(property_id)
    }

    /// Add or remove a favorite, then refetch the list.
    ///
    /// The refetch runs even when the mutation fails, so the cache always
    /// ends up matching the backend. A mutation error is still returned to
    /// the caller for display.
    pub async fn toggle(&self, property_id: &str) -> Result<ToggleOutcome> {
        let Some(_pending) = PendingGuard::claim(&self.pending, property_id) else {
            debug!("Toggle for {} already pending, skipping", property_id);
            return Ok(ToggleOutcome::Skipped);
        };

        let was_favorite = self.is_favorite(property_id).await;
        let mutation = if was_favorite {
            self.api.remove_favorite(property_id).await
        } else {
            self.api.add_favorite(property_id).await
        };

        if let Err(e) = self.refresh().await {
            warn!("Failed to refetch favorites: {}", e);
        }

        match mutation {
            Ok(()) if was_favorite => {
                info!("Removed {} from favorites", property_id);
                Ok(ToggleOutcome::Removed)
            }
            Ok(()) => {
                info!("Added {} to favorites", property_id);
                Ok(ToggleOutcome::Added)
            }
            Err(e) => {
                warn!("Favorite toggle for {} failed: {}", property_id, e);
                Err(e)
            }
        }
    }

    fn pending_ids(&self) -> MutexGuard<'_, HashSet<String>> {
        lock_pending(&self.pending)
    }
}

fn lock_pending(pending: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a property as pending until dropped, including when the toggle
/// future is cancelled mid-request.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<String>>,
    property_id: String,
}

impl<'a> PendingGuard<'a> {
    fn claim(pending: &'a Mutex<HashSet<String>>, property_id: &str) -> Option<Self> {
        if !lock_pending(pending).insert(property_id.to_string()) {
            return None;
        }
        Some(Self {
            pending,
            property_id: property_id.to_string(),
        })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock_pending(self.pending).remove(&self.property_id);
    }
}
