//! In-memory backend for unit tests.

use crate::client::http::favorites_from_response;
use crate::client::{FavoriteSet, ListingsApi, SavedSearch, SearchHistoryEntry};
use crate::error::{ClientError, Result};
use crate::filters::api::ApiParams;
use crate::models::Property;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    properties: Vec<Property>,
    queued: VecDeque<(Duration, Vec<Property>)>,
    last_params: Option<ApiParams>,
    fail_fetches: bool,
    favorites: BTreeSet<String>,
    unauthorized: bool,
    fail_mutations: bool,
    mutation_delay: Duration,
    mutations: usize,
    history: Vec<SearchHistoryEntry>,
    saved: Vec<SavedSearch>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_properties(&self, properties: Vec<Property>) {
        self.state().properties = properties;
    }

    /// Next fetch answers with `properties` after `delay`
    pub fn queue_response(&self, delay: Duration, properties: Vec<Property>) {
        self.state().queued.push_back((delay, properties));
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.state().fail_fetches = fail;
    }

    pub fn last_params(&self) -> Option<ApiParams> {
        self.state().last_params.clone()
    }

    pub fn set_favorites<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        self.state().favorites = ids.into_iter().map(str::to_string).collect();
    }

    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.state().unauthorized = unauthorized;
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.state().fail_mutations = fail;
    }

    pub fn set_mutation_delay(&self, delay: Duration) {
        self.state().mutation_delay = delay;
    }

    pub fn mutation_count(&self) -> usize {
        self.state().mutations
    }

    pub fn history(&self) -> Vec<SearchHistoryEntry> {
        self.state().history.clone()
    }

    pub fn saved(&self) -> Vec<SavedSearch> {
        self.state().saved.clone()
    }

    fn mutate(&self, endpoint: &str, apply: impl FnOnce(&mut State)) -> Result<()> {
        let mut state = self.state();
        state.mutations += 1;
        if state.fail_mutations {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        apply(&mut state);
        Ok(())
    }
}

#[async_trait]
impl ListingsApi for FakeApi {
    async fn fetch_properties(&self, params: &ApiParams) -> Result<Vec<Property>> {
        let (delay, properties, fail) = {
            let mut state = self.state();
            state.last_params = Some(params.clone());
            let (delay, properties) = state
                .queued
                .pop_front()
                .unwrap_or_else(|| (Duration::ZERO, state.properties.clone()));
            (delay, properties, state.fail_fetches)
        };

        tokio::time::sleep(delay).await;
        if fail {
            return Err(ClientError::Status {
                endpoint: "/api/properties".into(),
                status: StatusCode::BAD_GATEWAY,
            });
        }
        Ok(properties)
    }

    async fn fetch_favorites(&self) -> Result<FavoriteSet> {
        let (status, body) = {
            let state = self.state();
            if state.unauthorized {
                (StatusCode::UNAUTHORIZED, String::new())
            } else {
                let ids: Vec<_> = state.favorites.iter().collect();
                (StatusCode::OK, serde_json::to_string(&ids).unwrap())
            }
        };
        favorites_from_response(status, &body)
    }

    async fn add_favorite(&self, property_id: &str) -> Result<()> {
        let delay = self.state().mutation_delay;
        tokio::time::sleep(delay).await;
        self.mutate("/api/me/favorites", |state| {
            state.favorites.insert(property_id.to_string());
        })
    }

    async fn remove_favorite(&self, property_id: &str) -> Result<()> {
        let delay = self.state().mutation_delay;
        tokio::time::sleep(delay).await;
        self.mutate("/api/me/favorites", |state| {
            state.favorites.remove(property_id);
        })
    }

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()> {
        self.state().history.push(entry.clone());
        Ok(())
    }

    async fn save_search(&self, search: &SavedSearch) -> Result<()> {
        self.state().saved.push(search.clone());
        Ok(())
    }
}
