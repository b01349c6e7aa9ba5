use crate::client::traits::ListingsApi;
use crate::client::types::{
    FavoriteRequest, FavoriteSet, PropertiesResponse, SavedSearch, SearchHistoryEntry,
    FAVORITES_PATH, PROPERTIES_PATH, SAVED_SEARCHES_PATH, SEARCH_HISTORY_PATH,
};
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::filters::api::ApiParams;
use crate::models::Property;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

/// reqwest-backed client for the marketplace backend
pub struct HttpListingsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpListingsClient {
    /// Create a client against the default local backend
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("listing-scout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let response = self.request(method, path).json(body).send().await?;
        check_status(path, response).await.map(|_| ())
    }
}

async fn check_status(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        warn!("{} returned status: {}", endpoint, status);
        return Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }
    Ok(response)
}

/// Interpret a favorites response; 401 means a signed-out user with no favorites
pub fn favorites_from_response(status: StatusCode, body: &str) -> Result<FavoriteSet> {
    if status == StatusCode::UNAUTHORIZED {
        debug!("favorites request unauthorized, treating as no favorites");
        return Ok(FavoriteSet::default());
    }
    if !status.is_success() {
        return Err(ClientError::Status {
            endpoint: FAVORITES_PATH.to_string(),
            status,
        });
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|source| ClientError::Decode {
            endpoint: FAVORITES_PATH.to_string(),
            source,
        })?;
    Ok(FavoriteSet::from_json(&value))
}

#[async_trait]
impl ListingsApi for HttpListingsClient {
    async fn fetch_properties(&self, params: &ApiParams) -> Result<Vec<Property>> {
        let response = self
            .request(Method::GET, PROPERTIES_PATH)
            .query(params)
            .send()
            .await?;
        let body = check_status(PROPERTIES_PATH, response).await?.text().await?;

        debug!("Downloaded {} bytes of listings", body.len());

        let parsed: PropertiesResponse =
            serde_json::from_str(&body).map_err(|source| ClientError::Decode {
                endpoint: PROPERTIES_PATH.to_string(),
                source,
            })?;
        let properties = parsed.into_properties();

        info!("Fetched {} properties", properties.len());
        Ok(properties)
    }

    async fn fetch_favorites(&self) -> Result<FavoriteSet> {
        let response = self.request(Method::GET, FAVORITES_PATH).send().await?;
        let status = response.status();
        let body = response.text().await?;
        favorites_from_response(status, &body)
    }

    async fn add_favorite(&self, property_id: &str) -> Result<()> {
        self.send_json(Method::POST, FAVORITES_PATH, &FavoriteRequest { property_id })
            .await
    }

    async fn remove_favorite(&self, property_id: &str) -> Result<()> {
        self.send_json(Method::DELETE, FAVORITES_PATH, &FavoriteRequest { property_id })
            .await
    }

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()> {
        self.send_json(Method::POST, SEARCH_HISTORY_PATH, entry).await
    }

    async fn save_search(&self, search: &SavedSearch) -> Result<()> {
        self.send_json(Method::POST, SAVED_SEARCHES_PATH, search).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_favorites_are_empty() {
        let favorites = favorites_from_response(StatusCode::UNAUTHORIZED, "").unwrap();
        assert!(favorites.is_empty());
        assert!(!favorites.contains("p1"));
    }

    #[test]
    fn favorites_parse_on_success() {
        let favorites = favorites_from_response(StatusCode::OK, r#"["p1","p2"]"#).unwrap();
        assert!(favorites.contains("p2"));
    }

    #[test]
    fn favorites_surface_other_failures() {
        let err = favorites_from_response(StatusCode::INTERNAL_SERVER_ERROR, "").unwrap_err();
        assert!(err.is_retryable());

        let err = favorites_from_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn builds_from_config() {
        let config = Config {
            api_url: "https://api.example.com".into(),
            api_token: Some("token".into()),
            ..Config::default()
        };
        let client = HttpListingsClient::with_config(&config).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
        assert_eq!(client.token.as_deref(), Some("token"));
    }
}
