use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Album, Collector, Musician, NewAlbum, NewCollector, Prize};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("{resource} was not found")]
    NotFound { resource: String },
    #[error("server error (status {status})")]
    Server { status: u16 },
    #[error("unexpected status {status} from {resource}")]
    Unexpected { status: u16, resource: String },
    #[error("response body did not match the expected shape: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Transport seam for the catalog backend. Repositories talk to this trait
/// so tests can substitute a scripted implementation.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_albums(&self) -> Result<Vec<Album>, ApiError>;
    async fn get_album(&self, id: i64) -> Result<Album, ApiError>;
    async fn create_album(&self, draft: &NewAlbum) -> Result<Album, ApiError>;
    async fn list_musicians(&self) -> Result<Vec<Musician>, ApiError>;
    async fn get_musician(&self, id: i64) -> Result<Musician, ApiError>;
    async fn list_collectors(&self) -> Result<Vec<Collector>, ApiError>;
    async fn get_collector(&self, id: i64) -> Result<Collector, ApiError>;
    async fn create_collector(&self, draft: &NewCollector) -> Result<Collector, ApiError>;
    async fn get_prize(&self, id: i64) -> Result<Prize, ApiError>;
    async fn add_musician_to_album(&self, album_id: i64, musician_id: i64)
        -> Result<(), ApiError>;
}

/// HTTP client for the Vinilos REST backend.
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &crate::config::VinilosConfig) -> Result<Self, ApiError> {
        Self::with_timeout(
            &config.base_url,
            std::time::Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_timeout(base_url: &str, timeout: std::time::Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self::with_client(base_url, http))
    }

    fn with_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await.map_err(ApiError::Transport)?;
        classify(response.status(), path)?;
        response.json().await.map_err(ApiError::Decode)
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        classify(response.status(), path)?;
        response.json().await.map_err(ApiError::Decode)
    }

    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        classify(response.status(), path)?;
        Ok(())
    }
}

/// Map a non-2xx status to the error taxonomy. 2xx passes through.
fn classify(status: StatusCode, resource: &str) -> Result<(), ApiError> {
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound {
            resource: resource.to_string(),
        });
    }
    if status.is_server_error() {
        return Err(ApiError::Server {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Err(ApiError::Unexpected {
            status: status.as_u16(),
            resource: resource.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_albums(&self) -> Result<Vec<Album>, ApiError> {
        self.get_json("/albums").await
    }

    async fn get_album(&self, id: i64) -> Result<Album, ApiError> {
        self.get_json(&format!("/albums/{}", id)).await
    }

    async fn create_album(&self, draft: &NewAlbum) -> Result<Album, ApiError> {
        self.post_json("/albums", draft).await
    }

    async fn list_musicians(&self) -> Result<Vec<Musician>, ApiError> {
        self.get_json("/musicians").await
    }

    async fn get_musician(&self, id: i64) -> Result<Musician, ApiError> {
        self.get_json(&format!("/musicians/{}", id)).await
    }

    async fn list_collectors(&self) -> Result<Vec<Collector>, ApiError> {
        self.get_json("/collectors").await
    }

    async fn get_collector(&self, id: i64) -> Result<Collector, ApiError> {
        self.get_json(&format!("/collectors/{}", id)).await
    }

    async fn create_collector(&self, draft: &NewCollector) -> Result<Collector, ApiError> {
        self.post_json("/collectors", draft).await
    }

    async fn get_prize(&self, id: i64) -> Result<Prize, ApiError> {
        self.get_json(&format!("/prizes/{}", id)).await
    }

    async fn add_musician_to_album(
        &self,
        album_id: i64,
        musician_id: i64,
    ) -> Result<(), ApiError> {
        self.post_empty(&format!("/albums/{}/musicians/{}", album_id, musician_id))
            .await
    }
}
