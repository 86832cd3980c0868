//! HTTP-backed connection.
//!
//! Fetches features from a bbox-query endpoint, e.g.
//! `https://host/features?bbox=minLon,minLat,maxLon,maxLat`, returning a
//! JSON body of the shape `{"features": [{"id", "lon", "lat"}, ...]}`.
//!
//! The HTTP transport is abstracted behind [`AsyncHttpClient`] so tests can
//! inject canned responses without a network.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::feature::FeatureBatch;
use super::{Connection, FetchError};
use crate::coord::MAX_ZOOM;
use crate::extent::Extent;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent with every request; some tile servers reject requests
/// without one.
const USER_AGENT: &str = concat!("vectile/", env!("CARGO_PKG_VERSION"));

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request, returning the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new client with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http(format!("failed to read response: {}", e)))
    }
}

/// Connection fetching features from a bbox-query HTTP endpoint.
///
/// # Example
///
/// ```ignore
/// use vectile::connection::{AsyncReqwestClient, HttpConnection};
///
/// let client = AsyncReqwestClient::new()?;
/// let connection = HttpConnection::new(client, "https://example.com/features");
/// // Use connection with Quadtree...
/// ```
pub struct HttpConnection<H: AsyncHttpClient> {
    http_client: H,
    base_url: String,
    max_zoom: u8,
}

impl<H: AsyncHttpClient> HttpConnection<H> {
    /// Creates a connection against the given endpoint.
    pub fn new(http_client: H, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            max_zoom: MAX_ZOOM,
        }
    }

    /// Caps the tile zoom this endpoint serves.
    ///
    /// Fetches for tile extents deeper than `max_zoom` are rejected with
    /// [`FetchError::UnsupportedZoom`] without issuing a request.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Builds the bbox query URL for an extent.
    fn build_url(&self, extent: &Extent) -> String {
        format!(
            "{}?bbox={},{},{},{}",
            self.base_url,
            extent.min_lon(),
            extent.min_lat(),
            extent.max_lon(),
            extent.max_lat()
        )
    }
}

impl<H: AsyncHttpClient> Connection for HttpConnection<H> {
    async fn fetch_extent(&self, extent: &Extent) -> Result<FeatureBatch, FetchError> {
        if let Some(origin) = extent.origin() {
            if origin.zoom() > self.max_zoom {
                return Err(FetchError::UnsupportedZoom(origin.zoom()));
            }
        }

        let url = self.build_url(extent);
        let body = self.http_client.get(&url).await?;
        let batch: FeatureBatch = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidResponse(format!("malformed feature payload: {}", e)))?;

        debug!(extent = %extent, count = batch.count(), "fetched extent");
        Ok(batch)
    }
}
