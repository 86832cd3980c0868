//! Data connection abstraction.
//!
//! A [`Connection`] resolves "give me the features in this extent" against
//! some data source, typically over the network. It is the only capability
//! the tile tree consumes, and the only suspension point in a load: the
//! tree itself never performs I/O.
//!
//! [`HttpConnection`] is the production implementation; tests script the
//! trait directly.

mod feature;
mod http;

pub use feature::{Feature, FeatureBatch};
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpConnection};

use std::future::Future;

use thiserror::Error;

use crate::extent::Extent;

/// Errors surfaced by a connection fetch.
///
/// Opaque to the tile tree beyond being a failure; retry and backoff policy
/// belong to the connection, not its callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),
    /// Response body could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Requested resolution not served by this connection
    #[error("zoom level {0} not supported by this connection")]
    UnsupportedZoom(u8),
}

/// Capability to fetch the features contained in an extent.
pub trait Connection: Send + Sync {
    /// Fetches the batch of features inside `extent`.
    ///
    /// Completion is exactly-once: the returned future resolves to either
    /// a batch or an error, never both.
    fn fetch_extent(
        &self,
        extent: &Extent,
    ) -> impl Future<Output = Result<FeatureBatch, FetchError>> + Send;
}
