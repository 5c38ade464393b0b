//! Document store client
//!
//! REST client for the hosted document store's collection endpoint, behind
//! a trait so the relay operations can be exercised without a network.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::StoreConfig;
use crate::relay::StoredMessage;
use crate::types::{RelayError, Result};

/// Upstream document store operations used by the relay.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create one document in the messages collection.
    async fn create(&self, doc: &StoredMessage) -> Result<()>;

    /// Fetch up to `page_size` documents from the messages collection.
    async fn list(&self, page_size: usize) -> Result<Vec<Value>>;
}

/// reqwest-backed store client. One upstream attempt per call, no retry, no
/// client-side timeout beyond the platform default.
pub struct RestStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn create(&self, doc: &StoredMessage) -> Result<()> {
        let url = self.config.collection_endpoint();
        debug!(url = %url, "store create");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(doc)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStore {
                status: status.as_u16(),
                detail,
            });
        }

        // The store returns a document id; the relay deliberately drops it.
        Ok(())
    }

    async fn list(&self, page_size: usize) -> Result<Vec<Value>> {
        let url = self.config.collection_endpoint();
        debug!(url = %url, page_size, "store list");

        let response = self
            .client
            .get(&url)
            .query(&[("page-size", page_size.to_string())])
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStore {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = response.json().await.map_err(|e| RelayError::UpstreamStore {
            status: status.as_u16(),
            detail: format!("unparseable store response: {e}"),
        })?;

        // Documents arrive wrapped as {"data": {"<id>": {...}, ...}}; a bare
        // array is accepted too.
        let docs = match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Object(data)) => data.into_iter().map(|(_, doc)| doc).collect(),
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        Ok(docs)
    }
}
