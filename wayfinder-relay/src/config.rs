//! Configuration for the relay
//!
//! CLI arguments and environment variable handling using clap. Parsed once
//! at process start and immutable for the process lifetime.

use clap::Parser;
use std::net::SocketAddr;

use crate::types::{RelayError, Result};

/// Wayfinder Relay - message relay for the city experience
#[derive(Parser, Debug, Clone)]
#[command(name = "wayfinder-relay")]
#[command(about = "Forwards visitor messages to the hosted document store")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Base URL of the hosted document store's REST API
    #[arg(long, env = "STORE_URL")]
    pub store_url: Option<String>,

    /// Keyspace/namespace within the store
    #[arg(long, env = "STORE_NAMESPACE")]
    pub store_namespace: Option<String>,

    /// Collection holding visitor messages
    #[arg(long, env = "STORE_COLLECTION", default_value = "messages")]
    pub store_collection: String,

    /// Bearer token for the store API
    #[arg(long, env = "STORE_TOKEN")]
    pub store_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Resolved upstream store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub namespace: String,
    pub collection: String,
    pub token: String,
}

impl StoreConfig {
    /// Collection endpoint: `{url}/v2/namespaces/{ns}/collections/{name}`
    pub fn collection_endpoint(&self) -> String {
        format!(
            "{}/v2/namespaces/{}/collections/{}",
            self.url.trim_end_matches('/'),
            self.namespace,
            self.collection
        )
    }
}

impl Args {
    /// Resolve the upstream store settings.
    ///
    /// Any missing required variable fails here, before an upstream call is
    /// ever attempted, so every request reports the same configuration
    /// error until the deployment is corrected.
    pub fn store_config(&self) -> Result<StoreConfig> {
        let url = self
            .store_url
            .clone()
            .ok_or_else(|| RelayError::Config("STORE_URL is not set".to_string()))?;
        let namespace = self
            .store_namespace
            .clone()
            .ok_or_else(|| RelayError::Config("STORE_NAMESPACE is not set".to_string()))?;
        let token = self
            .store_token
            .clone()
            .ok_or_else(|| RelayError::Config("STORE_TOKEN is not set".to_string()))?;

        Ok(StoreConfig {
            url,
            namespace,
            collection: self.store_collection.clone(),
            token,
        })
    }
}
