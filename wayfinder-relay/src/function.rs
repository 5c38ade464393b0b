//! Serverless-style function handler
//!
//! The same contract as the standalone server, packaged as a single
//! event -> response function for function-hosting platforms: identical
//! routes, status codes, bodies, and CORS headers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Args;
use crate::relay;
use crate::store::RestStore;
use crate::types::{RelayError, Result};

/// Incoming function invocation
#[derive(Clone, Debug, Deserialize)]
pub struct FunctionEvent {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Function invocation result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn json(status: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        Self {
            status,
            headers,
            body,
        }
    }

    fn from_error(err: RelayError) -> Self {
        let (status, body) = err.into_status_code_and_body();
        Self::json(status.as_u16(), body)
    }

    fn preflight() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Access-Control-Allow-Headers".to_string(), "*".to_string());
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            "GET, POST, OPTIONS".to_string(),
        );
        Self {
            status: 200,
            headers,
            body: String::new(),
        }
    }
}

/// Handle one function invocation.
pub async fn handle(args: &Args, event: FunctionEvent) -> FunctionResponse {
    match (event.method.to_ascii_uppercase().as_str(), event.path.as_str()) {
        ("OPTIONS", _) => FunctionResponse::preflight(),
        ("POST", "/send") => send(args, event.body.as_deref().unwrap_or_default()).await,
        ("GET", "/latest") => latest(args).await,
        _ => FunctionResponse::json(
            404,
            serde_json::json!({ "error": "Not Found", "path": event.path }).to_string(),
        ),
    }
}

async fn send(args: &Args, body: &str) -> FunctionResponse {
    let payload: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            return FunctionResponse::from_error(RelayError::InvalidInput(format!(
                "invalid JSON: {e}"
            )));
        }
    };

    let result = match store_for(args) {
        Ok(store) => relay::submit(&store, &payload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => FunctionResponse::json(200, r#"{"status":"ok"}"#.to_string()),
        Err(e) => FunctionResponse::from_error(e),
    }
}

async fn latest(args: &Args) -> FunctionResponse {
    let result = match store_for(args) {
        Ok(store) => relay::latest(&store).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(messages) => match serde_json::to_string(&messages) {
            Ok(body) => FunctionResponse::json(200, body),
            Err(_) => FunctionResponse::json(
                500,
                r#"{"error":"internal serialization error"}"#.to_string(),
            ),
        },
        Err(e) => FunctionResponse::from_error(e),
    }
}

fn store_for(args: &Args) -> Result<RestStore> {
    Ok(RestStore::new(args.store_config()?))
}
