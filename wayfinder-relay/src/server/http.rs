//! HTTP server implementation
//!
//! hyper http1 with TokioIo and match-based routing. Every response carries
//! permissive cross-origin headers; the browser client is served from a
//! different origin than the relay.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::relay;
use crate::store::RestStore;
use crate::types::{RelayError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
}

impl AppState {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Build a store client for this request, failing fast with a
    /// configuration error when required settings are absent.
    fn store(&self) -> Result<RestStore> {
        Ok(RestStore::new(self.args.store_config()?))
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| RelayError::Config(format!("cannot bind {}: {e}", state.args.listen)))?;

    info!("Relay listening on {}", state.args.listen);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe - returns 200 if the relay is running
        (Method::GET, "/health") | (Method::GET, "/healthz") => health_response(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        (Method::POST, "/send") => {
            let body = match req.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!("send request body error: {}", e);
                    return Ok(error_response(RelayError::InvalidInput(
                        "failed to read request body".to_string(),
                    )));
                }
            };
            handle_send(&state, &body).await
        }

        (Method::GET, "/latest") => handle_latest(&state).await,

        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Handle POST /send
async fn handle_send(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return error_response(RelayError::InvalidInput(format!("invalid JSON: {e}")));
        }
    };

    let result = match state.store() {
        Ok(store) => relay::submit(&store, &payload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => json_response(StatusCode::OK, r#"{"status":"ok"}"#.to_string()),
        Err(e) => error_response(e),
    }
}

/// Handle GET /latest
async fn handle_latest(state: &AppState) -> Response<Full<Bytes>> {
    let result = match state.store() {
        Ok(store) => relay::latest(&store).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(messages) => match serde_json::to_string(&messages) {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(e) => {
                error!("Failed to serialize latest response: {}", e);
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"error":"internal serialization error"}"#.to_string(),
                )
            }
        },
        Err(e) => error_response(e),
    }
}

/// JSON response with permissive CORS
fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn error_response(err: RelayError) -> Response<Full<Bytes>> {
    let (status, body) = err.into_status_code_and_body();
    json_response(status, body)
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Liveness response
fn health_response() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    json_response(StatusCode::OK, body.to_string())
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });
    json_response(StatusCode::NOT_FOUND, body.to_string())
}
