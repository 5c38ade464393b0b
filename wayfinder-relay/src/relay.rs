//! Relay operations: submit and latest
//!
//! Stateless; each call maps to exactly one upstream attempt. The store is
//! abstracted behind `DocumentStore` so the operations can be tested with
//! an in-memory double.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::store::DocumentStore;
use crate::types::{RelayError, Result};

/// Documents requested from the store per Latest call.
pub const PAGE_SIZE: usize = 20;
/// Most-recent entries returned to the caller.
pub const RETURN_COUNT: usize = 5;

/// The unit exchanged with the remote store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub message: String,
    /// ISO-8601, assigned by the relay at receipt time, never client time
    pub timestamp: String,
}

/// Accept a visitor payload, stamp it, and forward it to the store.
///
/// The payload must carry a string `message` field; an empty string is
/// accepted. Validation failures never reach the store, and the caller
/// gets a generic acknowledgement with no document id on success.
pub async fn submit<S: DocumentStore>(store: &S, payload: &Value) -> Result<()> {
    let message = match payload.get("message") {
        Some(Value::String(text)) => text.clone(),
        _ => {
            return Err(RelayError::InvalidInput(
                "body must contain a string \"message\" field".to_string(),
            ))
        }
    };

    let doc = StoredMessage {
        message,
        timestamp: Utc::now().to_rfc3339(),
    };
    debug!(timestamp = %doc.timestamp, "forwarding message to store");
    store.create(&doc).await
}

/// Fetch the most recent messages: up to [`RETURN_COUNT`], oldest first.
///
/// Documents without a parseable `timestamp` are dropped entirely. Equal
/// timestamps keep store order (the sort is stable), though the store
/// itself guarantees nothing about that order.
pub async fn latest<S: DocumentStore>(store: &S) -> Result<Vec<StoredMessage>> {
    let docs = store.list(PAGE_SIZE).await?;

    let mut dated: Vec<(DateTime<FixedOffset>, StoredMessage)> = docs
        .into_iter()
        .filter_map(|doc| {
            let raw = doc.get("timestamp")?.as_str()?;
            let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
            let message = doc
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some((
                parsed,
                StoredMessage {
                    message,
                    timestamp: raw.to_string(),
                },
            ))
        })
        .collect();

    dated.sort_by_key(|(parsed, _)| *parsed);
    let skip = dated.len().saturating_sub(RETURN_COUNT);
    Ok(dated.into_iter().skip(skip).map(|(_, doc)| doc).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory store double that records creates and serves a canned page.
    #[derive(Default)]
    struct FakeStore {
        created: Mutex<Vec<StoredMessage>>,
        page: Vec<Value>,
        fail_with: Option<u16>,
    }

    impl FakeStore {
        fn with_page(page: Vec<Value>) -> Self {
            Self {
                page,
                ..Default::default()
            }
        }

        fn created(&self) -> Vec<StoredMessage> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentStore for FakeStore {
        async fn create(&self, doc: &StoredMessage) -> Result<()> {
            if let Some(status) = self.fail_with {
                return Err(RelayError::UpstreamStore {
                    status,
                    detail: "canned failure".to_string(),
                });
            }
            self.created.lock().unwrap().push(doc.clone());
            Ok(())
        }

        async fn list(&self, _page_size: usize) -> Result<Vec<Value>> {
            if let Some(status) = self.fail_with {
                return Err(RelayError::UpstreamStore {
                    status,
                    detail: "canned failure".to_string(),
                });
            }
            Ok(self.page.clone())
        }
    }

    fn dated(message: &str, timestamp: &str) -> Value {
        json!({ "message": message, "timestamp": timestamp })
    }

    #[tokio::test]
    async fn test_submit_makes_one_create_with_fresh_timestamp() {
        let store = FakeStore::default();
        let before = Utc::now();

        submit(&store, &json!({ "message": "hello" })).await.unwrap();

        let after = Utc::now();
        let created = store.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].message, "hello");

        let stamped = DateTime::parse_from_rfc3339(&created[0].timestamp)
            .expect("ISO-8601 timestamp")
            .with_timezone(&Utc);
        assert!(stamped >= before && stamped <= after);
    }

    #[tokio::test]
    async fn test_submit_accepts_empty_string() {
        let store = FakeStore::default();
        submit(&store, &json!({ "message": "" })).await.unwrap();
        assert_eq!(store.created().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_non_string_message_before_any_upstream_call() {
        let store = FakeStore::default();

        let err = submit(&store, &json!({ "message": 123 })).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(_)));
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_message_field() {
        let store = FakeStore::default();

        let err = submit(&store, &json!({ "text": "hello" })).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(_)));
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn test_latest_returns_five_most_recent_oldest_first() {
        let page = (1..=8)
            .map(|day| dated(&format!("m{day}"), &format!("2024-03-0{day}T12:00:00+00:00")))
            .rev() // store order is not chronological
            .collect();
        let store = FakeStore::with_page(page);

        let result = latest(&store).await.unwrap();

        let messages: Vec<&str> = result.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(messages, vec!["m4", "m5", "m6", "m7", "m8"]);
    }

    #[tokio::test]
    async fn test_latest_excludes_documents_without_timestamps() {
        let store = FakeStore::with_page(vec![
            dated("kept", "2024-03-01T12:00:00+00:00"),
            json!({ "message": "no timestamp at all" }),
            json!({ "message": "junk timestamp", "timestamp": "yesterday-ish" }),
        ]);

        let result = latest(&store).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].message, "kept");
    }

    #[tokio::test]
    async fn test_latest_keeps_store_order_for_equal_timestamps() {
        let ts = "2024-03-01T12:00:00+00:00";
        let store = FakeStore::with_page(vec![dated("first", ts), dated("second", ts)]);

        let result = latest(&store).await.unwrap();
        let messages: Vec<&str> = result.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_latest_surfaces_upstream_failure_without_partial_result() {
        let store = FakeStore {
            fail_with: Some(503),
            ..Default::default()
        };

        let err = latest(&store).await.unwrap_err();
        assert!(matches!(err, RelayError::UpstreamStore { status: 503, .. }));
    }
}
