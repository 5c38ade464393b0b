//! Error types for the engine
//!
//! The evaluation path itself never fails: it is a pure computation over
//! in-memory data, and malformed catalog entries are skipped rather than
//! rejected. The only failure the engine can report is a collaborator that
//! never became ready.

use std::time::Duration;

/// Main error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("collaborator not ready after {0:?}")]
    CollaboratorNotReady(Duration),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
