//! Standalone HTTP server surface

mod http;

pub use http::{run, AppState};
