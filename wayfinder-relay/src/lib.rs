//! Wayfinder Relay - message relay for the city exploration experience
//!
//! Accepts short text messages from visitors, stamps them server-side, and
//! forwards them to a hosted document store; separately serves the most
//! recent entries. No state is held between requests; eventual consistency
//! between a submit and a later read is the store's business, not ours.
//!
//! ## Surfaces
//!
//! - **Server**: standalone hyper service (`server::run`)
//! - **Function**: serverless-style entry point (`function::handle`)
//!   exposing the identical contract

pub mod config;
pub mod function;
pub mod relay;
pub mod server;
pub mod store;
pub mod types;

pub use config::{Args, StoreConfig};
pub use server::{run, AppState};
pub use types::{RelayError, Result};
