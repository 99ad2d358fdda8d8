//! Property compliance tracking service.
//!
//! Tracks properties, their environmental sensors and paperwork, and derives
//! per-property alert histograms and portfolio risk statistics on every
//! read. Module boundaries:
//! - `ident` normalises property identifiers;
//! - `classify` maps sensor readings to severities;
//! - `aggregate` builds alert histograms and portfolio stats;
//! - `views` assembles the list, detail and dashboard view models;
//! - `store` is the persistence capability (in-memory or PostgreSQL);
//! - `routes` is the HTTP gateway, `main.rs` the process entry point.

use axum::Router;

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod ident;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use store::{MemoryStore, PgStore, SharedStore, Store};

// ---

/// Build the full HTTP application over a store.
pub fn app(store: SharedStore) -> Router {
    routes::router(store)
}
