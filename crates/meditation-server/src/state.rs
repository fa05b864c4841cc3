//! Shared application state.
//!
//! Holds the document store and the resolved runtime settings handlers need.

use crate::store::Store;

/// Shared application state for Actix handlers.
pub struct AppState {
    /// Catalog, accounts, sessions, and preferences.
    pub store: Store,
    /// Lifetime of newly issued bearer tokens.
    pub token_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(store: Store, token_ttl: chrono::Duration) -> Self {
        Self { store, token_ttl }
    }
}
