//! Client core for the meditation hub.
//!
//! Controllers here are presentation independent: they talk to the API
//! through [`server_api::MeditationApi`] and draw through the binding traits
//! in [`view`], so the same logic drives the terminal UI and the tests.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod player;
pub mod preferences;
pub mod server_api;
pub mod session;
pub mod token_store;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ClientError;
pub use session::SessionContext;
