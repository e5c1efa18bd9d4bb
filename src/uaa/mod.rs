//! UAA token service module
//!
//! Holds the shared token store and the client that refreshes access tokens.

mod client;
mod models;
mod store;

pub use client::UaaClient;
pub use models::{TokenResponse, UaaErrorResponse};
pub use store::{TokenSet, TokenStore};
