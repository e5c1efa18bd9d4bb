//! Settings module
//!
//! Loads the target, UAA endpoint and tokens from the CLI settings file and
//! writes refreshed tokens back to it.

mod models;
mod store;

use log::{debug, warn};
use std::sync::Arc;

use crate::ccv3::Client;
use crate::error::{CcError, Result};
use crate::uaa::{TokenStore, UaaClient};

pub use models::Settings;
pub use store::SettingsStore;

/// Build a controller client from settings
///
/// Tokens replaced by a refresh are saved back through `store`, on top of
/// whatever the file holds at that moment.
pub fn connect(store: SettingsStore, settings: &Settings) -> Result<Client> {
    if settings.target.is_empty() {
        return Err(CcError::Config(format!(
            "No API endpoint set in {}",
            store.path().display()
        )));
    }
    if settings.uaa_endpoint.is_empty() {
        return Err(CcError::Config(format!(
            "No UAA endpoint set in {}",
            store.path().display()
        )));
    }

    debug!(
        "Connecting to {} (UAA {})",
        settings.target, settings.uaa_endpoint
    );

    let tokens = TokenStore::new(settings.token_set()).with_update_hook(move |tokens| {
        let mut current = match store.load() {
            Ok(current) => current,
            Err(e) => {
                warn!("Refreshed tokens not saved: {}", e);
                return;
            }
        };
        current.apply_tokens(tokens);
        if let Err(e) = store.save(&current) {
            warn!("Refreshed tokens not saved: {}", e);
        }
    });

    let uaa = Arc::new(UaaClient::new(&settings.uaa_endpoint, Arc::new(tokens)));
    Ok(Client::new(&settings.target, uaa))
}
