//! Settings file data model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::config::uaa;
use crate::uaa::TokenSet;

const BEARER_PREFIX: &str = "bearer ";

/// The subset of the CLI settings file this crate reads and writes
///
/// Keys it does not know about are kept in `extra` and written back unchanged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Target", default)]
    pub target: String,
    #[serde(rename = "UaaEndpoint", default)]
    pub uaa_endpoint: String,
    /// Stored with its `bearer ` prefix
    #[serde(rename = "AccessToken", default)]
    pub access_token: String,
    #[serde(rename = "RefreshToken", default)]
    pub refresh_token: String,
    #[serde(rename = "UAAOAuthClient", default)]
    pub client_id: String,
    #[serde(rename = "UAAOAuthClientSecret", default)]
    pub client_secret: String,
    #[serde(rename = "SSLDisabled", default)]
    pub ssl_disabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("target", &self.target)
            .field("uaa_endpoint", &self.uaa_endpoint)
            .field("has_access_token", &!self.access_token.is_empty())
            .field("has_refresh_token", &!self.refresh_token.is_empty())
            .field("client_id", &self.client_id)
            .field("ssl_disabled", &self.ssl_disabled)
            .field("extra_keys", &self.extra.len())
            .finish()
    }
}

impl Settings {
    /// Tokens and client credentials for a token store
    pub fn token_set(&self) -> TokenSet {
        let access_token = match self.access_token.get(..BEARER_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => {
                self.access_token[BEARER_PREFIX.len()..].to_string()
            }
            _ => self.access_token.clone(),
        };
        let client_id = if self.client_id.is_empty() {
            uaa::DEFAULT_CLIENT_ID.to_string()
        } else {
            self.client_id.clone()
        };

        TokenSet {
            access_token,
            refresh_token: self.refresh_token.clone(),
            client_id,
            client_secret: self.client_secret.clone(),
            skip_ssl_validation: self.ssl_disabled,
        }
    }

    /// Store refreshed tokens
    pub fn apply_tokens(&mut self, tokens: &TokenSet) {
        self.access_token = if tokens.access_token.is_empty() {
            String::new()
        } else {
            format!("{}{}", BEARER_PREFIX, tokens.access_token)
        };
        self.refresh_token = tokens.refresh_token.clone();
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(crate::config::settings::SKIP_SSL_ENV_VAR) {
            self.ssl_disabled = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
    }
}
