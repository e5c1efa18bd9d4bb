//! Shared token storage for controller and UAA clients

use log::debug;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::config::uaa;

/// Access/refresh tokens and the OAuth client they were issued to
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub skip_ssl_validation: bool,
}

impl Default for TokenSet {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            refresh_token: String::new(),
            client_id: uaa::DEFAULT_CLIENT_ID.to_string(),
            client_secret: uaa::DEFAULT_CLIENT_SECRET.to_string(),
            skip_ssl_validation: false,
        }
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

type UpdateHook = Box<dyn Fn(&TokenSet) + Send + Sync>;

/// Concurrency-safe token cell: reads return a snapshot, writes swap atomically
pub struct TokenStore {
    tokens: RwLock<TokenSet>,
    on_update: Option<UpdateHook>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("tokens", &self.snapshot())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

impl TokenStore {
    pub fn new(tokens: TokenSet) -> Self {
        Self {
            tokens: RwLock::new(tokens),
            on_update: None,
        }
    }

    /// Call `hook` with the new tokens after every replacement
    ///
    /// The settings layer uses this to persist refreshed tokens.
    pub fn with_update_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TokenSet) + Send + Sync + 'static,
    {
        self.on_update = Some(Box::new(hook));
        self
    }

    pub fn snapshot(&self) -> TokenSet {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> String {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .clone()
    }

    pub fn refresh_token(&self) -> String {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh_token
            .clone()
    }

    pub fn skip_ssl_validation(&self) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .skip_ssl_validation
    }

    /// Replace the access and refresh tokens in one step
    pub fn replace_tokens(&self, access_token: &str, refresh_token: &str) {
        let updated = {
            let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
            tokens.access_token = access_token.to_string();
            tokens.refresh_token = refresh_token.to_string();
            tokens.clone()
        };
        debug!("Token store updated");

        if let Some(hook) = &self.on_update {
            hook(&updated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn tokens(access: &str, refresh: &str) -> TokenSet {
        TokenSet {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            ..TokenSet::default()
        }
    }

    #[test]
    fn test_default_client() {
        let set = TokenSet::default();
        assert_eq!(set.client_id, "cf");
        assert!(set.client_secret.is_empty());
        assert!(!set.skip_ssl_validation);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let set = tokens("secret-access", "secret-refresh");
        let out = format!("{:?}", set);
        assert!(!out.contains("secret-access"));
        assert!(!out.contains("secret-refresh"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn test_replace_tokens() {
        let store = TokenStore::new(tokens("old", "old-refresh"));
        store.replace_tokens("new", "new-refresh");
        assert_eq!(store.access_token(), "new");
        assert_eq!(store.refresh_token(), "new-refresh");
        assert_eq!(store.snapshot().client_id, "cf");
    }

    #[test]
    fn test_update_hook_sees_new_tokens() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let store = TokenStore::new(tokens("old", "r"))
            .with_update_hook(move |t| sink.lock().unwrap().push(t.access_token.clone()));

        store.replace_tokens("first", "r1");
        store.replace_tokens("second", "r2");

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let store = Arc::new(TokenStore::new(tokens("t0", "r0")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.replace_tokens(&format!("t{}", i), &format!("r{}", i));
                    let snap = store.snapshot();
                    // access and refresh are always swapped together
                    assert_eq!(snap.access_token[1..], snap.refresh_token[1..]);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
