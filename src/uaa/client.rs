//! UAA client: exchanges refresh tokens for new access tokens
//!
//! Refreshes are single-flight. The first caller that sees a rejected token
//! starts the exchange in a background task; callers arriving while it runs
//! attach to the same shared future. The task outlives any one caller, so a
//! cancelled caller never strands the others.

use base64::prelude::*;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ccv3::connection::{Connection, HttpRequest};
use crate::config::{api, uaa};
use crate::error::{CcError, Result};

use super::models::{TokenResponse, UaaErrorResponse};
use super::store::{TokenSet, TokenStore};

type RefreshFlight = Shared<BoxFuture<'static, Result<TokenSet>>>;

/// Client for the UAA token service
pub struct UaaClient {
    url: String,
    store: Arc<TokenStore>,
    connection: Connection,
    in_flight: Arc<Mutex<Option<RefreshFlight>>>,
}

impl UaaClient {
    /// Create a client for the UAA at `url`, sharing `store` with the controller client
    pub fn new(url: &str, store: Arc<TokenStore>) -> Self {
        let connection = Connection::new(store.skip_ssl_validation());
        Self {
            url: url.trim_end_matches('/').to_string(),
            store,
            connection,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Current access token
    pub fn access_token(&self) -> String {
        self.store.access_token()
    }

    /// Obtain a new access token after `rejected_token` was refused
    ///
    /// If the store already holds a different token, another request
    /// refreshed it in the meantime and that token is returned without an
    /// exchange. Otherwise the caller joins (or starts) the in-flight refresh.
    pub async fn refresh_access_token(&self, rejected_token: &str) -> Result<TokenSet> {
        let flight = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

            let current = self.store.snapshot();
            if !current.access_token.is_empty() && current.access_token != rejected_token {
                debug!("Access token was already refreshed by a concurrent request");
                return Ok(current);
            }

            match slot.as_ref() {
                Some(flight) => {
                    debug!("Joining in-flight token refresh");
                    flight.clone()
                }
                None => {
                    let flight = self.start_refresh();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Spawn the exchange; must be called with the in-flight slot locked
    fn start_refresh(&self) -> RefreshFlight {
        info!("Refreshing access token");

        let connection = self.connection.clone();
        let token_url = format!("{}{}", self.url, uaa::TOKEN_PATH);
        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);

        let task = tokio::spawn(async move {
            let current = store.snapshot();
            let result = match request_token(&connection, &token_url, &current).await {
                Ok(grant) => {
                    // Keep the old refresh token unless the service rotated it
                    let refresh_token = grant
                        .refresh_token
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| current.refresh_token.clone());
                    let tokens = TokenSet {
                        access_token: grant.access_token,
                        refresh_token,
                        ..current
                    };
                    store_tokens(Arc::clone(&store), tokens.clone()).await;
                    Ok(tokens)
                }
                Err(e) => Err(e),
            };

            match &result {
                Ok(_) => debug!("Token refresh succeeded"),
                Err(e) => warn!("Token refresh failed: {}", e),
            }

            *in_flight.lock().unwrap_or_else(PoisonError::into_inner) = None;
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(CcError::Network(format!("token refresh task failed: {}", e)))
            })
        }
        .boxed()
        .shared()
    }
}

/// POST to the token endpoint with a refresh-token or client-credentials grant
async fn request_token(
    connection: &Connection,
    token_url: &str,
    tokens: &TokenSet,
) -> Result<TokenResponse> {
    let form = if tokens.refresh_token.is_empty() {
        debug!("No refresh token held, using client credentials grant");
        "grant_type=client_credentials".to_string()
    } else {
        format!(
            "grant_type=refresh_token&refresh_token={}",
            urlencoding::encode(&tokens.refresh_token)
        )
    };

    let credentials =
        BASE64_STANDARD.encode(format!("{}:{}", tokens.client_id, tokens.client_secret));

    let request = HttpRequest::new(Method::POST, token_url)
        .header(AUTHORIZATION, &format!("Basic {}", credentials))
        .header(CONTENT_TYPE, uaa::FORM_CONTENT_TYPE)
        .header(ACCEPT, api::JSON_CONTENT_TYPE)
        .body(form.into_bytes());

    let response = connection.send(request).await?;

    match response.status {
        200 => serde_json::from_slice(&response.body)
            .map_err(|e| CcError::MalformedResponse(format!("token response: {}", e))),
        400 | 401 => {
            let error: UaaErrorResponse =
                serde_json::from_slice(&response.body).unwrap_or_default();
            if response.status == 401 || error.is_rejection() {
                Err(CcError::InvalidRefreshToken(error.message()))
            } else {
                Err(CcError::UnexpectedResponse {
                    status: response.status,
                    body: response.body_text(),
                })
            }
        }
        status => Err(CcError::UnexpectedResponse {
            status,
            body: response.body_text(),
        }),
    }
}

/// Replace the stored tokens on the blocking pool; the update hook may write files
async fn store_tokens(store: Arc<TokenStore>, tokens: TokenSet) {
    let stored = tokio::task::spawn_blocking(move || {
        store.replace_tokens(&tokens.access_token, &tokens.refresh_token)
    })
    .await;
    if let Err(e) = stored {
        warn!("Storing refreshed tokens failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::time::Duration;
    use wiremock::matchers::{body_string, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(access: &str, refresh: &str) -> Arc<TokenStore> {
        Arc::new(TokenStore::new(TokenSet {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            ..TokenSet::default()
        }))
    }

    fn grant(access: &str, refresh: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
            "expires_in": 599
        }))
    }

    #[tokio::test]
    async fn test_refresh_replaces_both_tokens() {
        let mock_server = MockServer::start().await;

        // "cf:" in base64
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("Authorization", "Basic Y2Y6"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string(
                "grant_type=refresh_token&refresh_token=old-refresh",
            ))
            .respond_with(grant("new-access", "new-refresh"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store("old-access", "old-refresh");
        let client = UaaClient::new(&mock_server.uri(), Arc::clone(&store));

        let tokens = client.refresh_access_token("old-access").await.unwrap();

        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(tokens.refresh_token, "new-refresh");
        assert_eq!(store.access_token(), "new-access");
        assert_eq!(store.refresh_token(), "new-refresh");
        assert_eq!(client.access_token(), "new-access");
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_when_not_rotated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "new-access"})),
            )
            .mount(&mock_server)
            .await;

        let store = store("old-access", "keep-me");
        let client = UaaClient::new(&mock_server.uri(), Arc::clone(&store));

        client.refresh_access_token("old-access").await.unwrap();
        assert_eq!(store.refresh_token(), "keep-me");
    }

    #[tokio::test]
    async fn test_client_credentials_grant_without_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "cc-access"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store("", "");
        let client = UaaClient::new(&mock_server.uri(), Arc::clone(&store));

        let tokens = client.refresh_access_token("").await.unwrap();
        assert_eq!(tokens.access_token, "cc-access");
        assert_eq!(store.refresh_token(), "");
    }

    #[tokio::test]
    async fn test_rejected_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_token",
                "error_description": "Invalid refresh token (expired)"
            })))
            .mount(&mock_server)
            .await;

        let store = store("old-access", "old-refresh");
        let client = UaaClient::new(&mock_server.uri(), Arc::clone(&store));

        let err = client.refresh_access_token("old-access").await.unwrap_err();
        match err {
            CcError::InvalidRefreshToken(msg) => assert!(msg.contains("expired")),
            other => panic!("Expected InvalidRefreshToken, got {:?}", other),
        }
        assert_eq!(store.access_token(), "old-access");
    }

    #[tokio::test]
    async fn test_invalid_grant_on_bad_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })))
            .mount(&mock_server)
            .await;

        let client = UaaClient::new(&mock_server.uri(), store("a", "r"));
        let err = client.refresh_access_token("a").await.unwrap_err();
        assert!(matches!(err, CcError::InvalidRefreshToken(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_unexpected_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let client = UaaClient::new(&mock_server.uri(), store("a", "r"));
        let err = client.refresh_access_token("a").await.unwrap_err();
        assert_eq!(
            err,
            CcError::UnexpectedResponse {
                status: 503,
                body: "down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let client = UaaClient::new("http://127.0.0.1:9", store("a", "r"));
        let err = client.refresh_access_token("a").await.unwrap_err();
        assert!(matches!(err, CcError::Network(_)));
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_exchange() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(grant("new-access", "new-refresh").set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = UaaClient::new(&mock_server.uri(), store("old-access", "old-refresh"));

        let results = join_all((0..5).map(|_| client.refresh_access_token("old-access"))).await;

        for result in results {
            assert_eq!(result.unwrap().access_token, "new-access");
        }
    }

    #[tokio::test]
    async fn test_late_caller_reuses_completed_refresh() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(grant("new-access", "new-refresh"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = UaaClient::new(&mock_server.uri(), store("old-access", "old-refresh"));

        client.refresh_access_token("old-access").await.unwrap();
        // A request that was sent with the old token gets its 401 only now
        let tokens = client.refresh_access_token("old-access").await.unwrap();
        assert_eq!(tokens.access_token, "new-access");
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_abort_refresh() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(grant("new-access", "new-refresh").set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store("old-access", "old-refresh");
        let client = UaaClient::new(&mock_server.uri(), Arc::clone(&store));

        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            client.refresh_access_token("old-access"),
        )
        .await;
        assert!(cancelled.is_err());

        let tokens = client.refresh_access_token("old-access").await.unwrap();
        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(store.access_token(), "new-access");
    }

    #[tokio::test]
    async fn test_update_hook_runs_off_the_runtime_thread() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(grant("new-access", "new-refresh"))
            .mount(&mock_server)
            .await;

        let hook_thread = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&hook_thread);
        let store = Arc::new(
            TokenStore::new(TokenSet {
                access_token: "old-access".to_string(),
                refresh_token: "old-refresh".to_string(),
                ..TokenSet::default()
            })
            .with_update_hook(move |tokens| {
                assert_eq!(tokens.access_token, "new-access");
                *seen.lock().unwrap() = Some(std::thread::current().id());
            }),
        );
        let client = UaaClient::new(&mock_server.uri(), Arc::clone(&store));

        client.refresh_access_token("old-access").await.unwrap();

        let hook_thread = hook_thread.lock().unwrap().expect("hook was not called");
        assert_ne!(hook_thread, std::thread::current().id());
        assert_eq!(store.access_token(), "new-access");
    }

    #[test]
    fn test_url_trailing_slash_trimmed() {
        let client = UaaClient::new("https://uaa.example.com/", store("a", "r"));
        assert_eq!(client.url(), "https://uaa.example.com");
    }
}
