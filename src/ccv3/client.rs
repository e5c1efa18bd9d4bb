//! Cloud Controller V3 client and request executor

use log::{debug, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use crate::ccv3::connection::{Connection, HttpRequest, HttpResponse};
use crate::ccv3::job::JobUrl;
use crate::ccv3::query::{encode_queries, Query};
use crate::ccv3::request::RequestParams;
use crate::ccv3::routes::{Params, Router};
use crate::config::api;
use crate::error::{ApiErrorDetail, ApiResult, CcError, Result, WarnedError, Warnings};
use crate::uaa::{TokenStore, UaaClient};
use crate::version;

/// Structured error body returned by the controller
#[derive(Deserialize, Debug)]
struct ErrorsBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

/// Cloud Controller V3 client
///
/// Safe to share across concurrent operations; the token store and the
/// refresh guard are shared with the UAA client.
pub struct Client {
    target: String,
    router: Router,
    connection: Connection,
    uaa: Arc<UaaClient>,
    user_agent: String,
}

impl Client {
    /// Create a client for the controller at `target`
    ///
    /// `uaa` supplies the token store and refreshes expired tokens.
    pub fn new(target: &str, uaa: Arc<UaaClient>) -> Self {
        let connection = Connection::new(uaa.store().skip_ssl_validation());
        Self {
            target: target.trim_end_matches('/').to_string(),
            router: Router::default(),
            connection,
            uaa,
            user_agent: format!("cfapi/{}", version::version_string()),
        }
    }

    /// Replace the route table
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        self.uaa.store()
    }

    /// Resolve a request descriptor into a method and absolute URL
    pub(crate) fn resolve_url(&self, params: &RequestParams) -> Result<(Method, String)> {
        let route = self
            .router
            .resolve(&params.request_name, &params.uri_params)?;
        Ok((route.method, self.url_for(&route.path, &params.query)))
    }

    fn url_for(&self, path: &str, query: &[Query]) -> String {
        if query.is_empty() {
            format!("{}{}", self.target, path)
        } else {
            format!("{}{}?{}", self.target, path, encode_queries(query))
        }
    }

    /// Issue a logical request and return the successful response
    ///
    /// A 401 triggers exactly one token refresh and one retry. Any other
    /// error status is decoded into [`CcError::Api`] or
    /// [`CcError::UnexpectedResponse`]. Warnings from every attempt are kept.
    pub async fn execute(
        &self,
        params: &RequestParams,
        accept: &str,
    ) -> std::result::Result<(HttpResponse, Warnings), WarnedError> {
        let (method, url) = self.resolve_url(params)?;
        self.execute_url(method, &url, params.body.as_deref(), accept)
            .await
    }

    /// Like [`Client::execute`] but against an already absolute URL
    pub(crate) async fn execute_url(
        &self,
        method: Method,
        url: &str,
        body: Option<&[u8]>,
        accept: &str,
    ) -> std::result::Result<(HttpResponse, Warnings), WarnedError> {
        let mut warnings = Warnings::new();

        let token = self.uaa.access_token();
        let first = match self.send(method.clone(), url, body, accept, &token).await {
            Ok(response) => response,
            Err(e) => return Err(WarnedError::new(e, warnings)),
        };

        let response = if first.status == 401 {
            warnings.extend(first.warnings());
            info!("Access token rejected for {} {}, refreshing", method, url);

            let refreshed = match self.uaa.refresh_access_token(&token).await {
                Ok(tokens) => tokens,
                Err(e) => return Err(WarnedError::new(e, warnings)),
            };

            let retry = match self
                .send(method, url, body, accept, &refreshed.access_token)
                .await
            {
                Ok(response) => response,
                Err(e) => return Err(WarnedError::new(e, warnings)),
            };

            if retry.status == 401 {
                warnings.extend(retry.warnings());
                return Err(WarnedError::new(
                    CcError::InvalidAuthToken(error_detail(&retry)),
                    warnings,
                ));
            }
            retry
        } else {
            first
        };

        warnings.extend(response.warnings());

        if !response.is_success() {
            debug!("Request failed with status {}", response.status);
            return Err(WarnedError::new(decode_error(&response), warnings));
        }

        Ok((response, warnings))
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&[u8]>,
        accept: &str,
        token: &str,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, &self.user_agent);
        if !token.is_empty() {
            request = request.header(AUTHORIZATION, &format!("bearer {}", token));
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, api::JSON_CONTENT_TYPE)
                .body(body.to_vec());
        }
        self.connection.send(request).await
    }

    /// Issue a request and decode the JSON body into `T`
    ///
    /// An empty body decodes as JSON `null`, so `T = ()` accepts `204`s.
    pub async fn make_request<T>(&self, params: &RequestParams) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let (response, warnings) = self.execute(params, api::JSON_CONTENT_TYPE).await?;

        let body: &[u8] = if response.body.is_empty() {
            &b"null"[..]
        } else {
            &response.body
        };

        match serde_json::from_slice(body) {
            Ok(value) => Ok((value, warnings)),
            Err(e) => Err(WarnedError::new(
                CcError::MalformedResponse(format!(
                    "{} response: {}",
                    params.request_name, e
                )),
                warnings,
            )),
        }
    }

    /// Issue a request whose only result is an optional job `Location`
    pub async fn make_request_job(&self, params: &RequestParams) -> ApiResult<JobUrl> {
        let (response, warnings) = self.execute(params, api::JSON_CONTENT_TYPE).await?;
        Ok((JobUrl(response.location()), warnings))
    }

    /// Issue a request and return the body bytes undecoded
    pub async fn make_request_receive_raw(
        &self,
        request_name: &str,
        uri_params: &Params,
        accept: &str,
    ) -> ApiResult<Vec<u8>> {
        let params = RequestParams {
            request_name: request_name.to_string(),
            uri_params: uri_params.clone(),
            ..RequestParams::default()
        };
        let (response, warnings) = self.execute(&params, accept).await?;
        Ok((response.body, warnings))
    }
}

/// Map an error response to the structured or fallback error
fn decode_error(response: &HttpResponse) -> CcError {
    match serde_json::from_slice::<ErrorsBody>(&response.body) {
        Ok(body) if !body.errors.is_empty() => CcError::Api {
            status: response.status,
            errors: body.errors,
        },
        _ => CcError::UnexpectedResponse {
            status: response.status,
            body: response.body_text(),
        },
    }
}

/// Human-readable detail of an error response
fn error_detail(response: &HttpResponse) -> String {
    match serde_json::from_slice::<ErrorsBody>(&response.body) {
        Ok(body) if !body.errors.is_empty() => body.errors[0].detail.clone(),
        _ => response.body_text(),
    }
}

#[cfg(test)]
impl Client {
    /// Create a test client against mock controller and UAA servers
    pub fn test_client(cc_url: &str, uaa_url: &str) -> Self {
        use crate::uaa::TokenSet;

        let store = Arc::new(TokenStore::new(TokenSet {
            access_token: "old-token".to_string(),
            refresh_token: "refresh-token".to_string(),
            ..TokenSet::default()
        }));
        Self::new(cc_url, Arc::new(UaaClient::new(uaa_url, store)))
    }
}
