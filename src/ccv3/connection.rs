//! Single HTTP exchanges against the controller or UAA

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::time::Duration;

use crate::config::{api, http};
use crate::error::{CcError, Result, Warnings};

/// An outgoing request, already fully resolved
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set a header; invalid header values are dropped with a warning
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(e) => warn!("Dropping invalid value for header {}: {}", name, e),
        }
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response with its body fully read
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the `Location` header, empty when absent
    pub fn location(&self) -> String {
        self.headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    /// Warnings from every `X-Cf-Warnings` header value, in order
    pub fn warnings(&self) -> Warnings {
        self.headers
            .get_all(api::WARNINGS_HEADER)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|raw| raw.split(','))
            .filter_map(|w| {
                // Values are form-encoded, so '+' stands for a space
                let plain = w.trim().replace('+', " ");
                let decoded = urlencoding::decode(&plain)
                    .map(|d| d.into_owned())
                    .unwrap_or(plain);
                if decoded.is_empty() {
                    None
                } else {
                    Some(decoded)
                }
            })
            .collect()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Stateless HTTP connection; clones share the underlying pool
#[derive(Debug, Clone)]
pub struct Connection {
    client: Client,
}

impl Connection {
    /// Create a connection with pooled, timed-out transport settings
    pub fn new(skip_ssl_validation: bool) -> Self {
        if skip_ssl_validation {
            debug!("TLS certificate validation disabled");
        }

        let client = Client::builder()
            .pool_max_idle_per_host(http::POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(http::POOL_IDLE_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(http::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(http::REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(skip_ssl_validation)
            // Redirects would drop the Authorization header on a host change
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Perform one exchange; any status code is a successful exchange
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(CcError::from)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(CcError::from)?.to_vec();

        debug!("{} ({} bytes)", status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response_with_warnings(values: &[&str]) -> HttpResponse {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append("x-cf-warnings", HeaderValue::from_str(v).unwrap());
        }
        HttpResponse {
            status: 200,
            headers,
            body: Vec::new(),
        }
    }

    #[test]
    fn test_warnings_are_decoded_and_split() {
        let response = response_with_warnings(&["first%20warning,second%2C%20with%20comma"]);
        assert_eq!(
            response.warnings(),
            vec!["first warning", "second, with comma"]
        );
    }

    #[test]
    fn test_form_encoded_warnings_turn_plus_into_space() {
        let response = response_with_warnings(&["Space+quota+exceeded,ok%21,1%2B1"]);
        assert_eq!(
            response.warnings(),
            vec!["Space quota exceeded", "ok!", "1+1"]
        );
    }

    #[test]
    fn test_warnings_from_repeated_headers_keep_order() {
        let response = response_with_warnings(&["w1", "w2,w3"]);
        assert_eq!(response.warnings(), vec!["w1", "w2", "w3"]);
    }

    #[test]
    fn test_no_warning_header() {
        let response = response_with_warnings(&[]);
        assert!(response.warnings().is_empty());
    }

    #[test]
    fn test_location_missing_is_empty() {
        let response = response_with_warnings(&[]);
        assert_eq!(response.location(), "");
    }

    #[test]
    fn test_is_success() {
        let mut response = response_with_warnings(&[]);
        assert!(response.is_success());
        response.status = 202;
        assert!(response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_send_passes_headers_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/things"))
            .and(header("Authorization", "bearer abc"))
            .and(body_string("{\"a\":1}"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", "https://api.example.com/v3/jobs/1")
                    .set_body_string("created"),
            )
            .mount(&mock_server)
            .await;

        let connection = Connection::new(false);
        let request = HttpRequest::new(Method::POST, format!("{}/v3/things", mock_server.uri()))
            .header(reqwest::header::AUTHORIZATION, "bearer abc")
            .body(b"{\"a\":1}".to_vec());

        let response = connection.send(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body_text(), "created");
        assert_eq!(response.location(), "https://api.example.com/v3/jobs/1");
    }

    #[tokio::test]
    async fn test_send_reports_error_statuses_as_responses() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let connection = Connection::new(false);
        let response = connection
            .send(HttpRequest::new(Method::GET, mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body_text(), "boom");
    }

    #[tokio::test]
    async fn test_send_transport_failure_is_network_error() {
        // Port 9 (discard) on localhost is not listening in test environments
        let connection = Connection::new(false);
        let err = connection
            .send(HttpRequest::new(Method::GET, "http://127.0.0.1:9/v3"))
            .await
            .unwrap_err();
        assert!(matches!(err, CcError::Network(_)));
    }
}
