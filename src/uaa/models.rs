//! UAA token endpoint payloads

use serde::Deserialize;

/// Successful token grant
#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    /// Absent for client-credentials grants and when rotation is off
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OAuth error body
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UaaErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

impl UaaErrorResponse {
    /// Errors that mean the refresh token or client credentials are dead
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.error.as_str(),
            "invalid_token" | "invalid_grant" | "unauthorized" | "invalid_client"
        )
    }

    pub fn message(&self) -> String {
        if self.error_description.is_empty() {
            self.error.clone()
        } else {
            format!("{}: {}", self.error, self.error_description)
        }
    }
}
