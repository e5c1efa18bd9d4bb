//! Application manifests, fetched as raw YAML

use serde::de::DeserializeOwned;

use crate::ccv3::routes::{names, params};
use crate::ccv3::Client;
use crate::config::api;
use crate::error::{ApiResult, CcError, Result};

impl Client {
    /// YAML manifest describing an application and its processes
    pub async fn get_application_manifest(&self, app_guid: &str) -> ApiResult<Vec<u8>> {
        self.make_request_receive_raw(
            names::GET_APPLICATION_MANIFEST,
            &params([("app_guid", app_guid)]),
            api::YAML_CONTENT_TYPE,
        )
        .await
    }
}

/// Decode manifest bytes into any YAML-compatible shape
pub fn parse_manifest<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| CcError::MalformedResponse(format!("manifest is not UTF-8: {}", e)))?;
    serde_yml::from_str(text).map_err(|e| CcError::MalformedResponse(format!("manifest: {}", e)))
}
