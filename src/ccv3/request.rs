//! Logical request descriptors

use serde::Serialize;

use crate::ccv3::query::Query;
use crate::ccv3::routes::Params;
use crate::error::{CcError, Result};

/// Everything needed to issue one logical controller operation
///
/// Built fresh for every call; the executor never mutates it.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub request_name: String,
    pub uri_params: Params,
    pub query: Vec<Query>,
    /// Pre-encoded JSON body
    pub body: Option<Vec<u8>>,
}

impl RequestParams {
    pub fn new(request_name: &str) -> Self {
        Self {
            request_name: request_name.to_string(),
            ..Self::default()
        }
    }

    pub fn uri_param(mut self, name: &str, value: &str) -> Self {
        self.uri_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn query(mut self, query: &[Query]) -> Self {
        self.query.extend_from_slice(query);
        self
    }

    /// Attach a JSON body
    pub fn body<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let encoded = serde_json::to_vec(body).map_err(|e| CcError::Encode(e.to_string()))?;
        self.body = Some(encoded);
        Ok(self)
    }
}
