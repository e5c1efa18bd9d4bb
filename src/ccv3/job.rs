//! Asynchronous job references

use std::fmt;

/// URL of a background job started by a write operation
///
/// Empty when the controller completed the operation synchronously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobUrl(pub String);

impl JobUrl {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
