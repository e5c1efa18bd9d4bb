//! Query parameters for controller list requests

use std::fmt;

/// Filter and modifier keys understood by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKey {
    Names,
    Guids,
    OrganizationGuids,
    SpaceGuids,
    UserGuids,
    Types,
    Include,
    PerPage,
    OrderBy,
    LabelSelector,
    /// Any key not listed above, sent verbatim
    Other(String),
}

impl QueryKey {
    pub fn as_str(&self) -> &str {
        match self {
            QueryKey::Names => "names",
            QueryKey::Guids => "guids",
            QueryKey::OrganizationGuids => "organization_guids",
            QueryKey::SpaceGuids => "space_guids",
            QueryKey::UserGuids => "user_guids",
            QueryKey::Types => "types",
            QueryKey::Include => "include",
            QueryKey::PerPage => "per_page",
            QueryKey::OrderBy => "order_by",
            QueryKey::LabelSelector => "label_selector",
            QueryKey::Other(key) => key,
        }
    }
}

impl From<&str> for QueryKey {
    fn from(key: &str) -> Self {
        match key {
            "names" => QueryKey::Names,
            "guids" => QueryKey::Guids,
            "organization_guids" => QueryKey::OrganizationGuids,
            "space_guids" => QueryKey::SpaceGuids,
            "user_guids" => QueryKey::UserGuids,
            "types" => QueryKey::Types,
            "include" => QueryKey::Include,
            "per_page" => QueryKey::PerPage,
            "order_by" => QueryKey::OrderBy,
            "label_selector" => QueryKey::LabelSelector,
            other => QueryKey::Other(other.to_string()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single query parameter; multiple values are sent comma separated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub key: QueryKey,
    pub values: Vec<String>,
}

impl Query {
    pub fn new<I, S>(key: QueryKey, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Encode as `key=value1,value2` with the joined value URL-encoded
    pub fn encode(&self) -> String {
        format!(
            "{}={}",
            urlencoding::encode(self.key.as_str()),
            urlencoding::encode(&self.values.join(","))
        )
    }
}

/// Encode a sequence of queries into a query string (without the leading `?`)
pub fn encode_queries(queries: &[Query]) -> String {
    queries
        .iter()
        .map(Query::encode)
        .collect::<Vec<_>>()
        .join("&")
}
