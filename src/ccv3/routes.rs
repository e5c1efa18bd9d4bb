//! Named request routes for the controller API
//!
//! A route maps a symbolic request name to an HTTP method and a path
//! template such as `/v3/roles/:role_guid`. Placeholders are path segments
//! starting with `:` and are substituted from the caller's URI parameters.

use log::debug;
use reqwest::Method;
use std::collections::{BTreeMap, HashMap};

use crate::error::{CcError, Result};

/// URI parameters keyed by placeholder name
pub type Params = BTreeMap<String, String>;

/// Request names of the routes registered by [`Router::default`]
pub mod names {
    pub const DELETE_ISOLATION_SEGMENT_RELATIONSHIP_ORGANIZATION: &str =
        "DeleteIsolationSegmentRelationshipOrganization";
    pub const DELETE_ORGANIZATION_QUOTA: &str = "DeleteOrganizationQuota";
    pub const DELETE_ROLE: &str = "DeleteRole";
    pub const DELETE_SERVICE_INSTANCE_RELATIONSHIPS_SHARED_SPACE: &str =
        "DeleteServiceInstanceRelationshipsSharedSpace";
    pub const GET_APPLICATION_MANIFEST: &str = "GetApplicationManifest";
    pub const GET_ORGANIZATION_QUOTA: &str = "GetOrganizationQuota";
    pub const GET_ORGANIZATION_QUOTAS: &str = "GetOrganizationQuotas";
    pub const GET_ORGANIZATION_RELATIONSHIP_DEFAULT_ISOLATION_SEGMENT: &str =
        "GetOrganizationRelationshipDefaultIsolationSegment";
    pub const GET_ROLES: &str = "GetRoles";
    pub const GET_SERVICE_INSTANCES: &str = "GetServiceInstances";
    pub const GET_SPACE_RELATIONSHIP_ISOLATION_SEGMENT: &str =
        "GetSpaceRelationshipIsolationSegment";
    pub const PATCH_APPLICATION_CURRENT_DROPLET: &str = "PatchApplicationCurrentDroplet";
    pub const PATCH_ORGANIZATION_QUOTA: &str = "PatchOrganizationQuota";
    pub const PATCH_ORGANIZATION_RELATIONSHIP_DEFAULT_ISOLATION_SEGMENT: &str =
        "PatchOrganizationRelationshipDefaultIsolationSegment";
    pub const PATCH_SPACE_RELATIONSHIP_ISOLATION_SEGMENT: &str =
        "PatchSpaceRelationshipIsolationSegment";
    pub const POST_ORGANIZATION_QUOTA: &str = "PostOrganizationQuota";
    pub const POST_ORGANIZATION_QUOTA_APPLY: &str = "PostOrganizationQuotaApply";
    pub const POST_ROLE: &str = "PostRole";
}

/// A registered route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub template: String,
}

/// A route with every placeholder substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub method: Method,
    pub path: String,
}

/// Registry of named routes
#[derive(Debug, Clone)]
pub struct Router {
    routes: HashMap<String, Route>,
}

impl Default for Router {
    fn default() -> Self {
        use names::*;

        let mut router = Self::empty();
        let table: &[(&str, Method, &str)] = &[
            (
                DELETE_ISOLATION_SEGMENT_RELATIONSHIP_ORGANIZATION,
                Method::DELETE,
                "/v3/isolation_segments/:isolation_segment_guid/relationships/organizations/:organization_guid",
            ),
            (
                DELETE_ORGANIZATION_QUOTA,
                Method::DELETE,
                "/v3/organization_quotas/:quota_guid",
            ),
            (DELETE_ROLE, Method::DELETE, "/v3/roles/:role_guid"),
            (
                DELETE_SERVICE_INSTANCE_RELATIONSHIPS_SHARED_SPACE,
                Method::DELETE,
                "/v3/service_instances/:service_instance_guid/relationships/shared_spaces/:space_guid",
            ),
            (
                GET_APPLICATION_MANIFEST,
                Method::GET,
                "/v3/apps/:app_guid/manifest",
            ),
            (
                GET_ORGANIZATION_QUOTA,
                Method::GET,
                "/v3/organization_quotas/:quota_guid",
            ),
            (GET_ORGANIZATION_QUOTAS, Method::GET, "/v3/organization_quotas"),
            (
                GET_ORGANIZATION_RELATIONSHIP_DEFAULT_ISOLATION_SEGMENT,
                Method::GET,
                "/v3/organizations/:organization_guid/relationships/default_isolation_segment",
            ),
            (GET_ROLES, Method::GET, "/v3/roles"),
            (GET_SERVICE_INSTANCES, Method::GET, "/v3/service_instances"),
            (
                GET_SPACE_RELATIONSHIP_ISOLATION_SEGMENT,
                Method::GET,
                "/v3/spaces/:space_guid/relationships/isolation_segment",
            ),
            (
                PATCH_APPLICATION_CURRENT_DROPLET,
                Method::PATCH,
                "/v3/apps/:app_guid/relationships/current_droplet",
            ),
            (
                PATCH_ORGANIZATION_QUOTA,
                Method::PATCH,
                "/v3/organization_quotas/:quota_guid",
            ),
            (
                PATCH_ORGANIZATION_RELATIONSHIP_DEFAULT_ISOLATION_SEGMENT,
                Method::PATCH,
                "/v3/organizations/:organization_guid/relationships/default_isolation_segment",
            ),
            (
                PATCH_SPACE_RELATIONSHIP_ISOLATION_SEGMENT,
                Method::PATCH,
                "/v3/spaces/:space_guid/relationships/isolation_segment",
            ),
            (POST_ORGANIZATION_QUOTA, Method::POST, "/v3/organization_quotas"),
            (
                POST_ORGANIZATION_QUOTA_APPLY,
                Method::POST,
                "/v3/organization_quotas/:quota_guid/relationships/organizations",
            ),
            (POST_ROLE, Method::POST, "/v3/roles"),
        ];

        for (name, method, template) in table {
            router.register(name, method.clone(), template);
        }
        router
    }
}

impl Router {
    /// Create a router with no routes
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register (or replace) a route under `name`
    pub fn register(&mut self, name: &str, method: Method, template: &str) {
        self.routes.insert(
            name.to_string(),
            Route {
                method,
                template: template.to_string(),
            },
        );
    }

    /// Registered request names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a request name and URI parameters into a method and path
    pub fn resolve(&self, name: &str, params: &Params) -> Result<ResolvedRoute> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| CcError::RouteNotFound(name.to_string()))?;

        let mut segments = Vec::new();
        for segment in route.template.split('/') {
            match segment.strip_prefix(':') {
                Some(placeholder) => {
                    let value =
                        params
                            .get(placeholder)
                            .ok_or_else(|| CcError::MissingUriParameter {
                                route: name.to_string(),
                                parameter: placeholder.to_string(),
                            })?;
                    segments.push(urlencoding::encode(value).into_owned());
                }
                None => segments.push(segment.to_string()),
            }
        }

        let path = segments.join("/");
        debug!("Resolved {} to {} {}", name, route.method, path);

        Ok(ResolvedRoute {
            method: route.method.clone(),
            path,
        })
    }
}

/// Build URI parameters from name/value pairs
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
