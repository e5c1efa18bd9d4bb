//! Cloud Controller V3 client module
//!
//! Named requests are resolved through the route table, sent with the
//! current bearer token, and decoded into typed resources together with
//! any warnings the controller returned.

mod client;
pub mod connection;
mod included;
mod job;
mod manifest;
mod organization_quota;
mod paginate;
pub mod query;
mod relationship;
mod request;
mod role;
pub mod routes;
mod service_instance;

pub use client::Client;
pub use included::{IncludedResource, IncludedResources, IncludedUser};
pub use job::JobUrl;
pub use manifest::parse_manifest;
pub use organization_quota::{
    AppLimits, DomainLimits, Limit, OrganizationQuota, QuotaRelationships, RouteLimits,
    ServiceLimits,
};
pub use paginate::ListPager;
pub use query::{Query, QueryKey};
pub use relationship::{Relationship, RelationshipList, RelationshipType, Relationships};
pub use request::RequestParams;
pub use role::{Role, RoleScope, RoleType, RoleUser};
pub use routes::{names, params, Params, Router};
pub use service_instance::ServiceInstance;
