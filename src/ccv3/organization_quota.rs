//! Organization quotas
//!
//! Every limit is tri-state: omitted (leave unchanged), `null` (unlimited)
//! or a number.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ccv3::job::JobUrl;
use crate::ccv3::query::Query;
use crate::ccv3::relationship::RelationshipList;
use crate::ccv3::request::RequestParams;
use crate::ccv3::routes::names;
use crate::ccv3::Client;
use crate::error::ApiResult;

/// A single quota limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    Value(u64),
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Unlimited => serializer.serialize_none(),
            Limit::Value(n) => serializer.serialize_u64(*n),
        }
    }
}

/// Reads a present field; `null` means unlimited. Absent fields stay `None`
/// through `#[serde(default)]`.
fn limit<'de, D>(deserializer: D) -> Result<Option<Limit>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<u64>::deserialize(deserializer)?;
    Ok(Some(value.map_or(Limit::Unlimited, Limit::Value)))
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppLimits {
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_memory_in_mb: Option<Limit>,
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub per_process_memory_in_mb: Option<Limit>,
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_instances: Option<Limit>,
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub per_app_tasks: Option<Limit>,
}

impl AppLimits {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_services_allowed: Option<bool>,
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_service_instances: Option<Limit>,
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_service_keys: Option<Limit>,
}

impl ServiceLimits {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteLimits {
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_routes: Option<Limit>,
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_reserved_ports: Option<Limit>,
}

impl RouteLimits {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainLimits {
    #[serde(default, deserialize_with = "limit", skip_serializing_if = "Option::is_none")]
    pub total_domains: Option<Limit>,
}

impl DomainLimits {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaRelationships {
    #[serde(default)]
    pub organizations: RelationshipList,
}

impl QuotaRelationships {
    fn is_empty(&self) -> bool {
        self.organizations.guids.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationQuota {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub guid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "AppLimits::is_empty")]
    pub apps: AppLimits,
    #[serde(default, skip_serializing_if = "ServiceLimits::is_empty")]
    pub services: ServiceLimits,
    #[serde(default, skip_serializing_if = "RouteLimits::is_empty")]
    pub routes: RouteLimits,
    #[serde(default, skip_serializing_if = "DomainLimits::is_empty")]
    pub domains: DomainLimits,
    /// Organizations the quota applies to
    #[serde(default, skip_serializing_if = "QuotaRelationships::is_empty")]
    pub relationships: QuotaRelationships,
}

impl Client {
    /// Apply a quota to an organization; returns every organization it now covers
    pub async fn apply_organization_quota(
        &self,
        quota_guid: &str,
        org_guid: &str,
    ) -> ApiResult<RelationshipList> {
        let params = RequestParams::new(names::POST_ORGANIZATION_QUOTA_APPLY)
            .uri_param("quota_guid", quota_guid)
            .body(&RelationshipList {
                guids: vec![org_guid.to_string()],
            })?;
        self.make_request(&params).await
    }

    pub async fn create_organization_quota(
        &self,
        quota: &OrganizationQuota,
    ) -> ApiResult<OrganizationQuota> {
        let params = RequestParams::new(names::POST_ORGANIZATION_QUOTA).body(quota)?;
        self.make_request(&params).await
    }

    pub async fn delete_organization_quota(&self, quota_guid: &str) -> ApiResult<JobUrl> {
        let params =
            RequestParams::new(names::DELETE_ORGANIZATION_QUOTA).uri_param("quota_guid", quota_guid);
        self.make_request_job(&params).await
    }

    pub async fn get_organization_quota(&self, quota_guid: &str) -> ApiResult<OrganizationQuota> {
        let params =
            RequestParams::new(names::GET_ORGANIZATION_QUOTA).uri_param("quota_guid", quota_guid);
        self.make_request(&params).await
    }

    pub async fn get_organization_quotas(
        &self,
        query: &[Query],
    ) -> ApiResult<Vec<OrganizationQuota>> {
        let params = RequestParams::new(names::GET_ORGANIZATION_QUOTAS).query(query);
        let ((quotas, _), warnings) = self.list_all(&params).await?;
        Ok((quotas, warnings))
    }

    /// Update a quota; its GUID addresses the request and is not sent in the body
    pub async fn update_organization_quota(
        &self,
        quota: &OrganizationQuota,
    ) -> ApiResult<OrganizationQuota> {
        let mut body = quota.clone();
        let quota_guid = std::mem::take(&mut body.guid);

        let params = RequestParams::new(names::PATCH_ORGANIZATION_QUOTA)
            .uri_param("quota_guid", &quota_guid)
            .body(&body)?;
        self.make_request(&params).await
    }
}
