//! Relationship payloads and relationship endpoints
//!
//! A to-one relationship is `{"data":{"guid":"..."}}`, or `{"data":null}`
//! when it points at nothing. An empty GUID always encodes as the null form
//! so that "unset" is sent explicitly rather than omitted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ccv3::request::RequestParams;
use crate::ccv3::routes::names;
use crate::ccv3::Client;
use crate::error::ApiResult;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
struct GuidData {
    #[serde(default)]
    guid: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ToOneWire {
    #[serde(default)]
    data: Option<GuidData>,
}

/// A reference to zero or one related resource
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "ToOneWire", into = "ToOneWire")]
pub struct Relationship {
    pub guid: String,
}

impl Relationship {
    pub fn new(guid: impl Into<String>) -> Self {
        Self { guid: guid.into() }
    }

    pub fn is_set(&self) -> bool {
        !self.guid.is_empty()
    }
}

impl From<ToOneWire> for Relationship {
    fn from(wire: ToOneWire) -> Self {
        Self {
            guid: wire.data.map(|d| d.guid).unwrap_or_default(),
        }
    }
}

impl From<Relationship> for ToOneWire {
    fn from(relationship: Relationship) -> Self {
        let data = if relationship.guid.is_empty() {
            None
        } else {
            Some(GuidData {
                guid: relationship.guid,
            })
        };
        Self { data }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ToManyWire {
    #[serde(default)]
    data: Vec<GuidData>,
}

/// A reference to any number of related resources
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "ToManyWire", into = "ToManyWire")]
pub struct RelationshipList {
    pub guids: Vec<String>,
}

impl From<ToManyWire> for RelationshipList {
    fn from(wire: ToManyWire) -> Self {
        Self {
            guids: wire.data.into_iter().map(|d| d.guid).collect(),
        }
    }
}

impl From<RelationshipList> for ToManyWire {
    fn from(list: RelationshipList) -> Self {
        Self {
            data: list.guids.into_iter().map(|guid| GuidData { guid }).collect(),
        }
    }
}

/// Relationship names found in resource `relationships` maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    Organization,
    Space,
    User,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Organization => "organization",
            RelationshipType::Space => "space",
            RelationshipType::User => "user",
        }
    }
}

/// Either shape a relationship can take inside a resource
#[derive(Deserialize)]
#[serde(untagged)]
enum AnyRelationshipWire {
    ToOne(ToOneWire),
    ToMany(ToManyWire),
}

/// A resource's `relationships` map, reduced to one GUID per to-one relationship
///
/// To-many relationships are skipped. An absent key and `{"data":null}`
/// both read back as "no GUID".
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "HashMap<String, AnyRelationshipWire>")]
pub struct Relationships(HashMap<String, Relationship>);

impl From<HashMap<String, AnyRelationshipWire>> for Relationships {
    fn from(raw: HashMap<String, AnyRelationshipWire>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(name, wire)| match wire {
                    AnyRelationshipWire::ToOne(one) => Some((name, Relationship::from(one))),
                    AnyRelationshipWire::ToMany(_) => None,
                })
                .collect(),
        )
    }
}

impl Relationships {
    /// GUID of the related resource, if the relationship is present and set
    pub fn guid(&self, kind: RelationshipType) -> Option<&str> {
        self.0
            .get(kind.as_str())
            .map(|r| r.guid.as_str())
            .filter(|g| !g.is_empty())
    }
}

impl Client {
    /// Remove an organization from an isolation segment's allowed list
    pub async fn delete_isolation_segment_organization(
        &self,
        isolation_segment_guid: &str,
        org_guid: &str,
    ) -> ApiResult<()> {
        let params = RequestParams::new(names::DELETE_ISOLATION_SEGMENT_RELATIONSHIP_ORGANIZATION)
            .uri_param("isolation_segment_guid", isolation_segment_guid)
            .uri_param("organization_guid", org_guid);

        let (_, warnings) = self.make_request_job(&params).await?;
        Ok(((), warnings))
    }

    /// Stop sharing a service instance with a space
    pub async fn delete_service_instance_relationships_shared_space(
        &self,
        service_instance_guid: &str,
        space_guid: &str,
    ) -> ApiResult<()> {
        let params = RequestParams::new(names::DELETE_SERVICE_INSTANCE_RELATIONSHIPS_SHARED_SPACE)
            .uri_param("service_instance_guid", service_instance_guid)
            .uri_param("space_guid", space_guid);

        let (_, warnings) = self.make_request_job(&params).await?;
        Ok(((), warnings))
    }

    /// Default isolation segment of an organization
    pub async fn get_organization_default_isolation_segment(
        &self,
        org_guid: &str,
    ) -> ApiResult<Relationship> {
        let params =
            RequestParams::new(names::GET_ORGANIZATION_RELATIONSHIP_DEFAULT_ISOLATION_SEGMENT)
                .uri_param("organization_guid", org_guid);
        self.make_request(&params).await
    }

    /// Isolation segment assigned to a space
    pub async fn get_space_isolation_segment(&self, space_guid: &str) -> ApiResult<Relationship> {
        let params = RequestParams::new(names::GET_SPACE_RELATIONSHIP_ISOLATION_SEGMENT)
            .uri_param("space_guid", space_guid);
        self.make_request(&params).await
    }

    /// Set the current droplet of an application
    pub async fn set_application_droplet(
        &self,
        app_guid: &str,
        droplet_guid: &str,
    ) -> ApiResult<Relationship> {
        let params = RequestParams::new(names::PATCH_APPLICATION_CURRENT_DROPLET)
            .uri_param("app_guid", app_guid)
            .body(&Relationship::new(droplet_guid))?;
        self.make_request(&params).await
    }

    /// Set an organization's default isolation segment; an empty GUID resets it
    pub async fn update_organization_default_isolation_segment_relationship(
        &self,
        org_guid: &str,
        isolation_segment_guid: &str,
    ) -> ApiResult<Relationship> {
        let params =
            RequestParams::new(names::PATCH_ORGANIZATION_RELATIONSHIP_DEFAULT_ISOLATION_SEGMENT)
                .uri_param("organization_guid", org_guid)
                .body(&Relationship::new(isolation_segment_guid))?;
        self.make_request(&params).await
    }

    /// Assign an isolation segment to a space; an empty GUID resets it
    pub async fn update_space_isolation_segment_relationship(
        &self,
        space_guid: &str,
        isolation_segment_guid: &str,
    ) -> ApiResult<Relationship> {
        let params = RequestParams::new(names::PATCH_SPACE_RELATIONSHIP_ISOLATION_SEGMENT)
            .uri_param("space_guid", space_guid)
            .body(&Relationship::new(isolation_segment_guid))?;
        self.make_request(&params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_set_relationship() {
        let value = serde_json::to_value(Relationship::new("some-guid")).unwrap();
        assert_eq!(value, json!({"data": {"guid": "some-guid"}}));
    }

    #[test]
    fn test_encode_empty_relationship_is_explicit_null() {
        let value = serde_json::to_value(Relationship::default()).unwrap();
        assert_eq!(value, json!({"data": null}));
    }

    #[test]
    fn test_round_trip() {
        for guid in ["some-guid", "", "a-b-c-d"] {
            let encoded = serde_json::to_string(&Relationship::new(guid)).unwrap();
            let decoded: Relationship = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded.guid, guid);
        }
    }

    #[test]
    fn test_decode_null_data() {
        let decoded: Relationship = serde_json::from_value(json!({"data": null})).unwrap();
        assert_eq!(decoded, Relationship::default());
        assert!(!decoded.is_set());
    }

    #[test]
    fn test_decode_ignores_links() {
        let decoded: Relationship = serde_json::from_value(json!({
            "data": {"guid": "iso-guid"},
            "links": {"self": {"href": "https://api.example.com/v3/spaces/s/relationships/isolation_segment"}}
        }))
        .unwrap();
        assert_eq!(decoded.guid, "iso-guid");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(serde_json::from_str::<Relationship>("{\"data\":").is_err());
    }

    #[test]
    fn test_relationship_list_encode() {
        let list = RelationshipList {
            guids: vec!["org-1".to_string(), "org-2".to_string()],
        };
        assert_eq!(
            serde_json::to_value(list).unwrap(),
            json!({"data": [{"guid": "org-1"}, {"guid": "org-2"}]})
        );
    }

    #[test]
    fn test_relationship_list_decode() {
        let list: RelationshipList =
            serde_json::from_value(json!({"data": [{"guid": "org-1"}]})).unwrap();
        assert_eq!(list.guids, vec!["org-1"]);
    }

    #[test]
    fn test_relationships_map() {
        let rels: Relationships = serde_json::from_value(json!({
            "user": {"data": {"guid": "user-guid"}},
            "space": {"data": {"guid": "space-guid"}},
            "organization": {"data": null},
            "shared_spaces": {"data": [{"guid": "s1"}]}
        }))
        .unwrap();
        assert_eq!(rels.guid(RelationshipType::User), Some("user-guid"));
        assert_eq!(rels.guid(RelationshipType::Space), Some("space-guid"));
        assert_eq!(rels.guid(RelationshipType::Organization), None);
    }

    #[test]
    fn test_relationships_absent_and_null_are_the_same() {
        let absent: Relationships =
            serde_json::from_value(json!({"user": {"data": {"guid": "u"}}})).unwrap();
        let null: Relationships = serde_json::from_value(json!({
            "user": {"data": {"guid": "u"}},
            "space": {"data": null}
        }))
        .unwrap();
        assert_eq!(absent.guid(RelationshipType::Space), None);
        assert_eq!(null.guid(RelationshipType::Space), None);
    }
}
