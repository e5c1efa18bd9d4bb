//! Roles: a user's permission within one organization or one space

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ccv3::included::IncludedResources;
use crate::ccv3::job::JobUrl;
use crate::ccv3::query::Query;
use crate::ccv3::relationship::{Relationship, RelationshipType, Relationships};
use crate::ccv3::request::RequestParams;
use crate::ccv3::routes::names;
use crate::ccv3::Client;
use crate::error::ApiResult;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    OrganizationUser,
    OrganizationAuditor,
    OrganizationManager,
    OrganizationBillingManager,
    SpaceAuditor,
    SpaceDeveloper,
    SpaceManager,
    SpaceSupporter,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::OrganizationUser => "organization_user",
            RoleType::OrganizationAuditor => "organization_auditor",
            RoleType::OrganizationManager => "organization_manager",
            RoleType::OrganizationBillingManager => "organization_billing_manager",
            RoleType::SpaceAuditor => "space_auditor",
            RoleType::SpaceDeveloper => "space_developer",
            RoleType::SpaceManager => "space_manager",
            RoleType::SpaceSupporter => "space_supporter",
            RoleType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a role applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleScope {
    Organization(String),
    /// A space, plus the owning organization when the controller reports it
    Space {
        guid: String,
        org_guid: Option<String>,
    },
}

/// How the role's user is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleUser {
    Guid(String),
    /// Username within an identity provider such as `uaa` or `ldap`
    Name { username: String, origin: String },
}

impl Default for RoleUser {
    fn default() -> Self {
        RoleUser::Guid(String::new())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "RoleResponseWire", into = "RoleRequestWire")]
pub struct Role {
    pub guid: String,
    pub role_type: RoleType,
    /// `None` only for roles decoded without either relationship
    pub scope: Option<RoleScope>,
    pub user: RoleUser,
    /// Display name of the user, filled from included users on list requests
    pub username: String,
}

impl Role {
    /// A new role in an organization for the given user
    pub fn for_organization(role_type: RoleType, org_guid: &str, user: RoleUser) -> Self {
        Self::with_scope(role_type, RoleScope::Organization(org_guid.to_string()), user)
    }

    /// A new role in a space for the given user
    pub fn for_space(role_type: RoleType, space_guid: &str, user: RoleUser) -> Self {
        let scope = RoleScope::Space {
            guid: space_guid.to_string(),
            org_guid: None,
        };
        Self::with_scope(role_type, scope, user)
    }

    fn with_scope(role_type: RoleType, scope: RoleScope, user: RoleUser) -> Self {
        Self {
            guid: String::new(),
            role_type,
            scope: Some(scope),
            user,
            username: String::new(),
        }
    }

    /// Organization of an organization role, or the owner of a space role
    pub fn org_guid(&self) -> Option<&str> {
        let guid = match &self.scope {
            Some(RoleScope::Organization(guid)) => Some(guid.as_str()),
            Some(RoleScope::Space { org_guid, .. }) => org_guid.as_deref(),
            None => None,
        };
        guid.filter(|guid| !guid.is_empty())
    }

    pub fn space_guid(&self) -> Option<&str> {
        match &self.scope {
            Some(RoleScope::Space { guid, .. }) if !guid.is_empty() => Some(guid),
            _ => None,
        }
    }

    pub fn user_guid(&self) -> Option<&str> {
        match &self.user {
            RoleUser::Guid(guid) if !guid.is_empty() => Some(guid),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct UserDataWire {
    #[serde(skip_serializing_if = "String::is_empty")]
    guid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    origin: String,
}

#[derive(Serialize)]
struct UserRelationshipWire {
    data: UserDataWire,
}

#[derive(Serialize)]
struct RoleRelationshipsWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    space: Option<Relationship>,
    user: UserRelationshipWire,
}

/// Body of a create-role request
#[derive(Serialize)]
struct RoleRequestWire {
    #[serde(skip_serializing_if = "String::is_empty")]
    guid: String,
    #[serde(rename = "type")]
    role_type: RoleType,
    relationships: RoleRelationshipsWire,
}

impl From<Role> for RoleRequestWire {
    fn from(role: Role) -> Self {
        // Only the role's own scope is sent; a space role's owner stays local
        let space = role.space_guid().map(Relationship::new);
        let organization = match space {
            Some(_) => None,
            None => role.org_guid().map(Relationship::new),
        };

        let data = match role.user {
            RoleUser::Name { username, origin } if !username.is_empty() => UserDataWire {
                guid: String::new(),
                username,
                origin,
            },
            RoleUser::Name { .. } => UserDataWire {
                guid: String::new(),
                username: String::new(),
                origin: String::new(),
            },
            RoleUser::Guid(guid) => UserDataWire {
                guid,
                username: String::new(),
                origin: String::new(),
            },
        };

        Self {
            guid: role.guid,
            role_type: role.role_type,
            relationships: RoleRelationshipsWire {
                organization,
                space,
                user: UserRelationshipWire { data },
            },
        }
    }
}

/// A role as returned by the controller
#[derive(Deserialize)]
struct RoleResponseWire {
    #[serde(default)]
    guid: String,
    #[serde(rename = "type", default)]
    role_type: RoleType,
    #[serde(default)]
    relationships: Relationships,
}

impl From<RoleResponseWire> for Role {
    fn from(wire: RoleResponseWire) -> Self {
        let rels = &wire.relationships;
        // A space role also reports its organization on some controller versions
        let org_guid = rels
            .guid(RelationshipType::Organization)
            .map(str::to_string);
        let scope = match rels.guid(RelationshipType::Space) {
            Some(space) => Some(RoleScope::Space {
                guid: space.to_string(),
                org_guid,
            }),
            None => org_guid.map(RoleScope::Organization),
        };
        let user = RoleUser::Guid(
            rels.guid(RelationshipType::User)
                .unwrap_or_default()
                .to_string(),
        );

        Self {
            guid: wire.guid,
            role_type: wire.role_type,
            scope,
            user,
            username: String::new(),
        }
    }
}

impl Client {
    pub async fn create_role(&self, role: &Role) -> ApiResult<Role> {
        let params = RequestParams::new(names::POST_ROLE).body(role)?;
        self.make_request(&params).await
    }

    pub async fn delete_role(&self, role_guid: &str) -> ApiResult<JobUrl> {
        let params = RequestParams::new(names::DELETE_ROLE).uri_param("role_guid", role_guid);
        self.make_request_job(&params).await
    }

    /// List roles; usernames are filled in when the query includes users
    pub async fn get_roles(&self, query: &[Query]) -> ApiResult<(Vec<Role>, IncludedResources)> {
        let params = RequestParams::new(names::GET_ROLES).query(query);
        let ((mut roles, included), warnings) = self.list_all::<Role>(&params).await?;

        for role in &mut roles {
            if let Some(user) = role.user_guid().and_then(|guid| included.user(guid)) {
                role.username = user.username.clone();
            }
        }

        Ok(((roles, included), warnings))
    }
}
