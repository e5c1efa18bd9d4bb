//! Side-loaded resources returned with list responses (`?include=...`)

use serde::{Deserialize, Serialize};

/// A user from the `included.users` list
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludedUser {
    pub guid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub presentation_name: String,
    #[serde(default)]
    pub origin: String,
}

/// A named resource (organization, space) from the `included` map
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludedResource {
    pub guid: String,
    #[serde(default)]
    pub name: String,
}

/// Resources side-loaded alongside a list, merged across pages
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludedResources {
    #[serde(default)]
    pub users: Vec<IncludedUser>,
    #[serde(default)]
    pub organizations: Vec<IncludedResource>,
    #[serde(default)]
    pub spaces: Vec<IncludedResource>,
}

impl IncludedResources {
    /// Append another page's included resources
    pub fn merge(&mut self, other: IncludedResources) {
        self.users.extend(other.users);
        self.organizations.extend(other.organizations);
        self.spaces.extend(other.spaces);
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.organizations.is_empty() && self.spaces.is_empty()
    }

    pub fn user(&self, guid: &str) -> Option<&IncludedUser> {
        self.users.iter().find(|u| u.guid == guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_partial_included() {
        let included: IncludedResources = serde_json::from_value(json!({
            "users": [{"guid": "u1", "username": "admin", "origin": "uaa"}]
        }))
        .unwrap();
        assert_eq!(included.users.len(), 1);
        assert!(included.spaces.is_empty());
        assert_eq!(included.user("u1").unwrap().username, "admin");
        assert!(included.user("u2").is_none());
    }

    #[test]
    fn test_decode_ignores_unknown_types() {
        let included: IncludedResources = serde_json::from_value(json!({
            "service_offerings": [{"guid": "so-1"}]
        }))
        .unwrap();
        assert!(included.is_empty());
    }

    #[test]
    fn test_merge_keeps_page_order() {
        let mut first = IncludedResources {
            users: vec![IncludedUser {
                guid: "u1".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let second = IncludedResources {
            users: vec![IncludedUser {
                guid: "u2".to_string(),
                ..Default::default()
            }],
            spaces: vec![IncludedResource {
                guid: "s1".to_string(),
                name: "dev".to_string(),
            }],
            ..Default::default()
        };
        first.merge(second);
        let guids: Vec<&str> = first.users.iter().map(|u| u.guid.as_str()).collect();
        assert_eq!(guids, vec!["u1", "u2"]);
        assert_eq!(first.spaces.len(), 1);
    }
}
