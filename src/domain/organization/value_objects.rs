use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::Role;

// ============================================================================
// Organization Value Objects
// ============================================================================

/// Member entry embedded in an organization.
///
/// `name` is a cached copy of the user's display name taken at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub id: String,
    pub name: String,
    pub roles: BTreeSet<Role>,
}

/// Member as supplied by a caller, before the user id is resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: String,
    pub roles: BTreeSet<Role>,
}

impl MemberRef {
    pub fn new<I, S>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            roles: Role::set(roles),
        }
    }
}

/// Connection details for one platform service used by an organization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub cloud_service: Option<String>,
    pub base_uri: Option<String>,
    pub platform_service: Option<String>,
    pub resource_uri: Option<String>,
    pub credentials: Option<HashMap<String, serde_json::Value>>,
}

impl ServiceEndpoint {
    /// Field-by-field compare-and-set from `patch`. Supplied credentials
    /// always replace the stored ones wholesale and count as a change.
    pub fn merge_from(&mut self, patch: &ServiceEndpoint) -> bool {
        let mut changed = false;
        changed |= set_if_changed(&mut self.cloud_service, &patch.cloud_service);
        changed |= set_if_changed(&mut self.base_uri, &patch.base_uri);
        changed |= set_if_changed(&mut self.platform_service, &patch.platform_service);
        changed |= set_if_changed(&mut self.resource_uri, &patch.resource_uri);

        if let Some(credentials) = &patch.credentials {
            self.credentials = Some(credentials.clone());
            changed = true;
        }
        changed
    }
}

fn set_if_changed(current: &mut Option<String>, patch: &Option<String>) -> bool {
    match patch {
        Some(value) if current.as_ref() != Some(value) => {
            *current = Some(value.clone());
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationServices {
    pub storage: Option<ServiceEndpoint>,
    pub solutions_container_registry: Option<ServiceEndpoint>,
    pub tenant_credentials: HashMap<String, serde_json::Value>,
}

/// Which endpoint of [`OrganizationServices`] an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSlot {
    Storage,
    SolutionsContainerRegistry,
}

impl OrganizationServices {
    pub fn endpoint_mut(&mut self, slot: ServiceSlot) -> &mut ServiceEndpoint {
        match slot {
            ServiceSlot::Storage => self.storage.get_or_insert_with(ServiceEndpoint::default),
            ServiceSlot::SolutionsContainerRegistry => self
                .solutions_container_registry
                .get_or_insert_with(ServiceEndpoint::default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_only_sets_supplied_fields() {
        let mut endpoint = ServiceEndpoint {
            cloud_service: Some("blob".to_string()),
            base_uri: Some("https://old".to_string()),
            ..ServiceEndpoint::default()
        };
        let patch = ServiceEndpoint {
            base_uri: Some("https://new".to_string()),
            ..ServiceEndpoint::default()
        };

        assert!(endpoint.merge_from(&patch));
        assert_eq!(endpoint.cloud_service.as_deref(), Some("blob"));
        assert_eq!(endpoint.base_uri.as_deref(), Some("https://new"));
    }

    #[test]
    fn test_merge_same_values_is_unchanged() {
        let mut endpoint = ServiceEndpoint {
            resource_uri: Some("res".to_string()),
            ..ServiceEndpoint::default()
        };
        let patch = endpoint.clone();
        assert!(!endpoint.merge_from(&patch));
    }

    #[test]
    fn test_credentials_replace_wholesale() {
        let mut endpoint = ServiceEndpoint {
            credentials: Some(HashMap::from([("old".to_string(), json!("x"))])),
            ..ServiceEndpoint::default()
        };
        let patch = ServiceEndpoint {
            credentials: Some(HashMap::from([("key".to_string(), json!("secret"))])),
            ..ServiceEndpoint::default()
        };

        assert!(endpoint.merge_from(&patch));
        let credentials = endpoint.credentials.unwrap();
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials["key"], json!("secret"));
    }
}
