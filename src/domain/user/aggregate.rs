use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::commands::UserPatch;
use super::value_objects::UserOrganization;
use crate::domain::Role;
use crate::store::Document;

// ============================================================================
// User Aggregate
// ============================================================================
//
// `organizations` should match the organizations listing this user as a
// member, but only eventually: it trails the organization side by one
// async delivery.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub platform_roles: BTreeSet<Role>,
    pub organizations: HashMap<String, UserOrganization>,
}

impl Document for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, platform_roles: BTreeSet<Role>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform_roles,
            organizations: HashMap::new(),
        }
    }

    /// Inserts or overwrites the membership copy for `organization_id`
    pub fn join_organization(
        &mut self,
        organization_id: impl Into<String>,
        name: impl Into<String>,
        roles: BTreeSet<Role>,
    ) {
        self.organizations.insert(
            organization_id.into(),
            UserOrganization {
                name: name.into(),
                roles,
            },
        );
    }

    /// Returns whether a membership copy was removed
    pub fn leave_organization(&mut self, organization_id: &str) -> bool {
        self.organizations.remove(organization_id).is_some()
    }

    /// Compare-and-set on name and platform roles; returns whether anything
    /// changed
    pub fn apply_patch(&mut self, patch: &UserPatch) -> bool {
        let mut changed = false;

        if let Some(name) = &patch.name {
            if name != &self.name {
                self.name = name.clone();
                changed = true;
            }
        }
        if let Some(roles) = &patch.platform_roles {
            if roles != &self.platform_roles {
                self.platform_roles = roles.clone();
                changed = true;
            }
        }
        changed
    }
}
