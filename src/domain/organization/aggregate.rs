use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::value_objects::{OrganizationMember, OrganizationServices};
use crate::store::Document;

// ============================================================================
// Organization Aggregate
// ============================================================================
//
// Every key in `members` resolved to a live user when it was written. It is
// not re-validated afterwards.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub members: HashMap<String, OrganizationMember>,
    pub services: OrganizationServices,
}

impl Document for Organization {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            members: HashMap::new(),
            services: OrganizationServices::default(),
        }
    }

    pub fn is_owned_by(&self, principal_id: &str) -> bool {
        self.owner_id == principal_id
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.contains_key(user_id)
    }

    /// Member ids in a stable order
    pub fn member_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.members.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Insert-or-overwrite keyed by user id; a repeated id keeps the last entry
    pub fn merge_members(&mut self, members: impl IntoIterator<Item = OrganizationMember>) {
        for member in members {
            self.members.insert(member.id.clone(), member);
        }
    }

    /// Replaces the whole member map and returns the ids that were dropped,
    /// sorted
    pub fn replace_members(
        &mut self,
        members: impl IntoIterator<Item = OrganizationMember>,
    ) -> Vec<String> {
        let previous = std::mem::take(&mut self.members);
        self.merge_members(members);

        let mut removed: Vec<String> = previous
            .into_keys()
            .filter(|id| !self.members.contains_key(id))
            .collect();
        removed.sort();
        removed
    }

    /// Returns whether the user was a member
    pub fn remove_member(&mut self, user_id: &str) -> bool {
        self.members.remove(user_id).is_some()
    }

    /// Empties the member map and returns the previous ids, sorted
    pub fn clear_members(&mut self) -> Vec<String> {
        let mut removed: Vec<String> = std::mem::take(&mut self.members).into_keys().collect();
        removed.sort();
        removed
    }
}
