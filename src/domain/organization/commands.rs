use super::value_objects::{MemberRef, OrganizationServices};

// ============================================================================
// Organization Commands
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewOrganization {
    pub name: String,
    /// Defaults to the current principal
    pub owner_id: Option<String>,
    pub members: Vec<MemberRef>,
    pub services: Option<OrganizationServices>,
}

impl NewOrganization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_members(mut self, members: Vec<MemberRef>) -> Self {
        self.members = members;
        self
    }
}

/// Partial update: `None` leaves a field untouched.
///
/// `members`, when present, replaces the whole member map.
#[derive(Debug, Clone, Default)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub owner_id: Option<String>,
    pub members: Option<Vec<MemberRef>>,
    pub services: Option<OrganizationServices>,
}
