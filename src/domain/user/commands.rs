use std::collections::BTreeSet;

use crate::domain::Role;

// ============================================================================
// User Commands
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub platform_roles: BTreeSet<Role>,
}

impl NewUser {
    pub fn new<I, S>(name: impl Into<String>, platform_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            platform_roles: Role::set(platform_roles),
        }
    }
}

/// Partial update of a user's own fields. Memberships are not patchable.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub platform_roles: Option<BTreeSet<Role>>,
}
