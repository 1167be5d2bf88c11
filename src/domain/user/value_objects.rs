use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Copy of a membership held on the user side, keyed by organization id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOrganization {
    pub name: String,
    pub roles: BTreeSet<Role>,
}
