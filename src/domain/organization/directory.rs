use std::sync::Arc;

use super::aggregate::Organization;
use crate::store::{DocumentStore, StoreError};

/// Read-only membership lookups over the organization container.
///
/// Handed to the user side, which may query organizations but never write
/// them.
#[derive(Clone)]
pub struct OrganizationDirectory {
    store: Arc<dyn DocumentStore<Organization>>,
}

impl OrganizationDirectory {
    pub fn new(store: Arc<dyn DocumentStore<Organization>>) -> Self {
        Self { store }
    }

    /// Ids of every organization listing `user_id` as a member, sorted
    pub async fn organizations_with_member(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self
            .store
            .query(&|org: &Organization| org.has_member(user_id))
            .await?
            .into_iter()
            .map(|org| org.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
