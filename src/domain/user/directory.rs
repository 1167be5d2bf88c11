use std::sync::Arc;

use async_trait::async_trait;

use super::aggregate::User;
use crate::store::{DocumentStore, IdentityResolver, StoreError};

/// Resolves member names from the user container.
///
/// Handed to the organization side so it can check that referenced users
/// exist and cache their display name.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn DocumentStore<User>>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore<User>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityResolver for UserDirectory {
    async fn resolve_user_name(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.store.find_by_id(user_id).await?.map(|user| user.name))
    }
}
