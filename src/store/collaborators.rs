use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use super::document_store::StoreError;

// ============================================================================
// Collaborator Interfaces
// ============================================================================

/// Resolves a user id to the display name cached inside organizations
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when the id does not resolve to a live user
    async fn resolve_user_name(&self, user_id: &str) -> Result<Option<String>, StoreError>;
}

/// Authenticated principal for the current command
pub trait PrincipalContext: Send + Sync {
    fn current_principal_id(&self) -> String;
}

/// Creates and drops organization-scoped storage partitions
#[async_trait]
pub trait StorageProvisioner: Send + Sync {
    async fn provision(&self, organization_id: &str) -> anyhow::Result<()>;

    async fn deprovision(&self, organization_id: &str) -> anyhow::Result<()>;
}

// ============================================================================
// In-Process Implementations
// ============================================================================

/// Principal that can be switched between commands
#[derive(Debug)]
pub struct SharedPrincipal {
    principal_id: RwLock<String>,
}

impl SharedPrincipal {
    pub fn new(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: RwLock::new(principal_id.into()),
        }
    }

    pub fn set(&self, principal_id: impl Into<String>) {
        let mut guard = self
            .principal_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = principal_id.into();
    }
}

impl PrincipalContext for SharedPrincipal {
    fn current_principal_id(&self) -> String {
        self.principal_id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Tracks provisioned partitions as `<organization_id>_user-data`
#[derive(Debug, Default)]
pub struct InMemoryProvisioner {
    partitions: tokio::sync::RwLock<HashSet<String>>,
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_name(organization_id: &str) -> String {
        format!("{}_user-data", organization_id)
    }

    pub async fn is_provisioned(&self, organization_id: &str) -> bool {
        self.partitions
            .read()
            .await
            .contains(&Self::partition_name(organization_id))
    }
}

#[async_trait]
impl StorageProvisioner for InMemoryProvisioner {
    async fn provision(&self, organization_id: &str) -> anyhow::Result<()> {
        let partition = Self::partition_name(organization_id);
        tracing::debug!(partition = %partition, "Provisioning organization partition");
        self.partitions.write().await.insert(partition);
        Ok(())
    }

    async fn deprovision(&self, organization_id: &str) -> anyhow::Result<()> {
        let partition = Self::partition_name(organization_id);
        if !self.partitions.write().await.remove(&partition) {
            tracing::debug!(partition = %partition, "Partition was not provisioned");
        }
        Ok(())
    }
}
