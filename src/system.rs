use std::sync::Arc;

use crate::config::SyncConfig;
use crate::domain::organization::{Organization, OrganizationDirectory, OrganizationService};
use crate::domain::user::{User, UserDirectory, UserService};
use crate::event_bus::EventBus;
use crate::metrics::SyncMetrics;
use crate::protocol::{self, MembershipEvent};
use crate::store::{InMemoryProvisioner, InMemoryStore, SharedPrincipal};

// ============================================================================
// In-Process Assembly
// ============================================================================
//
// Builds the bus, both services and in-memory collaborators, then wires the
// protocol. Stores and the principal stay reachable for inspection.
//
// ============================================================================

pub struct MembershipSystem {
    pub bus: EventBus<MembershipEvent>,
    pub organizations: Arc<OrganizationService>,
    pub users: Arc<UserService>,
    pub organization_store: Arc<InMemoryStore<Organization>>,
    pub user_store: Arc<InMemoryStore<User>>,
    pub provisioner: Arc<InMemoryProvisioner>,
    pub principal: Arc<SharedPrincipal>,
    pub metrics: Arc<SyncMetrics>,
}

impl MembershipSystem {
    /// Must be called inside a tokio runtime
    pub fn in_memory(config: &SyncConfig, principal_id: &str) -> anyhow::Result<Self> {
        config.validate()?;

        let metrics = Arc::new(SyncMetrics::new()?);
        let bus = EventBus::new(config, metrics.clone());

        let organization_store: Arc<InMemoryStore<Organization>> =
            Arc::new(InMemoryStore::new("organizations"));
        let user_store: Arc<InMemoryStore<User>> = Arc::new(InMemoryStore::new("users"));
        let provisioner = Arc::new(InMemoryProvisioner::new());
        let principal = Arc::new(SharedPrincipal::new(principal_id));

        let organizations = Arc::new(OrganizationService::new(
            organization_store.clone(),
            Arc::new(UserDirectory::new(user_store.clone())),
            principal.clone(),
            bus.clone(),
        ));
        let users = Arc::new(UserService::new(
            user_store.clone(),
            OrganizationDirectory::new(organization_store.clone()),
            provisioner.clone(),
            principal.clone(),
            bus.clone(),
        ));

        protocol::wire(&bus, &organizations, &users);

        Ok(Self {
            bus,
            organizations,
            users,
            organization_store,
            user_store,
            provisioner,
            principal,
            metrics,
        })
    }

    /// Waits until every async delivery has been handled
    pub async fn settle(&self) {
        self.bus.wait_idle().await;
    }
}
