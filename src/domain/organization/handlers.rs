use std::sync::{Arc, Weak};

use async_trait::async_trait;

use super::service::OrganizationService;
use crate::event_bus::{EventEnvelope, EventHandler};
use crate::protocol::events::MembershipEvent;

// ============================================================================
// Organization-Side Event Handlers
// ============================================================================
//
// Holds the service weakly: the bus must not keep a service alive.
//
// ============================================================================

/// Second hop of user unregistration: drops the user from one organization
pub struct UserUnregisteredForOrganizationHandler {
    service: Weak<OrganizationService>,
}

impl UserUnregisteredForOrganizationHandler {
    pub fn new(service: &Arc<OrganizationService>) -> Self {
        Self {
            service: Arc::downgrade(service),
        }
    }
}

#[async_trait]
impl EventHandler<MembershipEvent> for UserUnregisteredForOrganizationHandler {
    fn name(&self) -> &'static str {
        "organization.user_unregistered_for_organization"
    }

    async fn handle(&self, envelope: &EventEnvelope<MembershipEvent>) -> anyhow::Result<()> {
        let MembershipEvent::UserUnregisteredForOrganization(event) = &envelope.event_data else {
            tracing::warn!(event_type = %envelope.event_type, handler = self.name(), "Unexpected event");
            return Ok(());
        };

        let Some(service) = self.service.upgrade() else {
            tracing::debug!(handler = self.name(), "Organization service dropped, skipping");
            return Ok(());
        };

        service
            .remove_unregistered_user(&event.organization_id, &event.user_id)
            .await?;
        Ok(())
    }
}
