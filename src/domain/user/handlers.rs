use std::sync::{Arc, Weak};

use async_trait::async_trait;

use super::service::UserService;
use crate::event_bus::{EventEnvelope, EventHandler};
use crate::protocol::events::{EventKind, MembershipEvent};

// ============================================================================
// User-Side Event Handlers
// ============================================================================
//
// One handler per subscribed kind, all routed into UserService. The service
// is held weakly so the bus never keeps it alive.
//
// ============================================================================

pub struct UserEventHandler {
    service: Weak<UserService>,
    kind: EventKind,
}

impl UserEventHandler {
    pub fn new(service: &Arc<UserService>, kind: EventKind) -> Self {
        Self {
            service: Arc::downgrade(service),
            kind,
        }
    }
}

#[async_trait]
impl EventHandler<MembershipEvent> for UserEventHandler {
    fn name(&self) -> &'static str {
        match self.kind {
            EventKind::OrganizationRegistered => "user.organization_registered",
            EventKind::OrganizationUnregistered => "user.organization_unregistered",
            EventKind::UserAddedToOrganization => "user.added_to_organization",
            EventKind::UserRemovedFromOrganization => "user.removed_from_organization",
            EventKind::UserUnregistered => "user.unregistered",
            EventKind::UserRegistered => "user.registered",
            EventKind::UserUnregisteredForOrganization => "user.unregistered_for_organization",
        }
    }

    async fn handle(&self, envelope: &EventEnvelope<MembershipEvent>) -> anyhow::Result<()> {
        let Some(service) = self.service.upgrade() else {
            tracing::debug!(handler = self.name(), "User service dropped, skipping");
            return Ok(());
        };

        match &envelope.event_data {
            MembershipEvent::OrganizationRegistered(event) => {
                service.provision_organization(&event.organization_id).await?;
            }
            MembershipEvent::OrganizationUnregistered(event) => {
                service.deprovision_organization(&event.organization_id).await?;
            }
            MembershipEvent::UserAddedToOrganization(event) => {
                service.apply_membership_added(event).await?;
            }
            MembershipEvent::UserRemovedFromOrganization(event) => {
                service.apply_membership_removed(event).await?;
            }
            MembershipEvent::UserUnregistered(event) => {
                service.fan_out_unregistration(envelope, &event.user_id).await?;
            }
            MembershipEvent::UserRegistered(_)
            | MembershipEvent::UserUnregisteredForOrganization(_) => {
                tracing::warn!(
                    event_type = %envelope.event_type,
                    handler = self.name(),
                    "Unexpected event"
                );
            }
        }
        Ok(())
    }
}
