// ============================================================================
// Membership Synchronization Protocol
// ============================================================================
//
// Which side reacts to which event, and how it is delivered:
//
//   OrganizationRegistered          -> user side, Sync  (provision partition)
//   OrganizationUnregistered        -> user side, Async (drop partition only)
//   UserAddedToOrganization         -> user side, Async (write membership copy)
//   UserRemovedFromOrganization     -> user side, Async (drop membership copy)
//   UserUnregistered                -> user side, Async (fan out second hop)
//   UserUnregisteredForOrganization -> org side,  Async (drop member entry)
//
// UserRegistered has no subscriber.
//
// ============================================================================

pub mod events;

use std::sync::Arc;

use crate::domain::organization::{OrganizationService, UserUnregisteredForOrganizationHandler};
use crate::domain::user::{UserEventHandler, UserService};
use crate::event_bus::{Delivery, EventBus};

pub use events::{EventKind, MembershipEvent};

pub const USER_SIDE_BINDINGS: [(EventKind, Delivery); 5] = [
    (EventKind::OrganizationRegistered, Delivery::Sync),
    (EventKind::OrganizationUnregistered, Delivery::Async),
    (EventKind::UserAddedToOrganization, Delivery::Async),
    (EventKind::UserRemovedFromOrganization, Delivery::Async),
    (EventKind::UserUnregistered, Delivery::Async),
];

pub const ORGANIZATION_SIDE_BINDINGS: [(EventKind, Delivery); 1] = [(
    EventKind::UserUnregisteredForOrganization,
    Delivery::Async,
)];

/// Subscribes both services' handlers. Call once, at startup.
pub fn wire(
    bus: &EventBus<MembershipEvent>,
    organizations: &Arc<OrganizationService>,
    users: &Arc<UserService>,
) {
    for (kind, delivery) in USER_SIDE_BINDINGS {
        bus.subscribe(kind, delivery, Arc::new(UserEventHandler::new(users, kind)));
    }

    for (kind, delivery) in ORGANIZATION_SIDE_BINDINGS {
        bus.subscribe(
            kind,
            delivery,
            Arc::new(UserUnregisteredForOrganizationHandler::new(organizations)),
        );
    }

    tracing::debug!("Membership synchronization protocol wired");
}
