use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::Role;
use crate::event_bus::DomainEvent;

// ============================================================================
// Membership Protocol Events
// ============================================================================
//
// Payloads are copies: handlers write these fields into their own aggregate
// and never share memory with the publishing side.
//
// ============================================================================

/// Union type for every event crossing the organization/user boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MembershipEvent {
    OrganizationRegistered(OrganizationRegistered),
    OrganizationUnregistered(OrganizationUnregistered),
    UserRegistered(UserRegistered),
    UserUnregistered(UserUnregistered),
    UserAddedToOrganization(UserAddedToOrganization),
    UserRemovedFromOrganization(UserRemovedFromOrganization),
    UserUnregisteredForOrganization(UserUnregisteredForOrganization),
}

/// Subscription key for [`MembershipEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    OrganizationRegistered,
    OrganizationUnregistered,
    UserRegistered,
    UserUnregistered,
    UserAddedToOrganization,
    UserRemovedFromOrganization,
    UserUnregisteredForOrganization,
}

impl DomainEvent for MembershipEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            MembershipEvent::OrganizationRegistered(_) => EventKind::OrganizationRegistered,
            MembershipEvent::OrganizationUnregistered(_) => EventKind::OrganizationUnregistered,
            MembershipEvent::UserRegistered(_) => EventKind::UserRegistered,
            MembershipEvent::UserUnregistered(_) => EventKind::UserUnregistered,
            MembershipEvent::UserAddedToOrganization(_) => EventKind::UserAddedToOrganization,
            MembershipEvent::UserRemovedFromOrganization(_) => {
                EventKind::UserRemovedFromOrganization
            }
            MembershipEvent::UserUnregisteredForOrganization(_) => {
                EventKind::UserUnregisteredForOrganization
            }
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            MembershipEvent::OrganizationRegistered(_) => "OrganizationRegistered",
            MembershipEvent::OrganizationUnregistered(_) => "OrganizationUnregistered",
            MembershipEvent::UserRegistered(_) => "UserRegistered",
            MembershipEvent::UserUnregistered(_) => "UserUnregistered",
            MembershipEvent::UserAddedToOrganization(_) => "UserAddedToOrganization",
            MembershipEvent::UserRemovedFromOrganization(_) => "UserRemovedFromOrganization",
            MembershipEvent::UserUnregisteredForOrganization(_) => {
                "UserUnregisteredForOrganization"
            }
        }
    }
}

// Individual event types

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRegistered {
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationUnregistered {
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUnregistered {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAddedToOrganization {
    pub organization_id: String,
    pub organization_name: String,
    pub user_id: String,
    pub roles: BTreeSet<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRemovedFromOrganization {
    pub organization_id: String,
    pub user_id: String,
}

/// Second hop of user unregistration, consumed by the organization side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUnregisteredForOrganization {
    pub organization_id: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::{deserialize_event, serialize_event};

    #[test]
    fn test_tagged_serialization() {
        let event = MembershipEvent::UserRemovedFromOrganization(UserRemovedFromOrganization {
            organization_id: "o-1".to_string(),
            user_id: "u-1".to_string(),
        });

        let json = serialize_event(&event).unwrap();
        assert!(json.contains(r#""type":"UserRemovedFromOrganization""#));

        let back: MembershipEvent = deserialize_event(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_kind_and_type_agree() {
        let event = MembershipEvent::UserUnregisteredForOrganization(
            UserUnregisteredForOrganization {
                organization_id: "o-1".to_string(),
                user_id: "u-1".to_string(),
            },
        );

        assert_eq!(event.kind(), EventKind::UserUnregisteredForOrganization);
        assert_eq!(event.event_type(), "UserUnregisteredForOrganization");
    }
}
