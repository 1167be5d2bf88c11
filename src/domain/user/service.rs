use std::collections::BTreeSet;
use std::sync::Arc;

use super::aggregate::User;
use super::commands::{NewUser, UserPatch};
use super::errors::UserError;
use crate::domain::organization::OrganizationDirectory;
use crate::event_bus::{EventBus, EventEnvelope};
use crate::protocol::events::{
    MembershipEvent, UserAddedToOrganization, UserRegistered, UserRemovedFromOrganization,
    UserUnregistered, UserUnregisteredForOrganization,
};
use crate::store::{DocumentStore, IdGenerator, PrincipalContext, StorageProvisioner};

// ============================================================================
// User Service
// ============================================================================
//
// Commands cover the user's own fields. Membership copies are written only
// through the apply_* methods driven by organization-side events.
//
// ============================================================================

pub struct UserService {
    store: Arc<dyn DocumentStore<User>>,
    organizations: OrganizationDirectory,
    provisioner: Arc<dyn StorageProvisioner>,
    principal: Arc<dyn PrincipalContext>,
    bus: EventBus<MembershipEvent>,
    ids: IdGenerator,
}

impl UserService {
    pub fn new(
        store: Arc<dyn DocumentStore<User>>,
        organizations: OrganizationDirectory,
        provisioner: Arc<dyn StorageProvisioner>,
        principal: Arc<dyn PrincipalContext>,
        bus: EventBus<MembershipEvent>,
    ) -> Self {
        Self {
            store,
            organizations,
            provisioner,
            principal,
            bus,
            ids: IdGenerator,
        }
    }

    pub async fn find_user_by_id(&self, user_id: &str) -> Result<User, UserError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }

    pub async fn find_all_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.find_all().await?)
    }

    /// The registered user matching the current principal, or a transient
    /// user named after the principal when none is registered
    pub async fn current_user(&self) -> Result<User, UserError> {
        let principal_id = self.principal.current_principal_id();
        match self.store.find_by_id(&principal_id).await? {
            Some(user) => Ok(user),
            None => Ok(User::new(principal_id.clone(), principal_id, BTreeSet::new())),
        }
    }

    pub async fn register_user(&self, registration: NewUser) -> Result<User, UserError> {
        if registration.name.trim().is_empty() {
            return Err(UserError::BlankName);
        }

        let user = User::new(
            self.ids.generate(IdGenerator::USER),
            registration.name,
            registration.platform_roles,
        );
        let registered = self.store.insert(user).await?;
        if registered.id.is_empty() {
            return Err(UserError::MissingId(registered.name));
        }

        tracing::info!(user_id = %registered.id, "User registered");

        self.bus
            .publish(MembershipEvent::UserRegistered(UserRegistered {
                user_id: registered.id.clone(),
            }))
            .await?;
        Ok(registered)
    }

    pub async fn unregister_user(&self, user_id: &str) -> Result<(), UserError> {
        if !self.store.delete(user_id).await? {
            return Err(UserError::NotFound(user_id.to_string()));
        }
        tracing::info!(user_id = %user_id, "User unregistered");

        self.bus
            .publish(MembershipEvent::UserUnregistered(UserUnregistered {
                user_id: user_id.to_string(),
            }))
            .await?;
        Ok(())
    }

    pub async fn update_user(&self, user_id: &str, patch: UserPatch) -> Result<User, UserError> {
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(UserError::BlankName);
        }

        let mut user = self.find_user_by_id(user_id).await?;
        if !user.apply_patch(&patch) {
            return Ok(user);
        }

        let updated = self.store.upsert(user).await?;
        tracing::info!(user_id = %user_id, "User updated");
        Ok(updated)
    }

    pub async fn provision_organization(&self, organization_id: &str) -> Result<(), UserError> {
        self.provisioner
            .provision(organization_id)
            .await
            .map_err(|e| UserError::Provisioning {
                organization_id: organization_id.to_string(),
                message: format!("{:#}", e),
            })
    }

    /// Drops the organization-scoped partition. Users keep their copy of
    /// the membership.
    pub async fn deprovision_organization(&self, organization_id: &str) -> Result<(), UserError> {
        self.provisioner
            .deprovision(organization_id)
            .await
            .map_err(|e| UserError::Provisioning {
                organization_id: organization_id.to_string(),
                message: format!("{:#}", e),
            })
    }

    pub async fn apply_membership_added(
        &self,
        event: &UserAddedToOrganization,
    ) -> Result<(), UserError> {
        let mut user = self.find_user_by_id(&event.user_id).await?;
        user.join_organization(
            event.organization_id.clone(),
            event.organization_name.clone(),
            event.roles.clone(),
        );
        self.store.upsert(user).await?;

        tracing::debug!(
            user_id = %event.user_id,
            organization_id = %event.organization_id,
            "Membership copy written"
        );
        Ok(())
    }

    /// Writes only if the user still held a copy of the membership
    pub async fn apply_membership_removed(
        &self,
        event: &UserRemovedFromOrganization,
    ) -> Result<bool, UserError> {
        let Some(mut user) = self.store.find_by_id(&event.user_id).await? else {
            tracing::debug!(user_id = %event.user_id, "User already gone, nothing to remove");
            return Ok(false);
        };

        if !user.leave_organization(&event.organization_id) {
            return Ok(false);
        }
        self.store.upsert(user).await?;

        tracing::debug!(
            user_id = %event.user_id,
            organization_id = %event.organization_id,
            "Membership copy removed"
        );
        Ok(true)
    }

    /// First hop of user unregistration: asks every organization listing
    /// the user to drop it. Returns the number of organizations notified.
    pub async fn fan_out_unregistration(
        &self,
        cause: &EventEnvelope<MembershipEvent>,
        user_id: &str,
    ) -> Result<usize, UserError> {
        let organization_ids = self.organizations.organizations_with_member(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            organizations = organization_ids.len(),
            "Removing unregistered user from organizations"
        );

        for organization_id in &organization_ids {
            let envelope = EventEnvelope::new(MembershipEvent::UserUnregisteredForOrganization(
                UserUnregisteredForOrganization {
                    organization_id: organization_id.clone(),
                    user_id: user_id.to_string(),
                },
            ))
            .caused_by(cause);
            self.bus.publish_envelope(envelope).await?;
        }
        Ok(organization_ids.len())
    }
}
