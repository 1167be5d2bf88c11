use std::collections::HashMap;
use std::sync::Arc;

use super::aggregate::Organization;
use super::commands::{NewOrganization, OrganizationPatch};
use super::errors::OrganizationError;
use super::value_objects::{MemberRef, OrganizationMember, ServiceEndpoint, ServiceSlot};
use crate::event_bus::EventBus;
use crate::protocol::events::{
    MembershipEvent, OrganizationRegistered, OrganizationUnregistered, UserAddedToOrganization,
    UserRemovedFromOrganization,
};
use crate::store::{DocumentStore, IdGenerator, IdentityResolver, PrincipalContext};

// ============================================================================
// Organization Service
// ============================================================================
//
// Every command commits its own write first, then publishes. Validation,
// lookups and ownership checks all happen before the write, so a rejected
// command leaves no record and emits nothing.
//
// ============================================================================

pub struct OrganizationService {
    store: Arc<dyn DocumentStore<Organization>>,
    identity: Arc<dyn IdentityResolver>,
    principal: Arc<dyn PrincipalContext>,
    bus: EventBus<MembershipEvent>,
    ids: IdGenerator,
}

impl OrganizationService {
    pub fn new(
        store: Arc<dyn DocumentStore<Organization>>,
        identity: Arc<dyn IdentityResolver>,
        principal: Arc<dyn PrincipalContext>,
        bus: EventBus<MembershipEvent>,
    ) -> Self {
        Self {
            store,
            identity,
            principal,
            bus,
            ids: IdGenerator,
        }
    }

    pub async fn find_organization_by_id(
        &self,
        organization_id: &str,
    ) -> Result<Organization, OrganizationError> {
        self.store
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| OrganizationError::NotFound(organization_id.to_string()))
    }

    pub async fn find_all_organizations(&self) -> Result<Vec<Organization>, OrganizationError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn register_organization(
        &self,
        registration: NewOrganization,
    ) -> Result<Organization, OrganizationError> {
        tracing::trace!(name = %registration.name, "Registering organization");

        if registration.name.trim().is_empty() {
            return Err(OrganizationError::BlankName);
        }

        let members = self.resolve_members(&registration.members).await?;
        let owner_id = registration
            .owner_id
            .unwrap_or_else(|| self.principal.current_principal_id());

        let mut organization = Organization::new(
            self.ids.generate(IdGenerator::ORGANIZATION),
            registration.name,
            owner_id,
        );
        organization.merge_members(members);
        if let Some(services) = registration.services {
            organization.services = services;
        }

        let registered = self.store.insert(organization).await?;
        if registered.id.is_empty() {
            return Err(OrganizationError::MissingId(registered.name));
        }

        tracing::info!(
            organization_id = %registered.id,
            members = registered.members.len(),
            "Organization registered"
        );

        self.bus
            .publish(MembershipEvent::OrganizationRegistered(OrganizationRegistered {
                organization_id: registered.id.clone(),
            }))
            .await?;
        self.notify_added(&registered, &registered.member_ids()).await?;

        Ok(registered)
    }

    /// Merges `members` into the organization. Every supplied member is
    /// notified, whether or not its roles actually changed.
    pub async fn add_or_replace_members(
        &self,
        organization_id: &str,
        members: Vec<MemberRef>,
    ) -> Result<Vec<OrganizationMember>, OrganizationError> {
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let mut organization = self.find_organization_by_id(organization_id).await?;
        let resolved = self.resolve_members(&members).await?;

        let mut affected: Vec<String> = resolved.iter().map(|m| m.id.clone()).collect();
        affected.sort();
        affected.dedup();

        organization.merge_members(resolved.clone());
        let organization = self.store.upsert(organization).await?;

        tracing::info!(
            organization_id = %organization_id,
            affected = affected.len(),
            "Organization members added or replaced"
        );

        self.notify_added(&organization, &affected).await?;
        Ok(resolved)
    }

    pub async fn remove_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<(), OrganizationError> {
        let mut organization = self.find_organization_by_id(organization_id).await?;

        if !organization.remove_member(user_id) {
            tracing::debug!(
                organization_id = %organization_id,
                user_id = %user_id,
                "User is not a member, nothing to remove"
            );
            return Ok(());
        }

        self.store.upsert(organization).await?;
        tracing::info!(organization_id = %organization_id, user_id = %user_id, "Member removed");

        self.notify_removed(organization_id, &[user_id.to_string()]).await
    }

    pub async fn remove_all_members(&self, organization_id: &str) -> Result<(), OrganizationError> {
        let mut organization = self.find_organization_by_id(organization_id).await?;
        if organization.members.is_empty() {
            return Ok(());
        }

        let removed = organization.clear_members();
        self.store.upsert(organization).await?;
        tracing::info!(
            organization_id = %organization_id,
            removed = removed.len(),
            "All members removed"
        );

        self.notify_removed(organization_id, &removed).await
    }

    pub async fn update_organization(
        &self,
        organization_id: &str,
        patch: OrganizationPatch,
    ) -> Result<Organization, OrganizationError> {
        let mut organization = self.find_organization_by_id(organization_id).await?;
        let mut has_changed = false;

        if let Some(owner_id) = patch.owner_id {
            if owner_id != organization.owner_id {
                self.ensure_owner(&organization, "change the ownership of")?;
                organization.owner_id = owner_id;
                has_changed = true;
            }
        }

        let mut renamed = false;
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(OrganizationError::BlankName);
            }
            if name != organization.name {
                organization.name = name;
                renamed = true;
                has_changed = true;
            }
        }

        let mut removed_members = None;
        if let Some(members) = patch.members {
            let resolved = self.resolve_members(&members).await?;
            removed_members = Some(organization.replace_members(resolved));
            has_changed = true;
        }

        if let Some(services) = patch.services {
            if services != organization.services {
                organization.services = services;
                has_changed = true;
            }
        }

        if !has_changed {
            return Ok(organization);
        }

        let updated = self.store.upsert(organization).await?;
        tracing::info!(organization_id = %organization_id, "Organization updated");

        match removed_members {
            Some(removed) => {
                self.notify_removed(organization_id, &removed).await?;
                self.notify_added(&updated, &updated.member_ids()).await?;
            }
            // Members cache the organization name
            None if renamed => self.notify_added(&updated, &updated.member_ids()).await?,
            None => {}
        }

        Ok(updated)
    }

    pub async fn unregister_organization(&self, organization_id: &str) -> Result<(), OrganizationError> {
        let organization = self.find_organization_by_id(organization_id).await?;
        self.ensure_owner(&organization, "delete")?;

        self.store.delete(organization_id).await?;
        tracing::info!(organization_id = %organization_id, "Organization unregistered");

        // Member users keep their entry for this organization; nothing is
        // published to clean it up.
        self.bus
            .publish(MembershipEvent::OrganizationUnregistered(OrganizationUnregistered {
                organization_id: organization_id.to_string(),
            }))
            .await?;
        Ok(())
    }

    pub async fn update_storage(
        &self,
        organization_id: &str,
        endpoint: ServiceEndpoint,
    ) -> Result<ServiceEndpoint, OrganizationError> {
        self.update_service_endpoint(organization_id, ServiceSlot::Storage, endpoint)
            .await
    }

    pub async fn update_solutions_container_registry(
        &self,
        organization_id: &str,
        endpoint: ServiceEndpoint,
    ) -> Result<ServiceEndpoint, OrganizationError> {
        self.update_service_endpoint(
            organization_id,
            ServiceSlot::SolutionsContainerRegistry,
            endpoint,
        )
        .await
    }

    /// Merges `credentials` into the tenant credentials and returns the result
    pub async fn update_tenant_credentials(
        &self,
        organization_id: &str,
        credentials: HashMap<String, serde_json::Value>,
    ) -> Result<HashMap<String, serde_json::Value>, OrganizationError> {
        let mut organization = self.find_organization_by_id(organization_id).await?;
        if credentials.is_empty() {
            return Ok(credentials);
        }

        organization.services.tenant_credentials.extend(credentials);
        let merged = organization.services.tenant_credentials.clone();
        self.store.upsert(organization).await?;

        Ok(merged)
    }

    /// Drops `user_id` from the organization after the user was unregistered.
    /// Writes only if the user was still listed.
    pub async fn remove_unregistered_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<bool, OrganizationError> {
        let Some(mut organization) = self.store.find_by_id(organization_id).await? else {
            tracing::debug!(
                organization_id = %organization_id,
                "Organization already gone, nothing to clean up"
            );
            return Ok(false);
        };

        if !organization.remove_member(user_id) {
            return Ok(false);
        }

        self.store.upsert(organization).await?;
        tracing::info!(
            organization_id = %organization_id,
            user_id = %user_id,
            "Unregistered user removed from organization"
        );
        Ok(true)
    }

    async fn update_service_endpoint(
        &self,
        organization_id: &str,
        slot: ServiceSlot,
        patch: ServiceEndpoint,
    ) -> Result<ServiceEndpoint, OrganizationError> {
        let mut organization = self.find_organization_by_id(organization_id).await?;

        let endpoint = organization.services.endpoint_mut(slot);
        let has_changed = endpoint.merge_from(&patch);
        let endpoint = endpoint.clone();

        if has_changed {
            self.store.upsert(organization).await?;
            tracing::debug!(organization_id = %organization_id, slot = ?slot, "Service endpoint updated");
        }
        Ok(endpoint)
    }

    /// Resolves every referenced user, refreshing the cached name. Fails on
    /// the first id that does not resolve.
    async fn resolve_members(
        &self,
        members: &[MemberRef],
    ) -> Result<Vec<OrganizationMember>, OrganizationError> {
        let mut resolved = Vec::with_capacity(members.len());
        for member in members {
            let name = self
                .identity
                .resolve_user_name(&member.id)
                .await?
                .ok_or_else(|| OrganizationError::MemberNotFound(member.id.clone()))?;

            resolved.push(OrganizationMember {
                id: member.id.clone(),
                name,
                roles: member.roles.clone(),
            });
        }
        Ok(resolved)
    }

    fn ensure_owner(&self, organization: &Organization, action: &str) -> Result<(), OrganizationError> {
        let principal_id = self.principal.current_principal_id();
        if organization.is_owned_by(&principal_id) {
            return Ok(());
        }

        tracing::warn!(
            organization_id = %organization.id,
            principal_id = %principal_id,
            "Non-owner attempted to {} organization",
            action
        );
        Err(OrganizationError::Forbidden(format!(
            "You are not allowed to {} this organization",
            action
        )))
    }

    async fn notify_added(
        &self,
        organization: &Organization,
        user_ids: &[String],
    ) -> Result<(), OrganizationError> {
        for user_id in user_ids {
            let Some(member) = organization.members.get(user_id) else {
                continue;
            };
            self.bus
                .publish(MembershipEvent::UserAddedToOrganization(UserAddedToOrganization {
                    organization_id: organization.id.clone(),
                    organization_name: organization.name.clone(),
                    user_id: user_id.clone(),
                    roles: member.roles.clone(),
                }))
                .await?;
        }
        Ok(())
    }

    async fn notify_removed(
        &self,
        organization_id: &str,
        user_ids: &[String],
    ) -> Result<(), OrganizationError> {
        for user_id in user_ids {
            self.bus
                .publish(MembershipEvent::UserRemovedFromOrganization(
                    UserRemovedFromOrganization {
                        organization_id: organization_id.to_string(),
                        user_id: user_id.clone(),
                    },
                ))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::domain::Role;
    use crate::event_bus::{Delivery, EventEnvelope, EventHandler};
    use crate::metrics::SyncMetrics;
    use crate::protocol::events::EventKind;
    use crate::store::{InMemoryStore, SharedPrincipal, StoreError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Resolves every id listed in `known`
    struct FakeIdentity {
        known: HashMap<String, String>,
    }

    #[async_trait]
    impl IdentityResolver for FakeIdentity {
        async fn resolve_user_name(&self, user_id: &str) -> Result<Option<String>, StoreError> {
            Ok(self.known.get(user_id).cloned())
        }
    }

    #[derive(Default)]
    struct Captured {
        events: Mutex<Vec<MembershipEvent>>,
    }

    impl Captured {
        fn events(&self) -> Vec<MembershipEvent> {
            self.events.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl EventHandler<MembershipEvent> for Captured {
        fn name(&self) -> &'static str {
            "captured"
        }

        async fn handle(&self, envelope: &EventEnvelope<MembershipEvent>) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(envelope.event_data.clone());
            Ok(())
        }
    }

    struct Fixture {
        service: OrganizationService,
        store: Arc<InMemoryStore<Organization>>,
        principal: Arc<SharedPrincipal>,
        captured: Arc<Captured>,
    }

    fn fixture() -> Fixture {
        let bus = EventBus::new(&SyncConfig::default(), Arc::new(SyncMetrics::new().unwrap()));
        let captured = Arc::new(Captured::default());
        for kind in [
            EventKind::OrganizationRegistered,
            EventKind::OrganizationUnregistered,
            EventKind::UserAddedToOrganization,
            EventKind::UserRemovedFromOrganization,
        ] {
            bus.subscribe(kind, Delivery::Sync, captured.clone());
        }

        let store: Arc<InMemoryStore<Organization>> = Arc::new(InMemoryStore::new("organizations"));
        let principal = Arc::new(SharedPrincipal::new("owner"));
        let identity = Arc::new(FakeIdentity {
            known: HashMap::from([
                ("u-1".to_string(), "Ada".to_string()),
                ("u-2".to_string(), "Grace".to_string()),
            ]),
        });

        Fixture {
            service: OrganizationService::new(store.clone(), identity, principal.clone(), bus),
            store,
            principal,
            captured,
        }
    }

    fn added(org: &Organization, user_id: &str, roles: &[&str]) -> MembershipEvent {
        MembershipEvent::UserAddedToOrganization(UserAddedToOrganization {
            organization_id: org.id.clone(),
            organization_name: org.name.clone(),
            user_id: user_id.to_string(),
            roles: Role::set(roles.iter().copied()),
        })
    }

    fn removed(org: &Organization, user_id: &str) -> MembershipEvent {
        MembershipEvent::UserRemovedFromOrganization(UserRemovedFromOrganization {
            organization_id: org.id.clone(),
            user_id: user_id.to_string(),
        })
    }

    async fn registered_with_u1(f: &Fixture) -> Organization {
        let org = f
            .service
            .register_organization(
                NewOrganization::new("Acme").with_members(vec![MemberRef::new("u-1", ["admin"])]),
            )
            .await
            .unwrap();
        f.captured.clear();
        org
    }

    #[tokio::test]
    async fn test_register_caches_member_names_and_notifies() {
        let f = fixture();
        let org = f
            .service
            .register_organization(
                NewOrganization::new("Acme").with_members(vec![MemberRef::new("u-1", ["admin"])]),
            )
            .await
            .unwrap();

        assert!(org.id.starts_with("o-"));
        assert_eq!(org.owner_id, "owner");
        assert_eq!(org.members["u-1"].name, "Ada");
        assert_eq!(
            f.captured.events(),
            vec![
                MembershipEvent::OrganizationRegistered(OrganizationRegistered {
                    organization_id: org.id.clone(),
                }),
                added(&org, "u-1", &["admin"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_register_rejects_blank_name() {
        let f = fixture();
        let result = f.service.register_organization(NewOrganization::new("  ")).await;

        assert!(matches!(result, Err(OrganizationError::BlankName)));
        assert_eq!(f.store.writes(), 0);
        assert!(f.captured.events().is_empty());
    }

    #[tokio::test]
    async fn test_register_with_unknown_member_leaves_nothing_behind() {
        let f = fixture();
        let result = f
            .service
            .register_organization(NewOrganization::new("Acme").with_members(vec![
                MemberRef::new("u-1", ["admin"]),
                MemberRef::new("ghost", ["viewer"]),
            ]))
            .await;

        assert!(matches!(result, Err(OrganizationError::MemberNotFound(id)) if id == "ghost"));
        assert!(f.store.is_empty().await);
        assert!(f.captured.events().is_empty());
    }

    #[tokio::test]
    async fn test_add_or_replace_notifies_every_supplied_member() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        let members = f
            .service
            .add_or_replace_members(
                &org.id,
                vec![MemberRef::new("u-1", ["admin"]), MemberRef::new("u-2", ["viewer"])],
            )
            .await
            .unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[1].name, "Grace");
        // u-1 is unchanged but still notified
        assert_eq!(
            f.captured.events(),
            vec![added(&org, "u-1", &["admin"]), added(&org, "u-2", &["viewer"])]
        );
    }

    #[tokio::test]
    async fn test_add_or_replace_overwrites_roles() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        f.service
            .add_or_replace_members(&org.id, vec![MemberRef::new("u-1", ["viewer"])])
            .await
            .unwrap();

        let stored = f.service.find_organization_by_id(&org.id).await.unwrap();
        assert_eq!(stored.members["u-1"].roles, Role::set(["viewer"]));
    }

    #[tokio::test]
    async fn test_add_or_replace_unknown_user_fails_without_write() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        let writes = f.store.writes();

        let result = f
            .service
            .add_or_replace_members(&org.id, vec![MemberRef::new("ghost", ["admin"])])
            .await;

        assert!(matches!(result, Err(OrganizationError::MemberNotFound(_))));
        assert_eq!(f.store.writes(), writes);
        assert!(f.captured.events().is_empty());
    }

    #[tokio::test]
    async fn test_add_or_replace_unknown_organization() {
        let f = fixture();
        let result = f
            .service
            .add_or_replace_members("o-missing", vec![MemberRef::new("u-1", ["admin"])])
            .await;
        assert!(matches!(result, Err(OrganizationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_absent_member_is_a_no_op() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        let writes = f.store.writes();

        f.service.remove_member(&org.id, "u-2").await.unwrap();

        assert_eq!(f.store.writes(), writes);
        assert!(f.captured.events().is_empty());
    }

    #[tokio::test]
    async fn test_remove_member_persists_and_notifies() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        f.service.remove_member(&org.id, "u-1").await.unwrap();

        let stored = f.service.find_organization_by_id(&org.id).await.unwrap();
        assert!(stored.members.is_empty());
        assert_eq!(f.captured.events(), vec![removed(&org, "u-1")]);
    }

    #[tokio::test]
    async fn test_remove_all_members_notifies_each() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        f.service
            .add_or_replace_members(&org.id, vec![MemberRef::new("u-2", ["viewer"])])
            .await
            .unwrap();
        f.captured.clear();
        let writes = f.store.writes();

        f.service.remove_all_members(&org.id).await.unwrap();

        assert_eq!(f.store.writes(), writes + 1);
        assert_eq!(
            f.captured.events(),
            vec![removed(&org, "u-1"), removed(&org, "u-2")]
        );
    }

    #[tokio::test]
    async fn test_owner_transfer_by_non_owner_is_forbidden() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        f.principal.set("intruder");

        let result = f
            .service
            .update_organization(
                &org.id,
                OrganizationPatch {
                    owner_id: Some("intruder".to_string()),
                    ..OrganizationPatch::default()
                },
            )
            .await;

        assert!(matches!(result, Err(OrganizationError::Forbidden(_))));
        let stored = f.service.find_organization_by_id(&org.id).await.unwrap();
        assert_eq!(stored.owner_id, "owner");
    }

    #[tokio::test]
    async fn test_owner_can_transfer_ownership() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        let updated = f
            .service
            .update_organization(
                &org.id,
                OrganizationPatch {
                    owner_id: Some("heir".to_string()),
                    ..OrganizationPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.owner_id, "heir");
        assert!(f.captured.events().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_members_replaces_and_notifies_both_ways() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        let updated = f
            .service
            .update_organization(
                &org.id,
                OrganizationPatch {
                    members: Some(vec![MemberRef::new("u-2", ["admin"])]),
                    ..OrganizationPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.member_ids(), vec!["u-2".to_string()]);
        assert_eq!(
            f.captured.events(),
            vec![removed(&org, "u-1"), added(&org, "u-2", &["admin"])]
        );
    }

    #[tokio::test]
    async fn test_rename_refreshes_cached_names() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        let updated = f
            .service
            .update_organization(
                &org.id,
                OrganizationPatch {
                    name: Some("Acme Corp".to_string()),
                    ..OrganizationPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(f.captured.events(), vec![added(&updated, "u-1", &["admin"])]);
    }

    #[tokio::test]
    async fn test_update_without_changes_does_not_write() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        let writes = f.store.writes();

        f.service
            .update_organization(
                &org.id,
                OrganizationPatch {
                    name: Some("Acme".to_string()),
                    owner_id: Some("owner".to_string()),
                    ..OrganizationPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(f.store.writes(), writes);
    }

    #[tokio::test]
    async fn test_unregister_requires_owner() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        f.principal.set("intruder");

        let result = f.service.unregister_organization(&org.id).await;

        assert!(matches!(result, Err(OrganizationError::Forbidden(_))));
        assert!(f.service.find_organization_by_id(&org.id).await.is_ok());
        assert!(f.captured.events().is_empty());
    }

    #[tokio::test]
    async fn test_unregister_deletes_and_notifies() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        f.service.unregister_organization(&org.id).await.unwrap();

        assert!(matches!(
            f.service.find_organization_by_id(&org.id).await,
            Err(OrganizationError::NotFound(_))
        ));
        assert_eq!(
            f.captured.events(),
            vec![MembershipEvent::OrganizationUnregistered(OrganizationUnregistered {
                organization_id: org.id.clone(),
            })]
        );
    }

    #[tokio::test]
    async fn test_update_storage_compare_and_set() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        let patch = ServiceEndpoint {
            base_uri: Some("https://storage".to_string()),
            ..ServiceEndpoint::default()
        };

        let endpoint = f.service.update_storage(&org.id, patch.clone()).await.unwrap();
        assert_eq!(endpoint.base_uri.as_deref(), Some("https://storage"));
        let writes = f.store.writes();

        f.service.update_storage(&org.id, patch).await.unwrap();
        assert_eq!(f.store.writes(), writes);
    }

    #[tokio::test]
    async fn test_update_tenant_credentials_merges() {
        let f = fixture();
        let org = registered_with_u1(&f).await;

        f.service
            .update_tenant_credentials(&org.id, HashMap::from([("a".to_string(), 1.into())]))
            .await
            .unwrap();
        let merged = f
            .service
            .update_tenant_credentials(&org.id, HashMap::from([("b".to_string(), 2.into())]))
            .await
            .unwrap();

        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_unregistered_user_writes_only_on_removal() {
        let f = fixture();
        let org = registered_with_u1(&f).await;
        let writes = f.store.writes();

        assert!(!f.service.remove_unregistered_user(&org.id, "u-2").await.unwrap());
        assert_eq!(f.store.writes(), writes);

        assert!(f.service.remove_unregistered_user(&org.id, "u-1").await.unwrap());
        assert_eq!(f.store.writes(), writes + 1);
        assert!(f.captured.events().is_empty());
    }
}
