use prometheus::{Encoder, TextEncoder};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use membership_sync::domain::organization::{MemberRef, NewOrganization};
use membership_sync::domain::user::NewUser;
use membership_sync::{MembershipSystem, SyncConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,membership_sync=debug")),
        )
        .init();

    let config = SyncConfig::from_env()?;
    tracing::info!(?config, "Starting membership synchronization demo");

    let system = MembershipSystem::in_memory(&config, "p-demo")?;

    // === 1. Register a user and an organization listing them ===
    let user = system
        .users
        .register_user(NewUser::new("Ada Lovelace", ["platform.user"]))
        .await?;

    let organization = system
        .organizations
        .register_organization(
            NewOrganization::new("Analytical Engines")
                .with_members(vec![MemberRef::new(user.id.clone(), ["admin"])]),
        )
        .await?;

    system.settle().await;
    let synced = system.users.find_user_by_id(&user.id).await?;
    tracing::info!(
        user_id = %synced.id,
        organizations = ?synced.organizations.keys().collect::<Vec<_>>(),
        "Membership propagated to user"
    );

    // === 2. Remove the member again ===
    system
        .organizations
        .remove_member(&organization.id, &user.id)
        .await?;
    system.settle().await;
    let synced = system.users.find_user_by_id(&user.id).await?;
    tracing::info!(
        user_id = %synced.id,
        organizations = synced.organizations.len(),
        "Membership removal propagated to user"
    );

    // === 3. Re-add, then unregister the user: two-hop cleanup ===
    system
        .organizations
        .add_or_replace_members(&organization.id, vec![MemberRef::new(user.id.clone(), ["viewer"])])
        .await?;
    system.settle().await;

    system.users.unregister_user(&user.id).await?;
    system.settle().await;
    let organization = system
        .organizations
        .find_organization_by_id(&organization.id)
        .await?;
    tracing::info!(
        organization_id = %organization.id,
        members = organization.members.len(),
        "Unregistered user removed from organization"
    );

    let dead_letters = system.bus.dead_letters().stats();
    tracing::info!(dead_letters = dead_letters.total_messages, "Demo complete");

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&system.metrics.registry().gather(), &mut buffer)?;
    tracing::debug!("Sync metrics:\n{}", String::from_utf8(buffer)?);

    Ok(())
}
