use crate::event_bus::BusError;
use crate::store::StoreError;

// ============================================================================
// User Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User name must not be blank")]
    BlankName,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Store returned no id for user {0:?}")]
    MissingId(String),

    #[error("Storage provisioning failed for organization {organization_id}: {message}")]
    Provisioning {
        organization_id: String,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] BusError),
}
