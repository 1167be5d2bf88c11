use crate::event_bus::BusError;
use crate::store::StoreError;

// ============================================================================
// Organization Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    #[error("Organization name must not be blank")]
    BlankName,

    #[error("Organization not found: {0}")]
    NotFound(String),

    #[error("Member user not found: {0}")]
    MemberNotFound(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Store returned no id for organization {0:?}")]
    MissingId(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] BusError),
}
