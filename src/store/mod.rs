// ============================================================================
// Store - External Collaborator Boundary
// ============================================================================
//
// Interfaces the aggregate services consume but do not own:
// - Document store (one container per aggregate type)
// - Identity resolution (user display names)
// - Authorization context (current principal)
// - Storage provisioning (organization-scoped partitions)
// - Id generation
//
// In-memory implementations live next to each trait so the whole protocol
// can run inside a single process.
//
// ============================================================================

mod collaborators;
mod document_store;
mod id;

pub use collaborators::{
    IdentityResolver, InMemoryProvisioner, PrincipalContext, SharedPrincipal, StorageProvisioner,
};
pub use document_store::{Document, DocumentStore, InMemoryStore, StoreError};
pub use id::IdGenerator;
