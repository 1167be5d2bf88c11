// ============================================================================
// Domain Layer - Aggregates and Their Services
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Aggregate (record + invariant-keeping mutations)
// - Commands (registration input and patches)
// - Errors
// - Service (commands that persist, then publish)
// - Handlers (reactions to the other aggregate's events)
// - Directory (read-only view handed to the other side)
//
// Neither aggregate touches the other's store for writes. Membership
// changes cross over only as MembershipEvent payloads.
//
// ============================================================================

pub mod organization;
pub mod role;
pub mod user;

pub use role::Role;
