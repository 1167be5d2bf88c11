//! Membership synchronization between two independently persisted
//! aggregates, organizations and users, over an in-process event bus.
//!
//! Each aggregate keeps a denormalized copy of its side of the membership
//! relation. Commands commit on their own aggregate, then publish events;
//! handlers on the other aggregate copy the change over, either inline or
//! on a bounded worker pool. The two views agree eventually, not at once.

pub mod config;
pub mod domain;
pub mod event_bus;
pub mod metrics;
pub mod protocol;
pub mod store;
pub mod system;

pub use config::SyncConfig;
pub use system::MembershipSystem;
