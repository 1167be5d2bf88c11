// ============================================================================
// User Domain
// ============================================================================
//
// Owns user records. The `organizations` map of each user is maintained
// only by the handlers reacting to organization-side events, never by
// user commands.
//
// ============================================================================

pub mod aggregate;
pub mod commands;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod service;
pub mod value_objects;

pub use aggregate::*;
pub use commands::*;
pub use directory::*;
pub use errors::*;
pub use handlers::*;
pub use service::*;
pub use value_objects::*;
