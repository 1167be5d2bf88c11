// ============================================================================
// Organization Domain
// ============================================================================
//
// Owns organization records and their embedded member map. Publishes
// membership changes for the user side to mirror, and consumes the second
// hop of user unregistration.
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
