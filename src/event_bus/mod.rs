// ============================================================================
// Event Bus - In-Process Publish/Dispatch
// ============================================================================
//
// Generic over the event type. Constructed once at startup and handed to
// every aggregate service by clone; nothing about it is global.
//
// - event   - Envelope metadata and the DomainEvent trait
// - handler - Handler trait and delivery modes
// - bus     - Inline sync dispatch + bounded async worker pool
// - dlq     - Dead letters for async deliveries that failed or were dropped
//
// No persistence: in-flight async deliveries are lost on restart.
//
// ============================================================================

mod bus;
mod dlq;
mod error;
mod event;
mod handler;

pub use bus::EventBus;
pub use dlq::{DeadLetter, DeadLetterQueue, DlqStats};
pub use error::BusError;
pub use event::{deserialize_event, serialize_event, DomainEvent, EventEnvelope};
pub use handler::{Delivery, EventHandler};
