use std::fmt::Debug;
use std::hash::Hash;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Event Envelope - Dispatch Metadata
// ============================================================================

/// Wraps a domain event with the metadata used for logging and dead letters
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    pub event_id: Uuid,
    pub event_type: String,
    pub event_version: i32,

    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,      // Event that triggered this one
    pub correlation_id: Uuid,            // Shared by every event of one command

    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(event_data: E) -> Self {
        let event_id = Uuid::now_v7();
        Self {
            event_id,
            event_type: event_data.event_type().to_string(),
            event_version: E::event_version(),
            event_data,
            causation_id: None,
            correlation_id: event_id,
            timestamp: Utc::now(),
        }
    }

    /// Marks this event as a consequence of `parent`, inheriting its correlation
    pub fn caused_by<P>(mut self, parent: &EventEnvelope<P>) -> Self {
        self.causation_id = Some(parent.event_id);
        self.correlation_id = parent.correlation_id;
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Events routed by the bus.
///
/// `Kind` is the subscription key: every handler subscribes to one kind.
pub trait DomainEvent:
    Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static
{
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;

    fn event_type(&self) -> &'static str;

    fn event_version() -> i32
    where
        Self: Sized,
    {
        1
    }
}

pub fn serialize_event<E: Serialize>(event: &E) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

pub fn deserialize_event<E: DeserializeOwned>(json: &str) -> Result<E> {
    Ok(serde_json::from_str(json)?)
}
