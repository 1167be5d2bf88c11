use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::event::{serialize_event, DomainEvent, EventEnvelope};

// ============================================================================
// Dead Letter Queue
// ============================================================================
//
// Async deliveries that failed or could not be scheduled end up here.
// Nothing is retried automatically: an entry marks a membership edge that
// may be stuck until someone intervenes.
//
// Bounded: the oldest entries are dropped once capacity is reached.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub id: Uuid,
    pub event_id: Uuid,
    pub correlation_id: Uuid,
    pub event_type: String,
    pub handler: &'static str,
    pub payload: String,
    pub error_message: String,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DlqStats {
    /// Every dead letter ever recorded, including evicted ones
    pub total_messages: u64,
    pub retained: usize,
    pub by_event_type: HashMap<String, u64>,
}

#[derive(Debug)]
pub struct DeadLetterQueue {
    capacity: usize,
    state: Mutex<DlqState>,
}

#[derive(Debug, Default)]
struct DlqState {
    messages: VecDeque<DeadLetter>,
    stats: DlqStats,
}

impl DeadLetterQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(DlqState::default()),
        }
    }

    pub fn record<E: DomainEvent>(
        &self,
        envelope: &EventEnvelope<E>,
        handler: &'static str,
        error_message: impl Into<String>,
    ) -> DeadLetter {
        let payload = serialize_event(&envelope.event_data)
            .unwrap_or_else(|e| format!("<unserializable payload: {}>", e));

        let letter = DeadLetter {
            id: Uuid::new_v4(),
            event_id: envelope.event_id,
            correlation_id: envelope.correlation_id,
            event_type: envelope.event_type.clone(),
            handler,
            payload,
            error_message: error_message.into(),
            failed_at: Utc::now(),
        };

        let mut state = self.lock();
        state.stats.total_messages += 1;
        *state
            .stats
            .by_event_type
            .entry(letter.event_type.clone())
            .or_insert(0) += 1;

        if self.capacity > 0 {
            if state.messages.len() == self.capacity {
                state.messages.pop_front();
            }
            state.messages.push_back(letter.clone());
        }
        state.stats.retained = state.messages.len();

        letter
    }

    /// Oldest first, at most `limit` entries
    pub fn list(&self, limit: usize) -> Vec<DeadLetter> {
        self.lock().messages.iter().take(limit).cloned().collect()
    }

    pub fn stats(&self) -> DlqStats {
        self.lock().stats.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DlqState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct Tick(u32);

    impl DomainEvent for Tick {
        type Kind = ();

        fn kind(&self) -> Self::Kind {}

        fn event_type(&self) -> &'static str {
            "Tick"
        }
    }

    #[test]
    fn test_record_keeps_payload_and_reason() {
        let dlq = DeadLetterQueue::new(10);
        let envelope = EventEnvelope::new(Tick(3));

        let letter = dlq.record(&envelope, "tick_handler", "boom");

        assert_eq!(letter.event_id, envelope.event_id);
        assert_eq!(letter.payload, "3");
        assert_eq!(letter.error_message, "boom");
        assert_eq!(dlq.list(10).len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest_but_stats_keep_counting() {
        let dlq = DeadLetterQueue::new(2);
        for n in 0..3 {
            dlq.record(&EventEnvelope::new(Tick(n)), "tick_handler", "boom");
        }

        let retained = dlq.list(10);
        assert_eq!(retained.len(), 2);
        assert_eq!(retained[0].payload, "1");

        let stats = dlq.stats();
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.retained, 2);
        assert_eq!(stats.by_event_type.get("Tick"), Some(&3));
    }
}
