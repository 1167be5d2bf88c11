use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for the synchronization protocol
// ============================================================================
//
// - Events published per event type
// - Async handler failures per event type and handler
// - Dead letters recorded
// - Async deliveries queued or running
//
// Each SyncMetrics owns its own Registry so several buses can coexist.
// ============================================================================

pub struct SyncMetrics {
    registry: Registry,

    pub events_published: IntCounterVec,
    pub handler_failures: IntCounterVec,
    pub dead_letters_total: IntCounter,
    pub async_in_flight: IntGauge,
}

impl SyncMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let events_published = IntCounterVec::new(
            Opts::new("membership_events_published_total", "Total membership events published"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let handler_failures = IntCounterVec::new(
            Opts::new(
                "membership_handler_failures_total",
                "Total async handler deliveries that failed or were dropped",
            ),
            &["event_type", "handler"],
        )?;
        registry.register(Box::new(handler_failures.clone()))?;

        let dead_letters_total = IntCounter::new(
            "membership_dead_letters_total",
            "Total deliveries recorded in the dead letter queue",
        )?;
        registry.register(Box::new(dead_letters_total.clone()))?;

        let async_in_flight = IntGauge::new(
            "membership_async_in_flight",
            "Async deliveries currently queued or running",
        )?;
        registry.register(Box::new(async_in_flight.clone()))?;

        Ok(Self {
            registry,
            events_published,
            handler_failures,
            dead_letters_total,
            async_in_flight,
        })
    }

    /// Get the Prometheus registry for exposing metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_published(&self, event_type: &str) {
        self.events_published.with_label_values(&[event_type]).inc();
    }

    pub fn record_dead_letter(&self, event_type: &str, handler: &str) {
        self.handler_failures.with_label_values(&[event_type, handler]).inc();
        self.dead_letters_total.inc();
    }
}
