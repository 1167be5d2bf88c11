use async_trait::async_trait;

use super::event::{DomainEvent, EventEnvelope};

/// How a subscription receives its events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Runs inline before `publish` returns; errors reach the publisher
    Sync,
    /// Scheduled on the worker pool; errors are logged and dead-lettered
    Async,
}

#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    /// Stable name used in logs, metrics and dead letters
    fn name(&self) -> &'static str;

    async fn handle(&self, envelope: &EventEnvelope<E>) -> anyhow::Result<()>;
}
