use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use futures_util::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Notify, Semaphore};

use super::dlq::DeadLetterQueue;
use super::error::BusError;
use super::event::{DomainEvent, EventEnvelope};
use super::handler::{Delivery, EventHandler};
use crate::config::SyncConfig;
use crate::metrics::SyncMetrics;

// ============================================================================
// Event Bus
// ============================================================================
//
// publish():
// 1. Runs every Sync subscription inline, in registration order. The first
//    failure aborts publication and is returned to the caller.
// 2. Enqueues one job per Async subscription on a bounded channel and
//    returns without waiting.
//
// A dispatcher task drains the channel and runs jobs on spawned tasks,
// at most `workers` at a time. Jobs carry no ordering guarantee relative to
// each other. Failures and panics are logged and dead-lettered.
//
// ============================================================================

struct Subscription<E: DomainEvent> {
    delivery: Delivery,
    handler: Arc<dyn EventHandler<E>>,
}

impl<E: DomainEvent> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            delivery: self.delivery,
            handler: self.handler.clone(),
        }
    }
}

struct Job<E: DomainEvent> {
    envelope: Arc<EventEnvelope<E>>,
    handler: Arc<dyn EventHandler<E>>,
}

/// State shared between publishers and the dispatcher task
struct Shared {
    in_flight: AtomicUsize,
    idle: Notify,
    dead_letters: DeadLetterQueue,
    metrics: Arc<SyncMetrics>,
}

impl Shared {
    fn begin(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.metrics.async_in_flight.inc();
    }

    fn finish(&self) {
        self.metrics.async_in_flight.dec();
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    fn dead_letter<E: DomainEvent>(
        &self,
        envelope: &EventEnvelope<E>,
        handler: &'static str,
        reason: String,
    ) {
        tracing::error!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            handler = handler,
            error = %reason,
            "Async delivery failed, adding to dead letter queue"
        );
        self.metrics.record_dead_letter(&envelope.event_type, handler);
        self.dead_letters.record(envelope, handler, reason);
    }
}

struct Inner<E: DomainEvent> {
    subscriptions: RwLock<HashMap<E::Kind, Vec<Subscription<E>>>>,
    queue: mpsc::Sender<Job<E>>,
    shared: Arc<Shared>,
}

/// Cheap to clone; every clone publishes into the same subscriptions and pool
pub struct EventBus<E: DomainEvent> {
    inner: Arc<Inner<E>>,
}

impl<E: DomainEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: DomainEvent> EventBus<E> {
    /// Must be called inside a tokio runtime: spawns the dispatcher task.
    /// The dispatcher exits once every clone of the bus is dropped.
    pub fn new(config: &SyncConfig, metrics: Arc<SyncMetrics>) -> Self {
        let (queue, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let shared = Arc::new(Shared {
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
            dead_letters: DeadLetterQueue::new(config.dead_letter_capacity),
            metrics,
        });

        tokio::spawn(dispatch(receiver, shared.clone(), config.workers.max(1)));

        tracing::debug!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "Event bus started"
        );

        Self {
            inner: Arc::new(Inner {
                subscriptions: RwLock::new(HashMap::new()),
                queue,
                shared,
            }),
        }
    }

    pub fn subscribe(
        &self,
        kind: E::Kind,
        delivery: Delivery,
        handler: Arc<dyn EventHandler<E>>,
    ) {
        tracing::debug!(kind = ?kind, handler = handler.name(), delivery = ?delivery, "Subscribing handler");
        self.inner
            .subscriptions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(kind)
            .or_default()
            .push(Subscription { delivery, handler });
    }

    pub async fn publish(&self, event: E) -> Result<(), BusError> {
        self.publish_envelope(EventEnvelope::new(event)).await
    }

    pub async fn publish_envelope(&self, envelope: EventEnvelope<E>) -> Result<(), BusError> {
        let subscriptions = self.subscriptions_for(envelope.event_data.kind());
        let event_type = envelope.event_data.event_type();

        tracing::debug!(
            event_id = %envelope.event_id,
            event_type = event_type,
            subscribers = subscriptions.len(),
            "Publishing event"
        );
        self.inner.shared.metrics.record_published(event_type);

        let envelope = Arc::new(envelope);

        for subscription in subscriptions.iter().filter(|s| s.delivery == Delivery::Sync) {
            subscription
                .handler
                .handle(&envelope)
                .await
                .map_err(|source| BusError::HandlerFailed {
                    handler: subscription.handler.name(),
                    event_type,
                    source: source.into(),
                })?;
        }

        for subscription in subscriptions.into_iter().filter(|s| s.delivery == Delivery::Async) {
            self.enqueue(Job {
                envelope: envelope.clone(),
                handler: subscription.handler,
            });
        }

        Ok(())
    }

    /// Resolves once no async delivery is queued or running, including
    /// deliveries published from inside async handlers.
    pub async fn wait_idle(&self) {
        let shared = &self.inner.shared;
        loop {
            let notified = shared.idle.notified();
            if shared.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn dead_letters(&self) -> &DeadLetterQueue {
        &self.inner.shared.dead_letters
    }

    fn subscriptions_for(&self, kind: E::Kind) -> Vec<Subscription<E>> {
        self.inner
            .subscriptions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    fn enqueue(&self, job: Job<E>) {
        let shared = &self.inner.shared;
        shared.begin();

        let (job, reason) = match self.inner.queue.try_send(job) {
            Ok(()) => return,
            Err(TrySendError::Full(job)) => (job, "async queue full, delivery dropped"),
            Err(TrySendError::Closed(job)) => (job, "event bus closed, delivery dropped"),
        };

        shared.dead_letter(&job.envelope, job.handler.name(), reason.to_string());
        shared.finish();
    }
}

async fn dispatch<E: DomainEvent>(
    mut receiver: mpsc::Receiver<Job<E>>,
    shared: Arc<Shared>,
    workers: usize,
) {
    let permits = Arc::new(Semaphore::new(workers));

    while let Some(job) = receiver.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            shared.dead_letter(&job.envelope, job.handler.name(), "worker pool closed".to_string());
            shared.finish();
            break;
        };

        let shared = shared.clone();
        tokio::spawn(async move {
            let _permit = permit;
            run_job(&shared, job).await;
            shared.finish();
        });
    }

    tracing::debug!("Event bus dispatcher stopped");
}

async fn run_job<E: DomainEvent>(shared: &Shared, job: Job<E>) {
    let handler = job.handler.name();
    let outcome = AssertUnwindSafe(job.handler.handle(&job.envelope))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            tracing::debug!(
                event_id = %job.envelope.event_id,
                event_type = %job.envelope.event_type,
                handler = handler,
                "Async delivery completed"
            );
        }
        Ok(Err(error)) => shared.dead_letter(&job.envelope, handler, format!("{:#}", error)),
        Err(panic) => shared.dead_letter(&job.envelope, handler, panic_message(panic)),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", message)
    } else {
        "handler panicked".to_string()
    }
}
