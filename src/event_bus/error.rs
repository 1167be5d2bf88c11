#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Handler {handler} failed on {event_type}: {source}")]
    HandlerFailed {
        handler: &'static str,
        event_type: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
