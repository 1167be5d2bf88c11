use anyhow::{bail, Context, Result};

/// Tuning for the async side of the event bus
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Max async handlers running at once
    pub workers: usize,
    /// Async deliveries that may wait for a worker before being dead-lettered
    pub queue_capacity: usize,
    /// Dead letters retained for inspection
    pub dead_letter_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
            dead_letter_capacity: 1000,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            workers: parse_usize(&lookup, "MEMBERSHIP_SYNC_WORKERS", defaults.workers)?,
            queue_capacity: parse_usize(
                &lookup,
                "MEMBERSHIP_SYNC_QUEUE_CAPACITY",
                defaults.queue_capacity,
            )?,
            dead_letter_capacity: parse_usize(
                &lookup,
                "MEMBERSHIP_SYNC_DLQ_CAPACITY",
                defaults.dead_letter_capacity,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("MEMBERSHIP_SYNC_WORKERS must be at least 1");
        }
        if self.queue_capacity == 0 {
            bail!("MEMBERSHIP_SYNC_QUEUE_CAPACITY must be at least 1");
        }
        if self.dead_letter_capacity == 0 {
            bail!("MEMBERSHIP_SYNC_DLQ_CAPACITY must be at least 1");
        }
        Ok(())
    }
}

fn parse_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> Result<usize> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a positive integer, got {:?}", key, raw)),
        None => Ok(default),
    }
}
