use serde::Deserialize;
use std::time::Duration;

/// Runtime knobs for the sync layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for any single store call
    pub request_timeout_ms: u64,
    /// Upper bound for a summarization call
    pub summary_timeout_ms: u64,
    /// Buffered events per subscriber before the oldest are dropped
    pub event_capacity: usize,
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_millis(self.summary_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            summary_timeout_ms: 30_000,
            event_capacity: 64,
        }
    }
}
