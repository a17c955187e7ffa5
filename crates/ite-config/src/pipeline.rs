use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Both knobs are off unless set explicitly.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound for a whole pipeline run
    pub timeout_ms: Option<u64>,
    /// Abort an in-flight region pipeline when its surface goes away
    pub cancel_on_surface_close: bool,
}

impl PipelineConfig {
    pub fn new() -> Self {
        let timeout_ms = env::var("ITE_PIPELINE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok());

        let cancel_on_surface_close = env::var("ITE_CANCEL_ON_CLOSE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Self {
            timeout_ms,
            cancel_on_surface_close,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
