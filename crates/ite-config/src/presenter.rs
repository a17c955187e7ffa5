use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_preview_chars() -> usize {
    60
}

fn default_status_dismiss_ms() -> u64 {
    2000
}

fn default_copy_feedback_ms() -> u64 {
    2000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PresenterConfig {
    /// Characters shown in a notification before truncation
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_status_dismiss_ms")]
    pub status_dismiss_ms: u64,
    #[serde(default = "default_copy_feedback_ms")]
    pub copy_feedback_ms: u64,
}

impl PresenterConfig {
    pub fn status_dismiss(&self) -> Duration {
        Duration::from_millis(self.status_dismiss_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            status_dismiss_ms: default_status_dismiss_ms(),
            copy_feedback_ms: default_copy_feedback_ms(),
        }
    }
}
