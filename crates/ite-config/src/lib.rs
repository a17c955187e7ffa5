use std::env;

use serde::{Deserialize, Serialize};

use self::ocr::OcrConfig;
use self::pipeline::PipelineConfig;
use self::presenter::PresenterConfig;
use self::selection::SelectionConfig;

pub mod ocr;
pub mod pipeline;
pub mod presenter;
pub mod selection;

fn default_restricted_prefixes() -> Vec<String> {
    ["chrome://", "edge://", "about:"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_channel_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub selection: SelectionConfig,
    pub pipeline: PipelineConfig,
    pub presenter: PresenterConfig,

    /// URL prefixes of surfaces the selection controller may not run on
    #[serde(default = "default_restricted_prefixes")]
    pub restricted_prefixes: Vec<String>,
    /// Bound of every cross-context channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Config {
    /// Build from environment variables, falling back to defaults
    pub fn new() -> Self {
        let channel_capacity = env::var("ITE_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(default_channel_capacity);

        Config {
            ocr: OcrConfig::new(),
            selection: SelectionConfig::new(),
            pipeline: PipelineConfig::new(),
            presenter: PresenterConfig::default(),

            restricted_prefixes: default_restricted_prefixes(),
            channel_capacity,
        }
    }

    pub fn is_restricted(&self, url: &str) -> bool {
        self.restricted_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            selection: SelectionConfig::default(),
            pipeline: PipelineConfig::default(),
            presenter: PresenterConfig::default(),
            restricted_prefixes: default_restricted_prefixes(),
            channel_capacity: default_channel_capacity(),
        }
    }
}
