use std::env;

use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://api.ocr.space/parse/image".to_string()
}

fn default_api_key() -> String {
    "helloworld".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_scale() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Credential token sent as the `apikey` form field
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub overlay: bool,
    #[serde(default = "default_scale")]
    pub scale: bool,
    /// HTTP timeout; `None` keeps the transport default (no timeout)
    pub timeout_ms: Option<u64>,
}

impl OcrConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        Self {
            api_url: env::var("ITE_OCR_URL").unwrap_or(defaults.api_url),
            api_key: env::var("ITE_OCR_API_KEY").unwrap_or(defaults.api_key),
            language: env::var("ITE_OCR_LANGUAGE").unwrap_or(defaults.language),
            timeout_ms: env::var("ITE_OCR_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            ..defaults
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: default_api_key(),
            language: default_language(),
            overlay: false,
            scale: default_scale(),
            timeout_ms: None,
        }
    }
}
