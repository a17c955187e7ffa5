use std::env;

use serde::{Deserialize, Serialize};

fn default_min_size() -> f64 {
    10.0
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    /// Smallest accepted selection edge, in CSS pixels
    #[serde(default = "default_min_size")]
    pub min_size: f64,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
}

impl SelectionConfig {
    pub fn new() -> Self {
        let device_pixel_ratio = env::var("ITE_DEVICE_PIXEL_RATIO")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_device_pixel_ratio);

        Self {
            min_size: default_min_size(),
            device_pixel_ratio,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            device_pixel_ratio: default_device_pixel_ratio(),
        }
    }
}
