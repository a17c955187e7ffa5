use std::sync::Arc;

use async_trait::async_trait;
use ite_image::TransformError;
use ite_types::{ImagePayload, SurfaceId};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Screen capture is not available: {0}")]
    Unavailable(String),

    #[error("Failed to capture the visible surface: {0}")]
    Failed(String),

    #[error("Failed to encode capture: {0}")]
    Encode(#[from] TransformError),
}

/// Captures the currently visible pixels of a surface
#[async_trait]
pub trait SurfaceCapturer: Send + Sync {
    async fn capture_visible(&self, surface: SurfaceId) -> Result<ImagePayload, CaptureError>;
}

/// Always returns the same snapshot.
///
/// Used when the "visible surface" is an image on disk, and in tests.
#[derive(Clone)]
pub struct StaticCapturer {
    snapshot: ImagePayload,
}

impl StaticCapturer {
    pub fn new(snapshot: ImagePayload) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SurfaceCapturer for StaticCapturer {
    async fn capture_visible(&self, surface: SurfaceId) -> Result<ImagePayload, CaptureError> {
        tracing::debug!("Serving static snapshot for {}", surface);
        Ok(self.snapshot.clone())
    }
}

/// Captures the primary monitor; every surface maps to the screen it is shown on
#[cfg(feature = "screen-capture")]
#[derive(Clone, Copy, Default)]
pub struct ScreenCapturer;

#[cfg(feature = "screen-capture")]
#[async_trait]
impl SurfaceCapturer for ScreenCapturer {
    async fn capture_visible(&self, surface: SurfaceId) -> Result<ImagePayload, CaptureError> {
        use anyhow::Context;
        use xcap::Monitor;

        tracing::debug!("Capturing primary monitor for {}", surface);

        let image = tokio::task::spawn_blocking(|| -> anyhow::Result<_> {
            let monitors = Monitor::all().context("Failed to get monitors")?;
            let monitor = monitors.into_iter().next().context("No monitor found")?;
            monitor.capture_image().context("Failed to capture screen")
        })
        .await
        .map_err(|e| CaptureError::Failed(e.to_string()))?
        .map_err(|e| CaptureError::Failed(format!("{:#}", e)))?;

        Ok(ite_image::payload_from_rgba(&image)?)
    }
}

#[cfg_attr(feature = "screen-capture", allow(dead_code))]
struct UnavailableCapturer;

#[async_trait]
impl SurfaceCapturer for UnavailableCapturer {
    async fn capture_visible(&self, _surface: SurfaceId) -> Result<ImagePayload, CaptureError> {
        Err(CaptureError::Unavailable(
            "built without the `screen-capture` feature".to_string(),
        ))
    }
}

/// The platform capturer, or one that always reports `Unavailable`
pub fn default_capturer() -> Arc<dyn SurfaceCapturer> {
    #[cfg(feature = "screen-capture")]
    {
        Arc::new(ScreenCapturer)
    }

    #[cfg(not(feature = "screen-capture"))]
    {
        Arc::new(UnavailableCapturer)
    }
}
