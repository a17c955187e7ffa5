use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use ite_config::Config;
use ite_config::pipeline::PipelineConfig;
use ite_io::{CaptureError, StaticCapturer, SurfaceCapturer};
use ite_ocr::{OcrError, TextExtractor};
use ite_types::{ImagePayload, SurfaceId, SurfaceMessage};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::context::PipelineContext;
use crate::registry::SurfaceRouter;

mod pipeline_tests;

pub(crate) const WAIT: Duration = Duration::from_secs(2);

/// A 400x300 "screen" whose pixels encode their own coordinates
pub(crate) fn screen() -> ImagePayload {
    let image = RgbaImage::from_fn(400, 300, |x, y| Rgba([x as u8, y as u8, 0, 255]));
    ite_image::payload_from_rgba(&image).unwrap()
}

pub(crate) fn dimensions(payload: &ImagePayload) -> (u32, u32) {
    ite_image::decode_payload(payload).unwrap().dimensions()
}

pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.presenter.status_dismiss_ms = 50;
    config.presenter.copy_feedback_ms = 50;
    config
}

/// Scripted OCR service
pub(crate) struct FakeExtractor {
    result: Result<Option<String>, OcrError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn text(text: &str) -> Self {
        Self::with_result(Ok(Some(text.to_string())))
    }

    pub fn empty() -> Self {
        Self::with_result(Ok(None))
    }

    pub fn failing(error: OcrError) -> Self {
        Self::with_result(Err(error))
    }

    pub fn with_result(result: Result<Option<String>, OcrError>) -> Self {
        Self {
            result,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract_text(&self, _image: &ImagePayload) -> Result<Option<String>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }

    fn provider(&self) -> &str {
        "fake"
    }
}

/// Reads back the size of the image it was given, after a size-dependent delay
pub(crate) struct SizeExtractor;

#[async_trait]
impl TextExtractor for SizeExtractor {
    async fn extract_text(&self, image: &ImagePayload) -> Result<Option<String>, OcrError> {
        let (width, height) = dimensions(image);
        // Larger crops finish later, so requests complete out of order
        tokio::time::sleep(Duration::from_millis(u64::from(width % 7) * 5)).await;
        Ok(Some(format!("{}x{}", width, height)))
    }

    fn provider(&self) -> &str {
        "size"
    }
}

pub(crate) struct FailingCapturer;

#[async_trait]
impl SurfaceCapturer for FailingCapturer {
    async fn capture_visible(&self, _surface: SurfaceId) -> Result<ImagePayload, CaptureError> {
        Err(CaptureError::Failed("permission denied".to_string()))
    }
}

/// Router that records every delivery
pub(crate) struct RecordingRouter {
    tx: AsyncSender<(SurfaceId, SurfaceMessage)>,
    rx: AsyncReceiver<(SurfaceId, SurfaceMessage)>,
    closed: Mutex<HashMap<SurfaceId, CancellationToken>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        let (tx, rx) = kanal::unbounded_async();
        Self {
            tx,
            rx,
            closed: Mutex::new(HashMap::new()),
        }
    }

    pub fn close(&self, surface: SurfaceId) {
        let mut closed = self.closed.lock().unwrap();
        closed.entry(surface).or_default().cancel();
    }

    fn is_closed(&self, surface: SurfaceId) -> bool {
        let closed = self.closed.lock().unwrap();
        closed.get(&surface).is_some_and(|t| t.is_cancelled())
    }

    /// Everything delivered so far
    pub fn delivered(&self) -> Vec<(SurfaceId, SurfaceMessage)> {
        let mut out = Vec::new();
        while let Ok(Some(item)) = self.rx.try_recv() {
            out.push(item);
        }
        out
    }
}

#[async_trait]
impl SurfaceRouter for RecordingRouter {
    async fn route(&self, surface: SurfaceId, message: SurfaceMessage) -> bool {
        if self.is_closed(surface) {
            return false;
        }
        self.tx.send((surface, message)).await.is_ok()
    }

    async fn closed_token(&self, surface: SurfaceId) -> Option<CancellationToken> {
        let mut closed = self.closed.lock().unwrap();
        Some(closed.entry(surface).or_default().clone())
    }
}

pub(crate) fn context(
    capturer: Arc<dyn SurfaceCapturer>,
    extractor: Arc<dyn TextExtractor>,
    router: Arc<RecordingRouter>,
    pipeline: PipelineConfig,
) -> PipelineContext {
    PipelineContext::new(capturer, extractor, router, pipeline)
}

pub(crate) fn static_capturer() -> Arc<dyn SurfaceCapturer> {
    Arc::new(StaticCapturer::new(screen()))
}
