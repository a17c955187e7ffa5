use std::sync::Arc;

use ite_config::pipeline::PipelineConfig;
use ite_io::SurfaceCapturer;
use ite_ocr::TextExtractor;

use crate::registry::SurfaceRouter;

/// Everything a pipeline task needs, cloned into each spawned request
#[derive(Clone)]
pub struct PipelineContext {
    pub capturer: Arc<dyn SurfaceCapturer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub router: Arc<dyn SurfaceRouter>,
    pub pipeline: PipelineConfig,
}

impl PipelineContext {
    pub fn new(
        capturer: Arc<dyn SurfaceCapturer>,
        extractor: Arc<dyn TextExtractor>,
        router: Arc<dyn SurfaceRouter>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            capturer,
            extractor,
            router,
            pipeline,
        }
    }
}
