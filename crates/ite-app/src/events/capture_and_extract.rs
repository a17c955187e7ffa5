use ite_types::{CaptureArea, ExtractionOutcome, PipelineInput, PipelineRequest, SurfaceId};

use crate::context::PipelineContext;
use crate::events::{extract, run_routed};

/// Region pipeline: capture, crop, OCR, then route to the originating surface
pub async fn handle_capture_and_extract(ctx: PipelineContext, request: PipelineRequest) {
    let PipelineInput::Region(area) = request.input else {
        tracing::warn!("Region handler got an image request, ignoring");
        return;
    };

    tracing::info!("Extracting region {:?}", area);
    run_routed(&ctx, request.surface, region_outcome(&ctx, request.surface, area)).await;
}

/// The three stages run strictly in order; the first failure short-circuits.
pub async fn region_outcome(
    ctx: &PipelineContext,
    surface: SurfaceId,
    area: CaptureArea,
) -> ExtractionOutcome {
    let full = match ctx.capturer.capture_visible(surface).await {
        Ok(full) => full,
        Err(e) => {
            tracing::error!("Capture failed: {}", e);
            return ExtractionOutcome::failure(e.to_string(), None);
        }
    };

    let cropped = match tokio::task::spawn_blocking(move || ite_image::crop(&full, area)).await {
        Ok(Ok(cropped)) => cropped,
        Ok(Err(e)) => {
            tracing::error!("Crop failed: {}", e);
            return ExtractionOutcome::failure(e.to_string(), None);
        }
        Err(e) => {
            tracing::error!("Crop task error: {}", e);
            return ExtractionOutcome::failure(format!("Crop failed: {}", e), None);
        }
    };

    extract(ctx.extractor.as_ref(), cropped).await
}
