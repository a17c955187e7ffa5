use ite_types::{PipelineInput, PipelineRequest};

use crate::context::PipelineContext;
use crate::events::{extract, run_routed};

/// Image pipeline: OCR only, routed to the named surface
pub async fn handle_extract_from_image(ctx: PipelineContext, request: PipelineRequest) {
    let PipelineInput::Image(image) = request.input else {
        tracing::warn!("Image handler got a region request, ignoring");
        return;
    };

    tracing::info!("Extracting supplied image ({} bytes)", image.len());
    let pipeline = extract(ctx.extractor.as_ref(), image);
    run_routed(&ctx, request.surface, pipeline).await;
}
