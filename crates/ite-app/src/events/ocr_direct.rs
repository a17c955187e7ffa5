use ite_types::{DirectReply, ImagePayload};
use tokio::sync::oneshot;

use crate::context::PipelineContext;
use crate::events::{extract, with_timeout};

/// Direct pipeline: OCR only, answered on the caller's reply channel
pub async fn handle_ocr_direct(
    ctx: PipelineContext,
    image: ImagePayload,
    reply: oneshot::Sender<DirectReply>,
) {
    tracing::info!("Direct extraction ({} bytes)", image.len());

    let pipeline = extract(ctx.extractor.as_ref(), image);
    let outcome = with_timeout(ctx.pipeline.timeout(), pipeline).await;

    if reply.send(DirectReply::from(outcome)).is_err() {
        tracing::debug!("Direct caller went away before the reply");
    }
}
