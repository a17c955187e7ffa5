use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use ite_ocr::TextExtractor;
use ite_types::{
    ExtractionOutcome, ImagePayload, PipelineRequest, RequestId, RuntimeMessage, SurfaceId,
    SurfaceMessage,
};
use kanal::AsyncReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::context::PipelineContext;
use crate::runtime::RuntimeRequest;

pub mod capture_and_extract;
pub mod extract_from_image;
pub mod ocr_direct;

use capture_and_extract::handle_capture_and_extract;
use extract_from_image::handle_extract_from_image;
use ocr_direct::handle_ocr_direct;

/// Orchestrator loop: one spawned task per request, nothing shared between them
pub async fn event_loop(
    ctx: PipelineContext,
    runtime_rx: AsyncReceiver<RuntimeRequest>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("Orchestrator listening for runtime messages");

    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Orchestrator shutting down");
                return Ok(());
            }
            request = runtime_rx.recv() => request.context("runtime channel closed")?,
        };

        dispatch(&ctx, request);
    }
}

/// Start the pipeline for one request.
///
/// Returns `None` when the request has nowhere to deliver its outcome.
pub fn dispatch(ctx: &PipelineContext, request: RuntimeRequest) -> Option<JoinHandle<()>> {
    let RuntimeRequest {
        message,
        sender,
        reply,
    } = request;
    tracing::debug!("Received {} from {:?}", message.action(), sender);

    match message {
        RuntimeMessage::CaptureAndExtract { area } => {
            let Some(surface) = sender else {
                tracing::warn!("CAPTURE_AND_EXTRACT without an originating surface, ignoring");
                return None;
            };
            let request = PipelineRequest::region(surface, area);
            let span = pipeline_span(&request);
            Some(tokio::spawn(
                handle_capture_and_extract(ctx.clone(), request).instrument(span),
            ))
        }
        RuntimeMessage::ExtractFromImage {
            image_data,
            tab_id,
        } => {
            let request = PipelineRequest::image(tab_id, image_data);
            let span = pipeline_span(&request);
            Some(tokio::spawn(
                handle_extract_from_image(ctx.clone(), request).instrument(span),
            ))
        }
        RuntimeMessage::OcrDirect { image_data } => {
            let Some(reply) = reply else {
                tracing::warn!("OCR_DIRECT without a reply channel, ignoring");
                return None;
            };
            let span = tracing::info_span!("direct", request_id = %RequestId::new());
            Some(tokio::spawn(
                handle_ocr_direct(ctx.clone(), image_data, reply).instrument(span),
            ))
        }
    }
}

fn pipeline_span(request: &PipelineRequest) -> tracing::Span {
    tracing::info_span!("pipeline", request_id = %request.id, surface = %request.surface)
}

/// OCR stage shared by every pipeline; the analyzed image always travels with the outcome
pub(crate) async fn extract(extractor: &dyn TextExtractor, image: ImagePayload) -> ExtractionOutcome {
    match extractor.extract_text(&image).await {
        Ok(text) => {
            tracing::debug!(
                "{} returned {} chars",
                extractor.provider(),
                text.as_deref().map_or(0, str::len)
            );
            ExtractionOutcome::from_text(text, Some(image))
        }
        Err(e) => {
            tracing::error!("{} failed: {}", extractor.provider(), e);
            ExtractionOutcome::failure(e.to_string(), Some(image))
        }
    }
}

/// Bound a pipeline by the configured timeout, if any
pub(crate) async fn with_timeout<F>(limit: Option<Duration>, pipeline: F) -> ExtractionOutcome
where
    F: Future<Output = ExtractionOutcome>,
{
    let Some(limit) = limit else {
        return pipeline.await;
    };

    match tokio::time::timeout(limit, pipeline).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("Pipeline timed out after {:?}", limit);
            ExtractionOutcome::failure(
                format!("Extraction timed out after {} ms", limit.as_millis()),
                None,
            )
        }
    }
}

/// Run a pipeline whose outcome is routed to `surface`, then deliver it
pub(crate) async fn run_routed<F>(ctx: &PipelineContext, surface: SurfaceId, pipeline: F)
where
    F: Future<Output = ExtractionOutcome>,
{
    let limit = ctx.pipeline.timeout();

    let outcome = if ctx.pipeline.cancel_on_surface_close {
        let Some(closed) = ctx.router.closed_token(surface).await else {
            tracing::debug!("{} already closed, not starting", surface);
            return;
        };
        tokio::select! {
            _ = closed.cancelled() => {
                tracing::debug!("{} closed, pipeline abandoned", surface);
                return;
            }
            outcome = with_timeout(limit, pipeline) => outcome,
        }
    } else {
        with_timeout(limit, pipeline).await
    };

    deliver(ctx, surface, outcome).await;
}

async fn deliver(ctx: &PipelineContext, surface: SurfaceId, outcome: ExtractionOutcome) {
    let message = SurfaceMessage::from_outcome(outcome);
    let action = message.action();

    if ctx.router.route(surface, message).await {
        tracing::debug!("Delivered {} to {}", action, surface);
    } else {
        tracing::debug!("{} is gone, dropping {}", surface, action);
    }
}
