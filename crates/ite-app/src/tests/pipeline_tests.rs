use std::sync::Arc;
use std::time::Duration;

use ite_config::pipeline::PipelineConfig;
use ite_ocr::OcrError;
use ite_types::{CaptureArea, DirectReply, RuntimeMessage, SurfaceId, SurfaceMessage};
use serde_json::json;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::events::{dispatch, event_loop};
use crate::runtime::RuntimeRequest;

fn region(surface: u32, area: CaptureArea) -> RuntimeRequest {
    RuntimeRequest::from_surface(
        SurfaceId(surface),
        RuntimeMessage::CaptureAndExtract { area },
    )
}

async fn run(ctx: &crate::context::PipelineContext, request: RuntimeRequest) {
    let handle = dispatch(ctx, request).expect("request should start a pipeline");
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_region_pipeline_delivers_exactly_one_result() {
    let router = Arc::new(RecordingRouter::new());
    let extractor = Arc::new(FakeExtractor::text("Hello"));
    let ctx = context(
        static_capturer(),
        extractor.clone(),
        router.clone(),
        PipelineConfig::default(),
    );

    run(&ctx, region(1, CaptureArea::new(20.0, 40.0, 200.0, 100.0))).await;

    let delivered = router.delivered();
    assert_eq!(delivered.len(), 1);
    let (surface, message) = &delivered[0];
    assert_eq!(*surface, SurfaceId(1));
    match message {
        SurfaceMessage::ShowResult { text, debug_image } => {
            assert_eq!(text, "Hello");
            assert_eq!(dimensions(debug_image.as_ref().unwrap()), (200, 100));
        }
        other => panic!("Expected SHOW_RESULT, got {:?}", other),
    }
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn test_crop_failure_skips_ocr() {
    let router = Arc::new(RecordingRouter::new());
    let extractor = Arc::new(FakeExtractor::text("Hello"));
    let ctx = context(
        static_capturer(),
        extractor.clone(),
        router.clone(),
        PipelineConfig::default(),
    );

    run(&ctx, region(1, CaptureArea::new(10.0, 10.0, 0.0, 50.0))).await;

    let delivered = router.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0].1,
        SurfaceMessage::ShowError {
            message: "Invalid selection area".into(),
            debug_image: None,
        }
    );
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_capture_failure_is_reported() {
    let router = Arc::new(RecordingRouter::new());
    let extractor = Arc::new(FakeExtractor::text("Hello"));
    let ctx = context(
        Arc::new(FailingCapturer),
        extractor.clone(),
        router.clone(),
        PipelineConfig::default(),
    );

    run(&ctx, region(3, CaptureArea::new(0.0, 0.0, 50.0, 50.0))).await;

    let delivered = router.delivered();
    assert_eq!(delivered.len(), 1);
    match &delivered[0].1 {
        SurfaceMessage::ShowError {
            message,
            debug_image,
        } => {
            assert!(message.contains("permission denied"));
            assert!(debug_image.is_none());
        }
        other => panic!("Expected SHOW_ERROR, got {:?}", other),
    }
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_ocr_failure_keeps_cropped_image() {
    let router = Arc::new(RecordingRouter::new());
    let ctx = context(
        static_capturer(),
        Arc::new(FakeExtractor::failing(OcrError::service(None))),
        router.clone(),
        PipelineConfig::default(),
    );

    run(&ctx, region(1, CaptureArea::new(0.0, 0.0, 64.0, 32.0))).await;

    match &router.delivered()[0].1 {
        SurfaceMessage::ShowError {
            message,
            debug_image,
        } => {
            assert_eq!(message, "OCR API Error");
            assert_eq!(dimensions(debug_image.as_ref().unwrap()), (64, 32));
        }
        other => panic!("Expected SHOW_ERROR, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_text_is_empty_not_error() {
    let router = Arc::new(RecordingRouter::new());
    let ctx = context(
        static_capturer(),
        Arc::new(FakeExtractor::empty()),
        router.clone(),
        PipelineConfig::default(),
    );

    run(&ctx, region(1, CaptureArea::new(0.0, 0.0, 64.0, 32.0))).await;

    let delivered = router.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(matches!(
        delivered[0].1,
        SurfaceMessage::ShowEmpty {
            debug_image: Some(_)
        }
    ));
}

#[tokio::test]
async fn test_image_pipeline_routes_to_named_surface() {
    let router = Arc::new(RecordingRouter::new());
    let image = screen();
    let ctx = context(
        Arc::new(FailingCapturer),
        Arc::new(FakeExtractor::text("from image")),
        router.clone(),
        PipelineConfig::default(),
    );

    let request = RuntimeRequest::detached(RuntimeMessage::ExtractFromImage {
        image_data: image.clone(),
        tab_id: SurfaceId(9),
    });
    run(&ctx, request).await;

    assert_eq!(
        router.delivered(),
        vec![(
            SurfaceId(9),
            SurfaceMessage::ShowResult {
                text: "from image".into(),
                debug_image: Some(image),
            }
        )]
    );
}

#[tokio::test]
async fn test_direct_pipeline_replies_null_text() {
    let router = Arc::new(RecordingRouter::new());
    let ctx = context(
        Arc::new(FailingCapturer),
        Arc::new(FakeExtractor::empty()),
        router.clone(),
        PipelineConfig::default(),
    );

    let (request, reply) = RuntimeRequest::direct(screen());
    run(&ctx, request).await;

    let reply = reply.await.unwrap();
    assert_eq!(reply, DirectReply::Extracted { text: None });
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        json!({ "success": true, "text": null })
    );
    assert!(router.delivered().is_empty());
}

#[tokio::test]
async fn test_direct_pipeline_reports_transport_error() {
    let ctx = context(
        Arc::new(FailingCapturer),
        Arc::new(FakeExtractor::failing(OcrError::transport("HTTP 503"))),
        Arc::new(RecordingRouter::new()),
        PipelineConfig::default(),
    );

    let (request, reply) = RuntimeRequest::direct(screen());
    run(&ctx, request).await;

    assert_eq!(
        reply.await.unwrap(),
        DirectReply::Failed {
            error: "OCR Network/API Error: HTTP 503".into()
        }
    );
}

#[tokio::test]
async fn test_requests_without_destination_are_not_started() {
    let ctx = context(
        static_capturer(),
        Arc::new(FakeExtractor::text("Hello")),
        Arc::new(RecordingRouter::new()),
        PipelineConfig::default(),
    );

    let orphan_region = RuntimeRequest::detached(RuntimeMessage::CaptureAndExtract {
        area: CaptureArea::new(0.0, 0.0, 20.0, 20.0),
    });
    assert!(dispatch(&ctx, orphan_region).is_none());

    let orphan_direct = RuntimeRequest::detached(RuntimeMessage::OcrDirect {
        image_data: screen(),
    });
    assert!(dispatch(&ctx, orphan_direct).is_none());
}

#[tokio::test]
async fn test_concurrent_surfaces_never_cross_deliver() {
    let router = Arc::new(RecordingRouter::new());
    let ctx = context(
        static_capturer(),
        Arc::new(SizeExtractor),
        router.clone(),
        PipelineConfig::default(),
    );

    let (tx, rx) = kanal::bounded_async(64);
    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(event_loop(ctx, rx, cancel.clone()));

    for surface in 1..=12u32 {
        let area = CaptureArea::new(0.0, 0.0, f64::from(20 + surface), f64::from(10 + surface));
        tx.send(region(surface, area)).await.unwrap();
    }

    let mut delivered = Vec::new();
    timeout(WAIT, async {
        while delivered.len() < 12 {
            delivered.extend(router.delivered());
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("every surface should get its outcome");

    for (surface, message) in delivered {
        let expected = format!("{}x{}", 20 + surface.0, 10 + surface.0);
        match message {
            SurfaceMessage::ShowResult { text, .. } => assert_eq!(text, expected),
            other => panic!("Unexpected {:?} for {}", other, surface),
        }
    }

    cancel.cancel();
    timeout(WAIT, loop_handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_timeout_delivers_one_failure() {
    let router = Arc::new(RecordingRouter::new());
    let pipeline = PipelineConfig {
        timeout_ms: Some(50),
        cancel_on_surface_close: false,
    };
    let ctx = context(
        static_capturer(),
        Arc::new(FakeExtractor::text("late").slow(Duration::from_secs(5))),
        router.clone(),
        pipeline,
    );

    run(&ctx, region(1, CaptureArea::new(0.0, 0.0, 50.0, 50.0))).await;

    assert_eq!(
        router.delivered(),
        vec![(
            SurfaceId(1),
            SurfaceMessage::ShowError {
                message: "Extraction timed out after 50 ms".into(),
                debug_image: None,
            }
        )]
    );
}

#[tokio::test]
async fn test_closing_surface_cancels_pipeline() {
    let router = Arc::new(RecordingRouter::new());
    let pipeline = PipelineConfig {
        timeout_ms: None,
        cancel_on_surface_close: true,
    };
    let extractor = Arc::new(FakeExtractor::text("late").slow(Duration::from_secs(5)));
    let ctx = context(static_capturer(), extractor.clone(), router.clone(), pipeline);

    let handle = dispatch(&ctx, region(4, CaptureArea::new(0.0, 0.0, 50.0, 50.0))).unwrap();
    timeout(WAIT, async {
        while extractor.calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    router.close(SurfaceId(4));

    timeout(WAIT, handle).await.unwrap().unwrap();
    assert!(router.delivered().is_empty());
}

#[tokio::test]
async fn test_event_loop_exits_on_shutdown() {
    let ctx = context(
        static_capturer(),
        Arc::new(FakeExtractor::empty()),
        Arc::new(RecordingRouter::new()),
        PipelineConfig::default(),
    );
    let (_tx, rx) = kanal::bounded_async::<RuntimeRequest>(1);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(event_loop(ctx, rx, cancel.clone()));
    cancel.cancel();

    assert!(timeout(WAIT, handle).await.unwrap().unwrap().is_ok());
}
