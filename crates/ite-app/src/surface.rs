use std::sync::Arc;
use std::time::Duration;

use ite_config::Config;
use ite_io::ClipboardSink;
use ite_presenter::{CopyTicket, PagePresenter, PageView};
use ite_selection::{OverlayLayer, PointerOutcome, SelectionController};
use ite_types::{
    CaptureArea, ExtractionOutcome, ImagePayload, Point, RuntimeMessage, SurfaceId, SurfaceMessage,
};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::registry::SurfaceRegistry;
use crate::runtime::RuntimeRequest;

/// User input arriving at a page surface
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Escape,
    CloseNotification,
    OpenDetails,
    CloseDetails,
    CopyText,
    /// Fired `copy_feedback_ms` after the copy that issued the ticket
    ResetCopyFeedback(CopyTicket),
    /// Page zoom or monitor changed
    SetDevicePixelRatio(f64),
    /// An image the page wants read, e.g. one the user dropped on it
    ExtractImage(ImagePayload),
}

/// What the surface currently shows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceView {
    pub selecting: bool,
    pub page: PageView,
}

/// Connection to a running page controller
#[derive(Clone)]
pub struct SurfaceHandle {
    id: SurfaceId,
    messages: AsyncSender<SurfaceMessage>,
    events: AsyncSender<PageEvent>,
    view: watch::Receiver<SurfaceView>,
}

impl SurfaceHandle {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// `false` once the controller has stopped
    pub async fn send(&self, message: SurfaceMessage) -> bool {
        self.messages.send(message).await.is_ok()
    }

    pub async fn event(&self, event: PageEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    pub fn view(&self) -> SurfaceView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SurfaceView> {
        self.view.clone()
    }

    /// Wait until a view satisfies `done`; `None` if the controller stopped first
    pub async fn wait_for<F>(&self, mut done: F) -> Option<SurfaceView>
    where
        F: FnMut(&SurfaceView) -> bool,
    {
        let mut view = self.view.clone();
        let result = view.wait_for(|v| done(v)).await;
        result.ok().map(|v| v.clone())
    }
}

/// Spawns page controllers into registered surfaces
#[derive(Clone)]
pub struct SurfaceHost {
    registry: Arc<SurfaceRegistry>,
    runtime_tx: AsyncSender<RuntimeRequest>,
    config: Arc<Config>,
    clipboard: Arc<dyn ClipboardSink>,
}

impl SurfaceHost {
    pub fn new(
        registry: Arc<SurfaceRegistry>,
        runtime_tx: AsyncSender<RuntimeRequest>,
        config: Arc<Config>,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Self {
        Self {
            registry,
            runtime_tx,
            config,
            clipboard,
        }
    }

    pub fn registry(&self) -> &Arc<SurfaceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Make sure `id` runs a page controller.
    ///
    /// Injecting twice returns the first controller. `None` if the surface is not open.
    pub async fn inject_controller(&self, id: SurfaceId) -> Option<SurfaceHandle> {
        self.registry
            .controller_or_insert_with(id, |closed| self.spawn_controller(id, closed))
            .await
    }

    fn spawn_controller(&self, id: SurfaceId, closed: CancellationToken) -> SurfaceHandle {
        let capacity = self.config.channel_capacity;
        let (messages_tx, messages_rx) = kanal::bounded_async(capacity);
        let (events_tx, events_rx) = kanal::bounded_async(capacity);
        let (view_tx, view_rx) = watch::channel(SurfaceView::default());

        let selection = &self.config.selection;
        let surface = PageSurface {
            id,
            selection: SelectionController::new(
                OverlayLayer::new(selection.device_pixel_ratio),
                selection.min_size,
            ),
            presenter: PagePresenter::new(&self.config.presenter),
            runtime_tx: self.runtime_tx.clone(),
            clipboard: self.clipboard.clone(),
            own_events: events_tx.clone(),
            copy_feedback: self.config.presenter.copy_feedback(),
            view_tx,
        };

        let span = tracing::info_span!("surface", surface = %id);
        tokio::spawn(surface.run(messages_rx, events_rx, closed).instrument(span));
        tracing::info!("Injected controller into {}", id);

        SurfaceHandle {
            id,
            messages: messages_tx,
            events: events_tx,
            view: view_rx,
        }
    }
}

/// Page controller: selection gestures in, rendered outcomes out
struct PageSurface {
    id: SurfaceId,
    selection: SelectionController<OverlayLayer>,
    presenter: PagePresenter,
    runtime_tx: AsyncSender<RuntimeRequest>,
    clipboard: Arc<dyn ClipboardSink>,
    /// Lets delayed UI work come back through the event queue
    own_events: AsyncSender<PageEvent>,
    copy_feedback: Duration,
    view_tx: watch::Sender<SurfaceView>,
}

impl PageSurface {
    async fn run(
        mut self,
        messages: AsyncReceiver<SurfaceMessage>,
        events: AsyncReceiver<PageEvent>,
        closed: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = closed.cancelled() => {
                    tracing::debug!("Surface closed, controller stopping");
                    break;
                }
                message = messages.recv() => match message {
                    Ok(message) => self.on_message(message),
                    Err(_) => break,
                },
                event = events.recv() => match event {
                    Ok(event) => self.on_event(event).await,
                    Err(_) => break,
                },
            }

            self.publish();
        }
    }

    fn on_message(&mut self, message: SurfaceMessage) {
        tracing::debug!("Received {}", message.action());

        match message {
            SurfaceMessage::StartSelection => {
                self.selection.start();
            }
            outcome => {
                if let Some(outcome) = outcome.into_outcome() {
                    self.presenter.render(outcome);
                }
            }
        }
    }

    async fn on_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::PointerDown(at) => {
                self.selection.pointer_down(at);
            }
            PageEvent::PointerMove(at) => {
                self.selection.pointer_move(at);
            }
            PageEvent::PointerUp => {
                if let PointerOutcome::Submitted(area) = self.selection.pointer_up() {
                    self.submit(area).await;
                }
            }
            PageEvent::Escape => {
                self.selection.cancel();
            }
            PageEvent::CloseNotification => self.presenter.close_notification(),
            PageEvent::OpenDetails => {
                self.presenter.open_details();
            }
            PageEvent::CloseDetails => self.presenter.close_details(),
            PageEvent::CopyText => self.copy_text().await,
            PageEvent::ResetCopyFeedback(ticket) => {
                self.presenter.reset_copy_feedback(ticket);
            }
            PageEvent::SetDevicePixelRatio(ratio) => {
                self.selection.host_mut().set_device_pixel_ratio(ratio);
            }
            PageEvent::ExtractImage(image) => {
                let message = RuntimeMessage::ExtractFromImage {
                    image_data: image,
                    tab_id: self.id,
                };
                self.send_runtime(message).await;
            }
        }
    }

    async fn submit(&mut self, area: CaptureArea) {
        tracing::info!("Submitting area {:?}", area);
        self.send_runtime(RuntimeMessage::CaptureAndExtract { area }).await;
    }

    /// Hand a request to the orchestrator and show the in-progress indicator
    async fn send_runtime(&mut self, message: RuntimeMessage) {
        let action = message.action();
        let request = RuntimeRequest::from_surface(self.id, message);

        if self.runtime_tx.send(request).await.is_err() {
            tracing::error!("Orchestrator unreachable, {} not sent", action);
            self.presenter.render(ExtractionOutcome::failure(
                "Extraction service is not running",
                None,
            ));
            return;
        }

        self.presenter.show_loading();
    }

    async fn copy_text(&mut self) {
        match self.presenter.copy_text(self.clipboard.as_ref()).await {
            Ok(Some(ticket)) => {
                let events = self.own_events.clone();
                let delay = self.copy_feedback;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(PageEvent::ResetCopyFeedback(ticket)).await;
                });
            }
            Ok(None) => tracing::debug!("Nothing to copy"),
            Err(e) => tracing::warn!("Copy failed: {}", e),
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(SurfaceView {
            selecting: self.selection.is_selecting(),
            page: self.presenter.view().clone(),
        });
    }
}
