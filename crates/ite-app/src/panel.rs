use std::sync::Arc;
use std::time::Duration;

use ite_io::{ClipboardError, ClipboardSink, ClipboardSource};
use ite_presenter::{PanelPresenter, PanelView, StatusTicket};
use ite_types::{DirectReply, ImagePayload, SurfaceId, SurfaceMessage};
use kanal::AsyncSender;
use tokio::sync::Mutex;

use crate::runtime::RuntimeRequest;
use crate::surface::SurfaceHost;

/// Why a panel action could not start.
///
/// The display text is what the panel shows.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("No active tab found.")]
    NoActiveSurface,

    #[error("Cannot crop on system pages.")]
    Restricted { url: String },

    #[error("The page is no longer available.")]
    SurfaceGone(SurfaceId),

    #[error("{0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Extraction service is not running")]
    Unreachable,
}

/// The user panel: starts selections and runs the clipboard shortcut
#[derive(Clone)]
pub struct Panel {
    host: SurfaceHost,
    runtime_tx: AsyncSender<RuntimeRequest>,
    clipboard_source: Arc<dyn ClipboardSource>,
    clipboard_sink: Arc<dyn ClipboardSink>,
    presenter: Arc<Mutex<PanelPresenter>>,
    dismiss_after: Duration,
}

impl Panel {
    pub fn new(
        host: SurfaceHost,
        runtime_tx: AsyncSender<RuntimeRequest>,
        clipboard_source: Arc<dyn ClipboardSource>,
        clipboard_sink: Arc<dyn ClipboardSink>,
    ) -> Self {
        let config = host.config().presenter.clone();
        Self {
            host,
            runtime_tx,
            clipboard_source,
            clipboard_sink,
            presenter: Arc::new(Mutex::new(PanelPresenter::new(&config))),
            dismiss_after: config.status_dismiss(),
        }
    }

    pub async fn view(&self) -> PanelView {
        self.presenter.lock().await.view().clone()
    }

    /// Start a selection on the active surface and close the panel
    pub async fn start_selection(&self) -> Result<SurfaceId, PanelError> {
        self.presenter
            .lock()
            .await
            .show_status("Initializing selection...");

        let result = self.try_start_selection().await;
        let mut presenter = self.presenter.lock().await;
        match &result {
            Ok(id) => {
                tracing::info!("Selection started on {}", id);
                presenter.hide_status();
                presenter.close();
            }
            Err(e) => {
                tracing::warn!("Cannot start selection: {}", e);
                presenter.show_status(e.to_string());
            }
        }
        result
    }

    async fn try_start_selection(&self) -> Result<SurfaceId, PanelError> {
        let (id, url) = self
            .host
            .registry()
            .active()
            .await
            .ok_or(PanelError::NoActiveSurface)?;

        if self.host.config().is_restricted(&url) {
            return Err(PanelError::Restricted { url });
        }

        let handle = self
            .host
            .inject_controller(id)
            .await
            .ok_or(PanelError::SurfaceGone(id))?;

        if !handle.send(SurfaceMessage::StartSelection).await {
            return Err(PanelError::SurfaceGone(id));
        }
        Ok(id)
    }

    /// Read an image from the clipboard and extract its text directly.
    ///
    /// `Ok(None)` when the clipboard holds no image.
    pub async fn extract_clipboard(&self) -> Result<Option<DirectReply>, PanelError> {
        self.presenter.lock().await.show_status("Reading clipboard...");

        let image = match self.clipboard_source.read_image().await {
            Ok(Some(image)) => image,
            Ok(None) => {
                let ticket = self
                    .presenter
                    .lock()
                    .await
                    .show_transient_status("No image found in clipboard.");
                self.schedule_dismiss(ticket);
                return Ok(None);
            }
            Err(e) => {
                tracing::error!("Clipboard read failed: {}", e);
                self.presenter.lock().await.show_error(e.to_string());
                return Err(e.into());
            }
        };

        self.presenter.lock().await.show_status("Processing...");

        let reply = match self.request_direct(image).await {
            Ok(reply) => reply,
            Err(e) => {
                self.presenter.lock().await.show_error(e.to_string());
                return Err(e);
            }
        };

        let mut presenter = self.presenter.lock().await;
        match &reply {
            DirectReply::Extracted { text } => {
                if let Some(ticket) = presenter.show_result(text.clone()) {
                    self.schedule_dismiss(ticket);
                }
            }
            DirectReply::Failed { error } => {
                presenter.show_error(error);
            }
        }

        Ok(Some(reply))
    }

    async fn request_direct(&self, image: ImagePayload) -> Result<DirectReply, PanelError> {
        let (request, reply_rx) = RuntimeRequest::direct(image);
        self.runtime_tx
            .send(request)
            .await
            .map_err(|_| PanelError::Unreachable)?;
        reply_rx.await.map_err(|_| PanelError::Unreachable)
    }

    /// Copy the shown result; `false` when there is nothing to copy or the write failed
    pub async fn copy_text(&self) -> bool {
        let Some(text) = self.presenter.lock().await.result_text().map(str::to_string) else {
            return false;
        };

        let copied = match self.clipboard_sink.write_text(&text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Copy failed: {}", e);
                false
            }
        };

        let message = if copied {
            "Text copied successfully!"
        } else {
            "Failed to copy text"
        };
        self.presenter.lock().await.show_toast(message);
        self.schedule_hide_toast();
        copied
    }

    /// Flag the clipboard action when an image is ready to be read
    pub async fn check_clipboard(&self) -> bool {
        let has_image = match self.clipboard_source.read_image().await {
            Ok(image) => image.is_some(),
            Err(e) => {
                tracing::debug!("Clipboard check failed: {}", e);
                false
            }
        };

        self.presenter.lock().await.set_clipboard_hint(has_image);
        has_image
    }

    fn schedule_dismiss(&self, ticket: StatusTicket) {
        let presenter = self.presenter.clone();
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            presenter.lock().await.dismiss(ticket);
        });
    }

    fn schedule_hide_toast(&self) {
        let presenter = self.presenter.clone();
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            presenter.lock().await.hide_toast();
        });
    }
}
