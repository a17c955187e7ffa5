use ite_config::presenter::PresenterConfig;
use ite_io::{ClipboardError, ClipboardSink};
use ite_types::{ExtractionOutcome, ImagePayload};

use crate::preview;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Empty,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
}

/// Identifies one "Copied!" feedback so a late reset cannot clear a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTicket(u64);

impl CopyState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Copy Text",
            Self::Copied => "Copied!",
        }
    }
}

/// The small card shown after a pipeline finishes
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub preview: String,
    /// Full text, or the error message
    pub text: String,
    pub image: Option<ImagePayload>,
    pub copy: CopyState,
}

impl Notification {
    pub fn copyable(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: &'static str,
    pub text: String,
    /// The analyzed area
    pub image: Option<ImagePayload>,
    pub copyable: bool,
    pub copy: CopyState,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageView {
    pub loading: bool,
    pub notification: Option<Notification>,
    pub detail: Option<DetailView>,
}

/// Result presenter embedded in a page surface.
///
/// Holds at most one notification; rendering a new outcome replaces it.
pub struct PagePresenter {
    view: PageView,
    preview_chars: usize,
    copy_ticket: u64,
}

impl PagePresenter {
    pub fn new(config: &PresenterConfig) -> Self {
        Self {
            view: PageView::default(),
            preview_chars: config.preview_chars,
            copy_ticket: 0,
        }
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn show_loading(&mut self) {
        self.view.loading = true;
    }

    pub fn render(&mut self, outcome: ExtractionOutcome) -> &Notification {
        self.view.loading = false;

        let (kind, title, text, image) = match outcome {
            ExtractionOutcome::Success { text, image } => {
                (NotificationKind::Success, "Text Extracted", text, image)
            }
            ExtractionOutcome::Empty { image } => (
                NotificationKind::Empty,
                "No Text Found",
                "No text found".to_string(),
                image,
            ),
            ExtractionOutcome::Failure { message, image } => {
                (NotificationKind::Error, "Extraction Failed", message, image)
            }
        };

        tracing::debug!("Rendering {:?} notification", kind);
        self.copy_ticket += 1;
        self.view.notification.insert(Notification {
            kind,
            title,
            preview: preview(&text, self.preview_chars),
            text,
            image,
            copy: CopyState::Idle,
        })
    }

    pub fn close_notification(&mut self) {
        self.view.notification = None;
    }

    /// Swap the notification for its detail view
    pub fn open_details(&mut self) -> Option<&DetailView> {
        let notification = self.view.notification.take()?;
        let title = match notification.kind {
            NotificationKind::Error => "Error Details",
            _ => "Extraction Details",
        };
        self.copy_ticket += 1;

        Some(self.view.detail.insert(DetailView {
            title,
            copyable: notification.copyable(),
            text: notification.text,
            image: notification.image,
            copy: CopyState::Idle,
        }))
    }

    pub fn close_details(&mut self) {
        self.view.detail = None;
    }

    /// Copy the text shown in the detail view, or else the notification's.
    ///
    /// Returns `Ok(None)` when nothing copyable is on screen. The ticket is
    /// what [`reset_copy_feedback`](Self::reset_copy_feedback) needs later.
    pub async fn copy_text(
        &mut self,
        sink: &dyn ClipboardSink,
    ) -> Result<Option<CopyTicket>, ClipboardError> {
        let text = if let Some(detail) = self.view.detail.as_ref() {
            detail.copyable.then(|| detail.text.clone())
        } else {
            self.view
                .notification
                .as_ref()
                .filter(|n| n.copyable())
                .map(|n| n.text.clone())
        };

        let Some(text) = text else {
            return Ok(None);
        };

        sink.write_text(&text).await?;
        self.copy_ticket += 1;
        self.set_copy_state(CopyState::Copied);
        Ok(Some(CopyTicket(self.copy_ticket)))
    }

    /// Revert the "Copied!" feedback, unless a newer copy or outcome replaced it
    pub fn reset_copy_feedback(&mut self, ticket: CopyTicket) -> bool {
        if ticket.0 != self.copy_ticket {
            tracing::debug!("Stale copy feedback reset ignored");
            return false;
        }
        self.set_copy_state(CopyState::Idle);
        true
    }

    fn set_copy_state(&mut self, state: CopyState) {
        if let Some(detail) = self.view.detail.as_mut() {
            detail.copy = state;
        } else if let Some(notification) = self.view.notification.as_mut() {
            notification.copy = state;
        }
    }
}
