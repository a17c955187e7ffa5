use std::time::Duration;

use ite_config::presenter::PresenterConfig;

/// Identifies one status message so a late auto-dismiss cannot clear a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    /// Set for informational messages that go away on their own
    pub dismiss_after: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelView {
    pub status: Option<Status>,
    pub result: Option<String>,
    pub result_visible: bool,
    pub toast: Option<String>,
    /// The clipboard currently holds an image
    pub clipboard_hint: bool,
    pub closed: bool,
}

/// Result presenter of the user panel
pub struct PanelPresenter {
    view: PanelView,
    ticket: u64,
    dismiss_after: Duration,
}

impl PanelPresenter {
    pub fn new(config: &PresenterConfig) -> Self {
        Self {
            view: PanelView::default(),
            ticket: 0,
            dismiss_after: config.status_dismiss(),
        }
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn status_message(&self) -> Option<&str> {
        self.view.status.as_ref().map(|s| s.message.as_str())
    }

    pub fn show_status(&mut self, message: impl Into<String>) -> StatusTicket {
        self.set_status(message.into(), None)
    }

    /// Status that should be dismissed after the configured delay
    pub fn show_transient_status(&mut self, message: impl Into<String>) -> StatusTicket {
        self.set_status(message.into(), Some(self.dismiss_after))
    }

    pub fn show_error(&mut self, message: impl AsRef<str>) -> StatusTicket {
        self.show_status(format!("Error: {}", message.as_ref()))
    }

    pub fn hide_status(&mut self) {
        self.view.status = None;
    }

    /// Hide the status only if it is still the one `ticket` refers to
    pub fn dismiss(&mut self, ticket: StatusTicket) -> bool {
        if ticket.0 != self.ticket || self.view.status.is_none() {
            return false;
        }
        self.view.status = None;
        true
    }

    /// Show extracted text; blank text becomes a transient "No text found."
    pub fn show_result(&mut self, text: Option<String>) -> Option<StatusTicket> {
        self.hide_status();
        match text {
            Some(text) if !text.trim().is_empty() => {
                self.view.result = Some(text);
                self.view.result_visible = true;
                None
            }
            _ => Some(self.show_transient_status("No text found.")),
        }
    }

    pub fn result_text(&self) -> Option<&str> {
        self.view.result.as_deref()
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.view.toast = Some(message.into());
    }

    pub fn hide_toast(&mut self) {
        self.view.toast = None;
    }

    pub fn set_clipboard_hint(&mut self, has_image: bool) {
        self.view.clipboard_hint = has_image;
    }

    pub fn close(&mut self) {
        self.view.closed = true;
    }

    fn set_status(&mut self, message: String, dismiss_after: Option<Duration>) -> StatusTicket {
        tracing::debug!("Panel status: {}", message);
        self.ticket += 1;
        self.view.status = Some(Status {
            message,
            dismiss_after,
        });
        self.view.result_visible = false;
        StatusTicket(self.ticket)
    }
}
