//! View models for rendering extraction outcomes.
//!
//! Drawing is left to whoever owns the window; these types decide *what* is
//! on screen: the in-progress indicator, the single outcome notification, the
//! detail view and the panel's status line.

mod page;
mod panel;

pub use page::{
    CopyState, CopyTicket, DetailView, Notification, NotificationKind, PagePresenter, PageView,
};
pub use panel::{PanelPresenter, PanelView, Status, StatusTicket};

/// First `max_chars` characters, with `...` when something was cut
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
