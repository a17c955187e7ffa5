//! Environment collaborators: pixels from the screen, images and text via the clipboard.

mod capture;
mod clipboard;

pub use capture::{CaptureError, StaticCapturer, SurfaceCapturer, default_capturer};
#[cfg(feature = "screen-capture")]
pub use capture::ScreenCapturer;
pub use clipboard::{ClipboardError, ClipboardSink, ClipboardSource, MemoryClipboard, SystemClipboard};
