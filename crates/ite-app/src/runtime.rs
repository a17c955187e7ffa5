use ite_types::{DirectReply, ImagePayload, RuntimeMessage, SurfaceId};
use tokio::sync::oneshot;

/// A runtime message plus what the host knows about its sender
#[derive(Debug)]
pub struct RuntimeRequest {
    pub message: RuntimeMessage,
    /// Surface the message was sent from, if it came from a page
    pub sender: Option<SurfaceId>,
    /// Open reply channel for messages that expect a direct answer
    pub reply: Option<oneshot::Sender<DirectReply>>,
}

impl RuntimeRequest {
    pub fn from_surface(surface: SurfaceId, message: RuntimeMessage) -> Self {
        Self {
            message,
            sender: Some(surface),
            reply: None,
        }
    }

    /// Message from the panel that expects no reply
    pub fn detached(message: RuntimeMessage) -> Self {
        Self {
            message,
            sender: None,
            reply: None,
        }
    }

    /// `OCR_DIRECT` with the receiving half of its reply channel
    pub fn direct(image: ImagePayload) -> (Self, oneshot::Receiver<DirectReply>) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            message: RuntimeMessage::OcrDirect { image_data: image },
            sender: None,
            reply: Some(tx),
        };
        (request, rx)
    }
}
