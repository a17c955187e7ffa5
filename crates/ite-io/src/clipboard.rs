use arboard::Clipboard;
use async_trait::async_trait;
use image::RgbaImage;
use ite_image::TransformError;
use ite_types::ImagePayload;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard error: {0}")]
    Access(#[from] arboard::Error),

    #[error("Clipboard image has inconsistent dimensions")]
    InvalidImage,

    #[error("Failed to encode clipboard image: {0}")]
    Encode(#[from] TransformError),

    #[error("Clipboard worker failed: {0}")]
    Worker(String),
}

#[async_trait]
pub trait ClipboardSource: Send + Sync {
    /// First image on the clipboard, `None` if there is none
    async fn read_image(&self) -> Result<Option<ImagePayload>, ClipboardError>;
}

#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard through `arboard`
#[derive(Clone, Copy, Default)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_image(&self) -> Result<Option<ImagePayload>, ClipboardError> {
        tokio::task::spawn_blocking(|| -> Result<Option<ImagePayload>, ClipboardError> {
            let mut clipboard = Clipboard::new()?;
            let image = match clipboard.get_image() {
                Ok(image) => image,
                Err(arboard::Error::ContentNotAvailable) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            tracing::debug!("Clipboard image {}x{}", image.width, image.height);
            let rgba = RgbaImage::from_raw(
                image.width as u32,
                image.height as u32,
                image.bytes.into_owned(),
            )
            .ok_or(ClipboardError::InvalidImage)?;

            Ok(Some(ite_image::payload_from_rgba(&rgba)?))
        })
        .await
        .map_err(|e| ClipboardError::Worker(e.to_string()))?
    }
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), ClipboardError> {
            let mut clipboard = Clipboard::new()?;
            clipboard.set_text(text)?;
            Ok(())
        })
        .await
        .map_err(|e| ClipboardError::Worker(e.to_string()))?
    }
}

/// In-process clipboard for headless runs
#[derive(Default)]
pub struct MemoryClipboard {
    image: Mutex<Option<ImagePayload>>,
    text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(image: ImagePayload) -> Self {
        Self {
            image: Mutex::new(Some(image)),
            text: Mutex::new(None),
        }
    }

    pub async fn set_image(&self, image: Option<ImagePayload>) {
        *self.image.lock().await = image;
    }

    pub async fn text(&self) -> Option<String> {
        self.text.lock().await.clone()
    }
}

#[async_trait]
impl ClipboardSource for MemoryClipboard {
    async fn read_image(&self) -> Result<Option<ImagePayload>, ClipboardError> {
        Ok(self.image.lock().await.clone())
    }
}

#[async_trait]
impl ClipboardSink for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.text.lock().await = Some(text.to_string());
        Ok(())
    }
}
