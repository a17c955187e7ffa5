mod client;
mod response;

use ite_types::ImagePayload;

pub use client::OcrSpaceClient;
pub use response::{ErrorMessage, OcrSpaceResponse, ParsedResult};

/// Remote text-extraction interface
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text from an encoded image.
    ///
    /// `Ok(None)` means the service found no text.
    async fn extract_text(&self, image: &ImagePayload) -> Result<Option<String>, OcrError>;

    /// Provider name for logs
    fn provider(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OcrError {
    /// The service processed the request and reported a failure
    #[error("{0}")]
    Service(String),

    /// Network, status or body problems, whatever the transport
    #[error("OCR Network/API Error: {0}")]
    Transport(String),
}

impl OcrError {
    pub const FALLBACK_SERVICE: &'static str = "OCR API Error";

    pub fn service(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => Self::Service(message),
            _ => Self::Service(Self::FALLBACK_SERVICE.to_string()),
        }
    }

    pub fn transport(cause: impl std::fmt::Display) -> Self {
        let cause = cause.to_string();
        if cause.trim().is_empty() {
            Self::Transport("request failed".to_string())
        } else {
            Self::Transport(cause)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_falls_back() {
        assert_eq!(OcrError::service(None).to_string(), "OCR API Error");
        assert_eq!(OcrError::service(Some("  ".into())).to_string(), "OCR API Error");
        assert_eq!(
            OcrError::service(Some("File failed validation".into())).to_string(),
            "File failed validation"
        );
    }

    #[test]
    fn test_transport_error_wraps_cause() {
        let err = OcrError::transport("connection refused");
        assert_eq!(err.to_string(), "OCR Network/API Error: connection refused");
        assert!(!OcrError::transport("").to_string().ends_with(": "));
    }
}
