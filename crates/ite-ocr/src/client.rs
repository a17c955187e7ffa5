use std::time::Duration;

use async_trait::async_trait;
use ite_config::ocr::OcrConfig;
use ite_types::ImagePayload;
use reqwest::multipart::Form;

use crate::response::OcrSpaceResponse;
use crate::{OcrError, TextExtractor};

/// Multipart client for an OCR.space compatible endpoint
#[derive(Clone)]
pub struct OcrSpaceClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    language: String,
    overlay: bool,
    scale: bool,
}

impl OcrSpaceClient {
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build().map_err(OcrError::transport)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            overlay: config.overlay,
            scale: config.scale,
        })
    }

    fn form(&self, image: &ImagePayload) -> Form {
        Form::new()
            .text("base64Image", image.as_str().to_string())
            .text("language", self.language.clone())
            .text("isOverlayRequired", self.overlay.to_string())
            .text("apikey", self.api_key.clone())
            .text("scale", self.scale.to_string())
    }
}

#[async_trait]
impl TextExtractor for OcrSpaceClient {
    async fn extract_text(&self, image: &ImagePayload) -> Result<Option<String>, OcrError> {
        tracing::debug!("Submitting {} byte payload to {}", image.len(), self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .multipart(self.form(image))
            .send()
            .await
            .map_err(OcrError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::Transport(format!("HTTP {}", status)));
        }

        let body: OcrSpaceResponse = response.json().await.map_err(OcrError::transport)?;
        let text = body.into_text()?;

        tracing::debug!(
            "OCR finished: {}",
            text.as_ref()
                .map(|t| format!("{} chars", t.len()))
                .unwrap_or_else(|| "no text".to_string())
        );

        Ok(text)
    }

    fn provider(&self) -> &str {
        "ocr.space"
    }
}
