use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{CaptureArea, ExtractionOutcome, ImagePayload, SurfaceId};

/// Messages handled by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeMessage {
    /// Sent by a page controller; the sender identifies the surface
    CaptureAndExtract { area: CaptureArea },
    #[serde(rename_all = "camelCase")]
    ExtractFromImage {
        image_data: ImagePayload,
        tab_id: SurfaceId,
    },
    /// Answered on the request's own reply channel
    #[serde(rename_all = "camelCase")]
    OcrDirect { image_data: ImagePayload },
}

impl RuntimeMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::CaptureAndExtract { .. } => "CAPTURE_AND_EXTRACT",
            Self::ExtractFromImage { .. } => "EXTRACT_FROM_IMAGE",
            Self::OcrDirect { .. } => "OCR_DIRECT",
        }
    }
}

/// Messages delivered to a page surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfaceMessage {
    StartSelection,
    #[serde(rename_all = "camelCase")]
    ShowResult {
        text: String,
        debug_image: Option<ImagePayload>,
    },
    #[serde(rename_all = "camelCase")]
    ShowError {
        message: String,
        debug_image: Option<ImagePayload>,
    },
    #[serde(rename_all = "camelCase")]
    ShowEmpty { debug_image: Option<ImagePayload> },
}

impl SurfaceMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::StartSelection => "START_SELECTION",
            Self::ShowResult { .. } => "SHOW_RESULT",
            Self::ShowError { .. } => "SHOW_ERROR",
            Self::ShowEmpty { .. } => "SHOW_EMPTY",
        }
    }

    pub fn from_outcome(outcome: ExtractionOutcome) -> Self {
        match outcome {
            ExtractionOutcome::Success { text, image } => Self::ShowResult {
                text,
                debug_image: image,
            },
            ExtractionOutcome::Empty { image } => Self::ShowEmpty { debug_image: image },
            ExtractionOutcome::Failure { message, image } => Self::ShowError {
                message,
                debug_image: image,
            },
        }
    }

    /// `None` for control messages that carry no outcome
    pub fn into_outcome(self) -> Option<ExtractionOutcome> {
        match self {
            Self::StartSelection => None,
            Self::ShowResult { text, debug_image } => Some(ExtractionOutcome::Success {
                text,
                image: debug_image,
            }),
            Self::ShowEmpty { debug_image } => Some(ExtractionOutcome::Empty { image: debug_image }),
            Self::ShowError {
                message,
                debug_image,
            } => Some(ExtractionOutcome::failure(message, debug_image)),
        }
    }
}

/// Reply to `OCR_DIRECT`.
///
/// On the wire: `{"success": true, "text": ...}` or `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectReply {
    Extracted { text: Option<String> },
    Failed { error: String },
}

impl DirectReply {
    pub fn success(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

impl From<ExtractionOutcome> for DirectReply {
    /// The analyzed image is not part of a direct reply
    fn from(outcome: ExtractionOutcome) -> Self {
        match outcome {
            ExtractionOutcome::Success { text, .. } => Self::Extracted { text: Some(text) },
            ExtractionOutcome::Empty { .. } => Self::Extracted { text: None },
            ExtractionOutcome::Failure { message, .. } => Self::Failed { error: message },
        }
    }
}

impl Serialize for DirectReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DirectReply", 2)?;
        match self {
            Self::Extracted { text } => {
                state.serialize_field("success", &true)?;
                state.serialize_field("text", text)?;
            }
            Self::Failed { error } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

#[derive(Deserialize)]
struct WireReply {
    success: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl<'de> Deserialize<'de> for DirectReply {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireReply::deserialize(deserializer)?;
        Ok(if wire.success {
            Self::Extracted { text: wire.text }
        } else {
            Self::Failed {
                error: wire.error.unwrap_or_default(),
            }
        })
    }
}
