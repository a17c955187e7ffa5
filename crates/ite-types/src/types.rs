use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a page-like surface (the tab the request came from)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Log correlation id for a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport-relative rectangle in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned bounding box of two points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn meets_minimum(&self, min_size: f64) -> bool {
        self.width >= min_size && self.height >= min_size
    }
}

/// Rectangle in device pixels; the only space capture and crop understand
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CaptureArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CaptureArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn has_positive_size(&self) -> bool {
        self.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Encoded image travelling between contexts as a `data:` URL.
///
/// Stages never mutate a payload; they pass it on or build a new one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Mime type declared in the `data:` header, if any
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let header = rest.split_once(',')?.0;
        let mime = header.split(';').next()?;
        (!mime.is_empty()).then_some(mime)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime", &self.mime_type().unwrap_or("unknown"))
            .field("len", &self.0.len())
            .finish()
    }
}

/// Terminal result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success {
        text: String,
        image: Option<ImagePayload>,
    },
    /// No text was recognized. Not an error.
    Empty { image: Option<ImagePayload> },
    Failure {
        message: String,
        image: Option<ImagePayload>,
    },
}

impl ExtractionOutcome {
    pub const FALLBACK_FAILURE: &'static str = "Extraction Failed";

    /// Blank or missing text is an empty result.
    pub fn from_text(text: Option<String>, image: Option<ImagePayload>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Self::Success { text, image },
            _ => Self::Empty { image },
        }
    }

    pub fn failure(message: impl Into<String>, image: Option<ImagePayload>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            Self::FALLBACK_FAILURE.to_string()
        } else {
            message
        };
        Self::Failure { message, image }
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        match self {
            Self::Success { image, .. } | Self::Empty { image } | Self::Failure { image, .. } => {
                image.as_ref()
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineInput {
    Region(CaptureArea),
    Image(ImagePayload),
}

/// Consumed exactly once by the orchestrator, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    pub id: RequestId,
    pub surface: SurfaceId,
    pub input: PipelineInput,
}

impl PipelineRequest {
    pub fn region(surface: SurfaceId, area: CaptureArea) -> Self {
        Self {
            id: RequestId::new(),
            surface,
            input: PipelineInput::Region(area),
        }
    }

    pub fn image(surface: SurfaceId, image: ImagePayload) -> Self {
        Self {
            id: RequestId::new(),
            surface,
            input: PipelineInput::Image(image),
        }
    }
}
