pub mod messages;
pub mod types;

pub use messages::{DirectReply, RuntimeMessage, SurfaceMessage};
pub use types::{
    CaptureArea, ExtractionOutcome, ImagePayload, PipelineInput, PipelineRequest, Point,
    RequestId, SelectionRect, SurfaceId,
};
