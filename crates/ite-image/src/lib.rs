//! Decoding, cropping and re-encoding of [`ImagePayload`](ite_types::ImagePayload)s.

mod codec;
mod crop;

use ite_types::CaptureArea;

pub use codec::{
    decode_payload, encode_png, payload_bytes, payload_from_encoded, payload_from_png,
    payload_from_rgba,
};
pub use crop::{MAX_DIMENSION, MAX_OFFSET, PixelRect, crop, crop_rgba};

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid selection area")]
    InvalidArea { area: CaptureArea },

    #[error("Image payload is not a base64 data URL")]
    MalformedPayload,

    #[error("Failed to decode image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
}
