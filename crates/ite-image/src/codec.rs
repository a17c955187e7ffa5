use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use ite_types::ImagePayload;

use crate::TransformError;

/// Raw encoded bytes behind a payload.
///
/// Accepts `data:<mime>;base64,<body>` as well as a bare base64 body.
pub fn payload_bytes(payload: &ImagePayload) -> Result<Vec<u8>, TransformError> {
    let body = match payload.as_str().strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or(TransformError::MalformedPayload)?;
            if !header.ends_with(";base64") {
                return Err(TransformError::MalformedPayload);
            }
            body
        }
        None => payload.as_str(),
    };

    Ok(STANDARD.decode(body.trim())?)
}

/// Decode a payload into an RGBA pixel buffer
pub fn decode_payload(payload: &ImagePayload) -> Result<RgbaImage, TransformError> {
    let bytes = payload_bytes(payload)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, TransformError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}

pub fn payload_from_png(bytes: &[u8]) -> ImagePayload {
    ImagePayload::new(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

/// Wrap already encoded image bytes, keeping their format
pub fn payload_from_encoded(bytes: &[u8]) -> Result<ImagePayload, TransformError> {
    let format = image::guess_format(bytes)?;
    Ok(ImagePayload::new(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    )))
}

pub fn payload_from_rgba(image: &RgbaImage) -> Result<ImagePayload, TransformError> {
    Ok(payload_from_png(&encode_png(image)?))
}
