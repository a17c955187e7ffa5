use image::{RgbaImage, imageops};
use ite_types::{CaptureArea, ImagePayload};

use crate::TransformError;
use crate::codec::{decode_payload, payload_from_rgba};

/// Largest accepted crop edge in device pixels
pub const MAX_DIMENSION: u32 = 1 << 15;

/// Largest accepted distance of the crop origin from the capture origin
pub const MAX_OFFSET: f64 = i32::MAX as f64;

/// A [`CaptureArea`] snapped to the device pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn from_area(area: CaptureArea) -> Result<Self, TransformError> {
        if !area.has_positive_size() {
            return Err(TransformError::InvalidArea { area });
        }

        let width = area.width.round();
        let height = area.height.round();
        let edge = 1.0..=f64::from(MAX_DIMENSION);
        if !edge.contains(&width) || !edge.contains(&height) {
            return Err(TransformError::InvalidArea { area });
        }

        let x = area.x.round();
        let y = area.y.round();
        let offset = -MAX_OFFSET..=MAX_OFFSET;
        if !offset.contains(&x) || !offset.contains(&y) {
            return Err(TransformError::InvalidArea { area });
        }

        Ok(Self {
            x: x as i64,
            y: y as i64,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Crop `full` to `area`, 1:1, and re-encode as PNG.
///
/// The area is validated before the payload is touched.
pub fn crop(full: &ImagePayload, area: CaptureArea) -> Result<ImagePayload, TransformError> {
    let rect = PixelRect::from_area(area)?;
    let source = decode_payload(full)?;
    let cropped = crop_rgba(&source, rect);

    tracing::debug!(
        "Cropped {}x{} source to {}x{} at ({}, {})",
        source.width(),
        source.height(),
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );

    payload_from_rgba(&cropped)
}

/// Copy `rect` out of `source` into a new `width x height` buffer.
///
/// Pixels outside the source stay fully transparent.
pub fn crop_rgba(source: &RgbaImage, rect: PixelRect) -> RgbaImage {
    let mut out = RgbaImage::new(rect.width, rect.height);

    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = (rect.x + rect.width as i64).min(source.width() as i64);
    let y1 = (rect.y + rect.height as i64).min(source.height() as i64);

    if x0 >= x1 || y0 >= y1 {
        tracing::warn!(
            "Crop area {:?} lies outside the {}x{} capture, result is blank",
            rect,
            source.width(),
            source.height()
        );
        return out;
    }

    let clamped = x0 != rect.x
        || y0 != rect.y
        || x1 - x0 != rect.width as i64
        || y1 - y0 != rect.height as i64;
    if clamped {
        tracing::warn!(
            "Crop area {:?} exceeds the {}x{} capture, clamping",
            rect,
            source.width(),
            source.height()
        );
    }

    let visible =
        imageops::crop_imm(source, x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
            .to_image();
    imageops::replace(&mut out, &visible, x0 - rect.x, y0 - rect.y);

    out
}
