use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{premultiply_rgba8, premultiply_rgba8_in_place};

/// Decoded image stored as premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixel data.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Canvas-sized image filled with one straight-alpha colour.
    pub fn solid(canvas: Canvas, rgba: [u8; 4]) -> Self {
        let px = premultiply_rgba8(rgba);
        let mut data = Vec::with_capacity(canvas.rgba8_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            rgba8_premul: Arc::new(data),
        }
    }
}

/// Decode a background image and scale it to cover `canvas`, cropping the overflow centrally.
///
/// Transparent regions are flattened over `backdrop` so every background is opaque.
#[tracing::instrument(level = "debug", skip(backdrop), fields(path = %path.display()))]
pub fn load_background(path: &Path, canvas: Canvas, backdrop: [u8; 4]) -> ReelResult<PreparedImage> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ReelError::validation("canvas width/height must be non-zero"));
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("read background image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .map_err(|e| ReelError::decode(format!("decode '{}': {e}", path.display())))?;
    if dyn_img.width() == 0 || dyn_img.height() == 0 {
        return Err(ReelError::decode(format!(
            "image '{}' has zero size",
            path.display()
        )));
    }

    let filled = dyn_img.resize_to_fill(
        canvas.width,
        canvas.height,
        image::imageops::FilterType::Triangle,
    );
    let mut rgba = filled.to_rgba8().into_raw();
    premultiply_rgba8_in_place(&mut rgba);

    let back = premultiply_rgba8(backdrop);
    for px in rgba.chunks_exact_mut(4) {
        if px[3] == 255 {
            continue;
        }
        let out = crate::effects::composite::over(back, [px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }

    Ok(PreparedImage {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: Arc::new(rgba),
    })
}

/// Parse `#rrggbb` or `#rrggbbaa` into straight-alpha RGBA8.
pub fn parse_hex_color(s: &str) -> ReelResult<[u8; 4]> {
    let hex = s.trim().trim_start_matches('#');
    let parse = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| ReelError::validation(format!("invalid hex colour '{s}'")))
    };
    match hex.len() {
        6 if hex.is_ascii() => Ok([parse(0)?, parse(2)?, parse(4)?, 255]),
        8 if hex.is_ascii() => Ok([parse(0)?, parse(2)?, parse(4)?, parse(6)?]),
        _ => Err(ReelError::validation(format!(
            "colour '{s}' must be #rrggbb or #rrggbbaa"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
