//! Pull-style resampling into a new buffer.
//!
//! Every destination pixel `(x, y)` is sampled from the source at
//!
//! ```text
//! u = x * (W - 1) / (newW - 1) / W
//! v = y * (H - 1) / (newH - 1) / H
//! ```
//!
//! The final division is by the source dimension, so the mapping does not
//! reach the last source texel exactly. A target dimension of 1 samples
//! the first row or column.

use worktex_core::{Error, PixelBuffer, Result};

use crate::sample::{Sampling, sample};

/// Step between destination pixels in source-pixel units.
#[inline]
fn step(src: u32, dst: u32) -> f32 {
    if dst > 1 {
        (src - 1) as f32 / (dst - 1) as f32
    } else {
        0.0
    }
}

/// Resamples `source` into a new buffer of `width` x `height`.
///
/// The result has the source's format, color space, wrap mode and name,
/// a fresh identity and no source link.
///
/// # Errors
///
/// Returns [`Error::InvalidDimensions`] if either target dimension is zero.
pub fn resize(source: &PixelBuffer, width: u32, height: u32, mode: Sampling) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "resize target must be non-empty"));
    }

    let mut out = PixelBuffer::new(source.format(), width, height, source.linear())?;
    out.set_wrap_mode(source.wrap_mode());
    out.set_name(source.name());

    let (src_w, src_h) = source.dimensions();
    let xw = step(src_w, width);
    let yw = step(src_h, height);

    let row_len = width as usize;
    for (y, row) in out.samples_mut().chunks_exact_mut(row_len).enumerate() {
        let v = y as f32 * yw / src_h as f32;
        for (x, px) in row.iter_mut().enumerate() {
            let u = x as f32 * xw / src_w as f32;
            *px = sample(source, u, v, mode);
        }
    }
    Ok(out)
}

/// Calculates the aspect-preserving dimensions that fit a `max_w` x
/// `max_h` box.
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let scale_w = max_w as f32 / src_w as f32;
    let scale_h = max_h as f32 / src_h as f32;
    let scale = scale_w.min(scale_h);

    let new_w = ((src_w as f32 * scale).round() as u32).max(1);
    let new_h = ((src_h as f32 * scale).round() as u32).max(1);

    (new_w, new_h)
}
