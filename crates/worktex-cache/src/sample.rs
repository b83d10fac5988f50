//! Bilinear sampling at normalized coordinates.
//!
//! `u` and `v` map `[0, 1]` onto the pixel centers `0..=W-1` and `0..=H-1`.
//! Coordinates outside `[0, 1]` are clamped; the buffer's wrap mode is not
//! consulted.
//!
//! # Modes
//!
//! - [`Sampling::Bilinear`] - straight interpolation of all four channels
//! - [`Sampling::AlphaWeighted`] - interpolates premultiplied color, so
//!   transparent texels do not bleed their color into the result

use worktex_core::{PixelBuffer, Rgba};

/// Interpolation mode for [`sample`] and resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
    /// Plain bilinear interpolation.
    #[default]
    Bilinear,
    /// Bilinear interpolation of premultiplied color.
    AlphaWeighted,
}

impl Sampling {
    /// Returns the mode name.
    pub fn name(&self) -> &'static str {
        match self {
            Sampling::Bilinear => "bilinear",
            Sampling::AlphaWeighted => "alpha-weighted",
        }
    }
}

impl std::fmt::Display for Sampling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower and upper texel index plus the weight of the upper one.
#[inline]
fn axis(t: f32, size: u32) -> (usize, usize, f32) {
    let last = size.saturating_sub(1) as usize;
    let x = t.clamp(0.0, 1.0) * last as f32;
    let lo = x.floor();
    // NaN saturates to 0 in the casts below
    let lo_idx = (lo as usize).min(last);
    let hi_idx = (x.ceil() as usize).min(last);
    let w = if x.is_finite() { x - lo } else { 0.0 };
    (lo_idx, hi_idx, w)
}

/// Samples `buffer` at `(u, v)`.
pub fn sample(buffer: &PixelBuffer, u: f32, v: f32, mode: Sampling) -> Rgba {
    let (x1, x2, wx) = axis(u, buffer.width());
    let (y1, y2, wy) = axis(v, buffer.height());
    let w = buffer.width() as usize;
    let samples = buffer.samples();
    let texel = |x: usize, y: usize| {
        let px = samples[y * w + x];
        match mode {
            Sampling::Bilinear => px,
            Sampling::AlphaWeighted => px.premultiplied(),
        }
    };

    let top = Rgba::lerp(texel(x1, y1), texel(x2, y1), wx);
    let bottom = Rgba::lerp(texel(x1, y2), texel(x2, y2), wx);
    let result = Rgba::lerp(top, bottom, wy);

    match mode {
        Sampling::Bilinear => result,
        Sampling::AlphaWeighted => result.unpremultiplied(),
    }
}
