//! Color sample type.
//!
//! Every [`PixelBuffer`](crate::PixelBuffer) stores one [`Rgba`] per pixel:
//! four `f32` channels, regardless of the buffer's [`TextureFormat`](crate::TextureFormat).
//! The format tag only matters at the export boundary.
//!
//! # Example
//!
//! ```rust
//! use worktex_core::Rgba;
//!
//! let a = Rgba::RED;
//! let b = Rgba::BLUE;
//! let mid = Rgba::lerp(a, b, 0.5);
//! assert_eq!(mid, Rgba::new(0.5, 0.0, 0.5, 1.0));
//! ```

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// RGBA color sample with `f32` channels.
///
/// Channel values are not clamped; HDR data may exceed 1.0.
#[derive(Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red channel value.
    pub r: f32,
    /// Green channel value.
    pub g: f32,
    /// Blue channel value.
    pub b: f32,
    /// Alpha channel value.
    pub a: f32,
}

impl Rgba {
    /// Transparent black, the initial value of every fresh buffer.
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a new RGBA sample.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque sample from RGB.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create an opaque gray sample.
    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Linear interpolation `a + (b - a) * t`, with `t` clamped to `[0, 1]`.
    ///
    /// `lerp(c, c, t)` returns `c` exactly for any `t`.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
            a.a + (b.a - a.a) * t,
        )
    }

    /// Returns the color with RGB multiplied by alpha.
    #[inline]
    pub fn premultiplied(self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Inverse of [`premultiplied`](Self::premultiplied).
    ///
    /// A zero alpha yields transparent black.
    #[inline]
    pub fn unpremultiplied(self) -> Self {
        if self.a <= 0.0 {
            return Self::CLEAR;
        }
        let inv = 1.0 / self.a;
        Self::new(self.r * inv, self.g * inv, self.b * inv, self.a)
    }

    /// Channel-wise comparison within `eps`.
    #[inline]
    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        (self.r - other.r).abs() <= eps
            && (self.g - other.g).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.a - other.a).abs() <= eps
    }

    /// Returns channels as an array `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for Rgba {
    #[inline]
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [f32; 4] {
    #[inline]
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rgba")
            .field("r", &self.r)
            .field("g", &self.g)
            .field("b", &self.b)
            .field("a", &self.a)
            .finish()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

// ============================================================================
// Arithmetic Operations
// ============================================================================

impl Add for Rgba {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Sub for Rgba {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b, self.a - rhs.a)
    }
}

impl Mul<f32> for Rgba {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}
