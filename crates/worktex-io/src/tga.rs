//! Truevision TGA support (decode only).
//!
//! Manual implementation covering what texture pipelines produce:
//!
//! | Image type | Meaning | Depths |
//! |------------|---------|--------|
//! | 2  | uncompressed true-color | 24, 32 |
//! | 3  | uncompressed grayscale  | 8 |
//! | 10 | RLE true-color          | 24, 32 |
//! | 11 | RLE grayscale           | 8 |
//!
//! Pixels are stored BGR(A). The image descriptor's origin bits decide the
//! row order; output is always top row first.

use crate::decoded::DecodedImage;
use crate::{IoError, IoResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};
use std::path::Path;
use worktex_core::{Rgba, TextureFormat};

const HEADER_LEN: u64 = 18;

/// Descriptor bit: pixels run right to left.
const RIGHT_TO_LEFT: u8 = 0x10;
/// Descriptor bit: first row is the top row.
const TOP_TO_BOTTOM: u8 = 0x20;

/// Parsed TGA header.
#[derive(Debug, Clone, Copy)]
struct TgaHeader {
    id_length: u8,
    colormap_type: u8,
    image_type: u8,
    colormap_length: u16,
    colormap_entry_bits: u8,
    width: u16,
    height: u16,
    bits_per_pixel: u8,
    descriptor: u8,
}

impl TgaHeader {
    fn parse(r: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let id_length = r.read_u8()?;
        let colormap_type = r.read_u8()?;
        let image_type = r.read_u8()?;
        let _colormap_first = r.read_u16::<LittleEndian>()?;
        let colormap_length = r.read_u16::<LittleEndian>()?;
        let colormap_entry_bits = r.read_u8()?;
        let _x_origin = r.read_u16::<LittleEndian>()?;
        let _y_origin = r.read_u16::<LittleEndian>()?;
        let width = r.read_u16::<LittleEndian>()?;
        let height = r.read_u16::<LittleEndian>()?;
        let bits_per_pixel = r.read_u8()?;
        let descriptor = r.read_u8()?;
        Ok(Self {
            id_length,
            colormap_type,
            image_type,
            colormap_length,
            colormap_entry_bits,
            width,
            height,
            bits_per_pixel,
            descriptor,
        })
    }

    fn is_rle(&self) -> bool {
        matches!(self.image_type, 10 | 11)
    }

    fn is_gray(&self) -> bool {
        matches!(self.image_type, 3 | 11)
    }

    /// Bytes of ID field plus color map preceding the pixel data.
    fn skip_len(&self) -> u64 {
        let colormap = if self.colormap_type == 1 {
            self.colormap_length as u64 * (self.colormap_entry_bits as u64).div_ceil(8)
        } else {
            0
        };
        self.id_length as u64 + colormap
    }
}

fn truncated(e: io::Error) -> IoError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        IoError::DecodeError("truncated TGA data".into())
    } else {
        IoError::Io(e)
    }
}

/// Reads a TGA file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<DecodedImage> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes)
}

/// Decodes a TGA image held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<DecodedImage> {
    let mut r = Cursor::new(bytes);
    let header = TgaHeader::parse(&mut r).map_err(truncated)?;

    match header.image_type {
        2 | 3 | 10 | 11 => {}
        t => return Err(IoError::UnsupportedFormat(format!("TGA image type {}", t))),
    }
    let format = match (header.is_gray(), header.bits_per_pixel) {
        (true, 8) => TextureFormat::R8,
        (false, 24) => TextureFormat::Rgb24,
        (false, 32) => TextureFormat::Rgba32,
        (gray, bpp) => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "TGA {} {}-bit",
                if gray { "grayscale" } else { "true-color" },
                bpp
            )));
        }
    };
    if header.width == 0 || header.height == 0 {
        return Err(IoError::InvalidFile(format!(
            "TGA dimensions {}x{}",
            header.width, header.height
        )));
    }

    r.set_position(HEADER_LEN + header.skip_len());

    let bpp = header.bits_per_pixel as usize / 8;
    let count = header.width as usize * header.height as usize;
    let Some(len) = count.checked_mul(bpp) else {
        return Err(IoError::InvalidFile(format!(
            "TGA dimensions {}x{}",
            header.width, header.height
        )));
    };
    let remaining = bytes.len().saturating_sub(r.position() as usize);
    let raw = if header.is_rle() {
        read_rle(&mut r, len, bpp, remaining)?
    } else {
        // header sizes are untrusted; check before allocating
        if remaining < len {
            return Err(IoError::DecodeError("truncated TGA data".into()));
        }
        let mut raw = vec![0u8; len];
        r.read_exact(&mut raw).map_err(truncated)?;
        raw
    };

    let mut samples: Vec<Rgba> = raw.chunks_exact(bpp).map(to_rgba).collect();
    reorient(&mut samples, header.width as usize, header.descriptor);

    Ok(DecodedImage::new(
        samples,
        header.width as u32,
        header.height as u32,
        format,
        false,
    ))
}

/// Expands run-length packets into `len` raw bytes.
///
/// One packet of at most `1 + bpp` input bytes yields up to 128 pixels,
/// which bounds the initial allocation by the `remaining` input.
fn read_rle(r: &mut Cursor<&[u8]>, len: usize, bpp: usize, remaining: usize) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(len.min(remaining.saturating_mul(128 * bpp)));
    let mut pixel = [0u8; 4];
    while out.len() < len {
        let packet = r.read_u8().map_err(truncated)?;
        let n = (packet & 0x7F) as usize + 1;
        if packet & 0x80 != 0 {
            r.read_exact(&mut pixel[..bpp]).map_err(truncated)?;
            for _ in 0..n {
                out.extend_from_slice(&pixel[..bpp]);
            }
        } else {
            let start = out.len();
            out.resize(start + n * bpp, 0);
            r.read_exact(&mut out[start..]).map_err(truncated)?;
        }
    }
    // a run may overshoot the last pixel
    out.truncate(len);
    Ok(out)
}

#[inline]
fn to_rgba(px: &[u8]) -> Rgba {
    let n = |v: u8| v as f32 / 255.0;
    match px.len() {
        1 => Rgba::gray(n(px[0])),
        3 => Rgba::rgb(n(px[2]), n(px[1]), n(px[0])),
        _ => Rgba::new(n(px[2]), n(px[1]), n(px[0]), n(px[3])),
    }
}

/// Brings pixels into top-down, left-to-right order.
fn reorient(samples: &mut [Rgba], width: usize, descriptor: u8) {
    if descriptor & RIGHT_TO_LEFT != 0 {
        for row in samples.chunks_exact_mut(width) {
            row.reverse();
        }
    }
    if descriptor & TOP_TO_BOTTOM == 0 {
        let height = samples.len() / width;
        for y in 0..height / 2 {
            let (top, bottom) = samples.split_at_mut((height - 1 - y) * width);
            top[y * width..(y + 1) * width].swap_with_slice(&mut bottom[..width]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(image_type: u8, w: u16, h: u16, bpp: u8, descriptor: u8, id_len: u8) -> Vec<u8> {
        let mut v = vec![id_len, 0, image_type, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        v.extend_from_slice(&w.to_le_bytes());
        v.extend_from_slice(&h.to_le_bytes());
        v.push(bpp);
        v.push(descriptor);
        v
    }

    #[test]
    fn uncompressed_bottom_up_is_flipped() {
        // 1x2, bottom row red, top row blue (file stores bottom row first)
        let mut bytes = header(2, 1, 2, 24, 0, 0);
        bytes.extend_from_slice(&[0, 0, 255]); // red (BGR)
        bytes.extend_from_slice(&[255, 0, 0]); // blue
        let image = decode(&bytes).expect("decode");
        assert_eq!(image.format, TextureFormat::Rgb24);
        assert_eq!(image.samples, vec![Rgba::BLUE, Rgba::RED]);
    }

    #[test]
    fn top_down_with_id_field_and_alpha() {
        let mut bytes = header(2, 2, 1, 32, TOP_TO_BOTTOM | 8, 3);
        bytes.extend_from_slice(b"abc");
        bytes.extend_from_slice(&[0, 255, 0, 255]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        let image = decode(&bytes).expect("decode");
        assert_eq!(image.format, TextureFormat::Rgba32);
        assert_eq!(image.samples, vec![Rgba::GREEN, Rgba::CLEAR]);
    }

    #[test]
    fn rle_packets() {
        // 4x1 gray: run of 3 x 255, then one raw 0
        let mut bytes = header(11, 4, 1, 8, TOP_TO_BOTTOM, 0);
        bytes.extend_from_slice(&[0x80 | 2, 255, 0x00, 0]);
        let image = decode(&bytes).expect("decode");
        assert_eq!(
            image.samples,
            vec![Rgba::WHITE, Rgba::WHITE, Rgba::WHITE, Rgba::BLACK]
        );
    }

    #[test]
    fn right_to_left() {
        let mut bytes = header(3, 2, 1, 8, TOP_TO_BOTTOM | RIGHT_TO_LEFT, 0);
        bytes.extend_from_slice(&[0, 255]);
        let image = decode(&bytes).expect("decode");
        assert_eq!(image.samples, vec![Rgba::WHITE, Rgba::BLACK]);
    }

    #[test]
    fn truncated_is_decode_error() {
        let mut bytes = header(2, 4, 4, 24, 0, 0);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert!(decode(&bytes).unwrap_err().is_decode_error());
        assert!(decode(&[0u8; 5]).unwrap_err().is_decode_error());
    }

    #[test]
    fn oversized_header_without_pixels() {
        for image_type in [2, 10] {
            let bytes = header(image_type, u16::MAX, u16::MAX, 32, 0, 0);
            assert!(decode(&bytes).unwrap_err().is_decode_error());
        }
    }

    #[test]
    fn oversized_rle_header_runs_out_of_packets() {
        // one run packet covering 128 pixels, then nothing
        let mut bytes = header(10, u16::MAX, u16::MAX, 24, 0, 0);
        bytes.extend_from_slice(&[0xFF, 1, 2, 3]);
        assert!(decode(&bytes).unwrap_err().is_decode_error());
    }

    #[test]
    fn unsupported_type() {
        let bytes = header(1, 1, 1, 8, 0, 0);
        assert!(matches!(decode(&bytes), Err(IoError::UnsupportedFormat(_))));
    }
}
