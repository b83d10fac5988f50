//! Resize command
//!
//! Pull-style bilinear resampling of a single texture.

use crate::ResizeArgs;
use anyhow::{Result, bail};
use tracing::trace;
use worktex_cache::resize::fit_dimensions;
use worktex_cache::{BufferCache, Sampling};
use worktex_io::DecoderRegistry;

/// Resolves the target size from explicit dimensions or a scale factor.
///
/// A single dimension, or both with `--fit`, keeps the aspect ratio.
fn target_dimensions(src: (u32, u32), args: &ResizeArgs) -> Result<(u32, u32)> {
    let (src_w, src_h) = (src.0 as f32, src.1 as f32);
    let (w, h) = match (args.width, args.height, args.scale) {
        (Some(w), Some(h), _) if args.fit => fit_dimensions(src.0, src.1, w, h),
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, _) => (w, (src_h * w as f32 / src_w).round() as u32),
        (None, Some(h), _) => ((src_w * h as f32 / src_h).round() as u32, h),
        (None, None, Some(s)) if s > 0.0 => ((src_w * s).round() as u32, (src_h * s).round() as u32),
        (None, None, Some(s)) => bail!("Scale must be positive, got {}", s),
        _ => bail!("Specify --width, --height, or --scale"),
    };
    Ok((w.max(1), h.max(1)))
}

pub fn run(args: ResizeArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), "resize::run");
    let cache = BufferCache::new();
    let registry = DecoderRegistry::with_builtin();

    let src = super::load_texture(&cache, &registry, &args.input)?;
    let (dst_w, dst_h) = target_dimensions(src.dimensions(), &args)?;

    if verbose > 0 {
        let (w, h) = src.dimensions();
        println!("Resizing {}x{} -> {}x{}", w, h, dst_w, dst_h);
    }

    let mode = if args.alpha_weighted {
        Sampling::AlphaWeighted
    } else {
        Sampling::Bilinear
    };
    let resized = src.resize_with(dst_w, dst_h, mode)?;
    drop(src);

    super::save_texture(&args.output, &resized)?;

    if verbose > 0 {
        println!("Done.");
    }
    drop(resized);
    super::log_stats(&cache);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(width: Option<u32>, height: Option<u32>, scale: Option<f32>) -> ResizeArgs {
        ResizeArgs {
            input: PathBuf::from("in.png"),
            output: PathBuf::from("out.png"),
            width,
            height,
            scale,
            fit: false,
            alpha_weighted: false,
        }
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions((200, 100), &args(Some(50), Some(70), None)).unwrap(), (50, 70));
        assert_eq!(target_dimensions((200, 100), &args(Some(50), None, None)).unwrap(), (50, 25));
        assert_eq!(target_dimensions((200, 100), &args(None, Some(10), None)).unwrap(), (20, 10));
        assert_eq!(target_dimensions((200, 100), &args(None, None, Some(0.5))).unwrap(), (100, 50));
        assert_eq!(target_dimensions((3, 3), &args(None, None, Some(0.01))).unwrap(), (1, 1));
    }

    #[test]
    fn test_target_dimensions_fit() {
        let mut fit = args(Some(64), Some(64), None);
        fit.fit = true;
        assert_eq!(target_dimensions((200, 100), &fit).unwrap(), (64, 32));
    }

    #[test]
    fn test_target_dimensions_rejects() {
        assert!(target_dimensions((4, 4), &args(None, None, None)).is_err());
        assert!(target_dimensions((4, 4), &args(None, None, Some(-1.0))).is_err());
    }
}
