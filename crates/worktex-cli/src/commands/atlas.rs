//! Atlas command
//!
//! Packs textures into a row-major grid: every input is resized to the
//! cell size (when needed) and blitted into one canvas. Inputs listed more
//! than once are decoded once.

use crate::AtlasArgs;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::{debug, trace};
use worktex_cache::{BufferCache, WorkingTexture};
use worktex_core::TextureFormat;
use worktex_io::DecoderRegistry;

/// Expands glob patterns; plain paths pass through unchanged.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .collect();
        if matched.is_empty() {
            bail!("No files match pattern: {}", pattern);
        }
        matched.sort();
        files.append(&mut matched);
    }
    Ok(files)
}

/// Grid shape for `count` cells with at most `columns` per row.
fn grid(count: u32, columns: u32) -> (u32, u32) {
    let cols = columns.min(count).max(1);
    (cols, count.div_ceil(cols))
}

pub fn run(args: AtlasArgs, verbose: u8) -> Result<()> {
    if args.columns == 0 {
        bail!("--columns must be at least 1");
    }
    let files = expand_inputs(&args.input)?;
    let count = u32::try_from(files.len()).context("Too many inputs")?;

    let cache = BufferCache::new();
    let registry = DecoderRegistry::with_builtin();
    let textures = files
        .iter()
        .map(|path| super::load_texture(&cache, &registry, path))
        .collect::<Result<Vec<WorkingTexture>>>()?;

    let Some(first) = textures.first() else {
        bail!("No input textures");
    };
    let cell_w = args.cell_width.unwrap_or_else(|| first.width());
    let cell_h = args.cell_height.unwrap_or_else(|| first.height());
    let (cols, rows) = grid(count, args.columns);
    let canvas_w = cols.checked_mul(cell_w).context("Atlas width overflows")?;
    let canvas_h = rows.checked_mul(cell_h).context("Atlas height overflows")?;

    if verbose > 0 {
        println!(
            "Packing {} textures into {}x{} grid of {}x{} cells ({}x{})",
            count, cols, rows, cell_w, cell_h, canvas_w, canvas_h
        );
    }

    let mut atlas = WorkingTexture::new(&cache, TextureFormat::Rgba32, canvas_w, canvas_h, first.linear())?;
    atlas.set_name("atlas");

    for (i, tex) in (0u32..).zip(&textures) {
        let (col, row) = (i % cols, i / cols);
        let x = i32::try_from(col * cell_w).context("Cell offset overflows")?;
        let y = i32::try_from(row * cell_h).context("Cell offset overflows")?;
        trace!(index = i, x, y, "placing cell");

        if tex.dimensions() == (cell_w, cell_h) {
            atlas.blit(tex, x, y);
        } else {
            let cell = tex.resize(cell_w, cell_h)?;
            atlas.blit(&cell, x, y);
        }
    }
    debug!(cells = count, unique = cache.indexed_sources(), "atlas packed");
    drop(textures);

    super::save_texture(&args.output, &atlas)?;
    if verbose > 0 {
        println!("Wrote {}", args.output.display());
    }

    drop(atlas);
    super::log_stats(&cache);
    Ok(())
}
