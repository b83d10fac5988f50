//! Texture info command.
//!
//! Loads every input through one cache, so the same file given twice is
//! reported as a shared buffer.

use crate::InfoArgs;
use anyhow::Result;
use std::path::PathBuf;
use worktex_cache::{BufferCache, WorkingTexture};
use worktex_core::Rgba;
use worktex_io::DecoderRegistry;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let cache = BufferCache::new();
    let registry = DecoderRegistry::with_builtin();
    let mut loaded: Vec<(PathBuf, WorkingTexture)> = Vec::new();

    for path in &args.input {
        let tex = super::load_texture(&cache, &registry, path)?;
        let shared_with = loaded
            .iter()
            .find(|(_, other)| other.same_buffer(&tex))
            .map(|(p, _)| p.clone());

        let (w, h) = tex.dimensions();
        println!("{}", path.display());
        println!("  Name:       {}", tex.name());
        println!("  Resolution: {}x{}", w, h);
        println!("  Format:     {}", tex.format());
        println!("  Linear:     {}", tex.linear());
        println!("  Wrap:       {}", tex.wrap_mode());
        println!("  Memory:     {}", super::format_size(w as usize * h as usize * size_of::<Rgba>()));
        if verbose > 0 {
            println!("  Buffer:     {}", tex.id());
        }
        if let Some(first) = shared_with {
            println!("  Shared:     same buffer as {} ({} refs)", first.display(), tex.ref_count());
        }
        if args.input.len() > 1 {
            println!();
        }

        loaded.push((path.clone(), tex));
    }

    super::log_stats(&cache);
    Ok(())
}
