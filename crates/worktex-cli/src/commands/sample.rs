//! Sample command: bilinear lookup at normalized coordinates.

use crate::SampleArgs;
use anyhow::Result;
use worktex_cache::{BufferCache, Sampling};
use worktex_io::DecoderRegistry;

pub fn run(args: SampleArgs, verbose: u8) -> Result<()> {
    let cache = BufferCache::new();
    let registry = DecoderRegistry::with_builtin();
    let tex = super::load_texture(&cache, &registry, &args.input)?;

    let mode = if args.alpha_weighted {
        Sampling::AlphaWeighted
    } else {
        Sampling::Bilinear
    };
    let color = tex.sample_with(args.u, args.v, mode);

    if verbose > 0 {
        let (w, h) = tex.dimensions();
        println!("{} ({}x{}, {})", args.input.display(), w, h, mode);
    }
    println!("{}", color);

    drop(tex);
    super::log_stats(&cache);
    Ok(())
}
