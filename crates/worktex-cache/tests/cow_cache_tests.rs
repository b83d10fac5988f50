//! Sharing, deduplication and copy-on-write behavior of working textures.

use worktex_cache::{BufferCache, Sampling, WorkingTexture};
use worktex_core::{Rgba, SourceId, TextureFormat, WrapMode};
use worktex_io::{DecodedImage, DecoderRegistry, IoError, IoResult, MemorySink};

fn decoded(w: u32, h: u32, color: Rgba) -> impl FnOnce() -> IoResult<DecodedImage> {
    move || Ok(DecodedImage::filled(w, h, color))
}

fn rgba(cache: &BufferCache, w: u32, h: u32) -> WorkingTexture {
    WorkingTexture::new(cache, TextureFormat::Rgba32, w, h, true).expect("new texture")
}

#[test]
fn refcount_tracks_live_handles() {
    let cache = BufferCache::new();
    let a = rgba(&cache, 4, 4);
    let key = a.key();

    let handles: Vec<_> = (0..5).map(|_| a.clone()).collect();
    assert_eq!(cache.ref_count(key), 6);

    drop(handles);
    assert_eq!(cache.ref_count(key), 1);

    a.dispose();
    assert_eq!(cache.ref_count(key), 0);
    assert_eq!(cache.live_buffers(), 0);
}

#[test]
fn clone_shares_until_first_write() {
    let cache = BufferCache::new();
    let mut a = rgba(&cache, 8, 8);
    a.fill(Rgba::WHITE);

    let b = a.clone();
    assert!(a.same_buffer(&b));
    assert_eq!(a.id(), b.id());
    assert_eq!(cache.live_buffers(), 1);
    assert_eq!(cache.stats().duplicates, 0);

    // writing through the original must copy too
    a.set_pixel(3, 3, Rgba::BLACK).expect("in bounds");
    assert!(!a.same_buffer(&b));
    assert_ne!(a.id(), b.id());
    assert_eq!(b.pixel(3, 3).expect("in bounds"), Rgba::WHITE);
    assert_eq!(a.pixel(3, 3).expect("in bounds"), Rgba::BLACK);
    assert_eq!(cache.live_buffers(), 2);
    assert_eq!((a.ref_count(), b.ref_count()), (1, 1));
}

#[test]
fn red_blue_green_scenario() {
    let cache = BufferCache::new();
    let mut a = rgba(&cache, 2, 2);
    a.set_pixel(0, 0, Rgba::RED).expect("set");
    a.set_pixel(1, 1, Rgba::BLUE).expect("set");

    let mut b = a.clone();
    b.set_pixel(0, 0, Rgba::GREEN).expect("set");

    assert_eq!(a.pixel(0, 0).expect("get"), Rgba::RED);
    assert_eq!(b.pixel(0, 0).expect("get"), Rgba::GREEN);
    assert_eq!(b.pixel(1, 1).expect("get"), Rgba::BLUE);
}

#[test]
fn same_source_is_deduplicated() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");
    let other = SourceId::from_key("other.png");

    let a = WorkingTexture::from_source(&cache, tex, decoded(2, 2, Rgba::RED)).expect("load");
    let b = WorkingTexture::from_source(&cache, tex, || panic!("second load must hit")).expect("load");
    let c = WorkingTexture::from_source(&cache, other, decoded(2, 2, Rgba::RED)).expect("load");

    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
    assert!(a.has_source());
    assert_eq!(cache.indexed_sources(), 2);
}

#[test]
fn tex_png_release_scenario() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");

    let a = WorkingTexture::from_source(&cache, tex, decoded(2, 2, Rgba::BLUE)).expect("load");
    let b = WorkingTexture::from_source(&cache, tex, decoded(2, 2, Rgba::BLUE)).expect("load");
    assert_eq!(a.ref_count(), 2);

    a.dispose();
    assert_eq!(b.ref_count(), 1);
    assert!(cache.contains_source(&tex));

    b.dispose();
    assert!(!cache.contains_source(&tex));
    assert_eq!(cache.live_buffers(), 0);
}

#[test]
fn reload_after_release_decodes_again() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");
    WorkingTexture::from_source(&cache, tex, decoded(1, 1, Rgba::RED))
        .expect("load")
        .dispose();

    let again = WorkingTexture::from_source(&cache, tex, decoded(1, 1, Rgba::GREEN)).expect("load");
    assert_eq!(again.pixel(0, 0).expect("get"), Rgba::GREEN);
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn writing_sole_source_handle_writes_in_place() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");
    let mut a = WorkingTexture::from_source(&cache, tex, decoded(2, 2, Rgba::RED)).expect("load");
    let before = a.id();

    a.set_pixel(0, 0, Rgba::GREEN).expect("set");
    assert_eq!(a.id(), before);
    assert!(a.has_source());
    assert_eq!(a.ref_count(), 1);
    assert!(cache.contains_source(&tex));
    assert_eq!(cache.stats().duplicates, 0);

    // the index still points at the written buffer
    let b = WorkingTexture::from_source(&cache, tex, || panic!("decoder must not run")).expect("load");
    assert!(a.same_buffer(&b));
    assert_eq!(b.id(), before);
    assert_eq!(b.pixel(0, 0).expect("get"), Rgba::GREEN);

    drop(a);
    drop(b);
    assert!(!cache.contains_source(&tex));
}

#[test]
fn writing_shared_source_handle_keeps_index() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");
    let mut a = WorkingTexture::from_source(&cache, tex, decoded(2, 2, Rgba::RED)).expect("load");
    let b = a.clone();

    a.fill(Rgba::BLACK);
    assert!(!a.has_source());
    assert!(b.has_source());
    assert!(cache.contains_source(&tex));
    assert_eq!(b.pixel(1, 1).expect("get"), Rgba::RED);
}

#[test]
fn duplicate_then_blit_matches_original() {
    let cache = BufferCache::new();
    let mut original = rgba(&cache, 3, 2);
    for y in 0..2 {
        for x in 0..3 {
            let v = (x + 3 * y) as f32 / 6.0;
            original.set_pixel(x, y, Rgba::new(v, 1.0 - v, 0.5, 1.0)).expect("set");
        }
    }

    let mut copy = original.duplicate();
    copy.blit(&original, 0, 0);

    assert_ne!(copy.id(), original.id());
    assert!(!copy.has_source());
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(copy.pixel(x, y).expect("get"), original.pixel(x, y).expect("get"));
        }
    }
}

#[test]
fn uniform_resize_is_invariant() {
    let cache = BufferCache::new();
    let color = Rgba::new(0.1, 0.7, 0.3, 0.6);
    let mut src = rgba(&cache, 7, 5);
    src.fill(color);

    for (w, h) in [(1, 1), (2, 9), (14, 10), (7, 5), (3, 3)] {
        for mode in [Sampling::Bilinear, Sampling::AlphaWeighted] {
            let out = src.resize_with(w, h, mode).expect("resize");
            assert_eq!(out.dimensions(), (w, h));
            for y in 0..h {
                for x in 0..w {
                    assert!(out.pixel(x, y).expect("get").approx_eq(&color, 1e-5));
                }
            }
        }
    }
}

#[test]
fn resize_returns_new_exclusive_texture() {
    let cache = BufferCache::new();
    let src = rgba(&cache, 4, 4);
    let out = src.resize(2, 2).expect("resize");
    assert_ne!(out.id(), src.id());
    assert_eq!(out.ref_count(), 1);
    assert_eq!(src.ref_count(), 1);
    assert!(src.resize(0, 2).is_err());
}

#[test]
fn blit_clips_large_source() {
    let cache = BufferCache::new();
    let mut src = rgba(&cache, 4, 4);
    for y in 0..4 {
        for x in 0..4 {
            src.set_pixel(x, y, Rgba::gray((x * 4 + y) as f32 / 16.0)).expect("set");
        }
    }

    let mut dst = rgba(&cache, 2, 2);
    dst.blit(&src, 0, 0);
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(dst.pixel(x, y).expect("get"), src.pixel(x, y).expect("get"));
        }
    }

    // fully outside: no error, no change
    let before = dst.to_external();
    dst.blit(&src, 10, -10);
    assert_eq!(dst.to_external(), before);
}

#[test]
fn blit_negative_offset() {
    let cache = BufferCache::new();
    let mut src = rgba(&cache, 2, 2);
    src.set_pixel(1, 1, Rgba::RED).expect("set");
    let mut dst = rgba(&cache, 2, 2);
    dst.blit(&src, -1, -1);
    assert_eq!(dst.pixel(0, 0).expect("get"), Rgba::RED);
    assert_eq!(dst.pixel(1, 1).expect("get"), Rgba::CLEAR);
}

#[test]
fn blit_into_shared_destination_copies_first() {
    let cache = BufferCache::new();
    let dst = rgba(&cache, 2, 2);
    let mut target = dst.clone();
    let mut src = rgba(&cache, 1, 1);
    src.fill(Rgba::BLUE);

    target.blit(&src, 0, 0);
    assert_eq!(target.pixel(0, 0).expect("get"), Rgba::BLUE);
    assert_eq!(dst.pixel(0, 0).expect("get"), Rgba::CLEAR);
}

#[test]
fn out_of_bounds_access_fails() {
    let cache = BufferCache::new();
    let mut t = rgba(&cache, 2, 2);
    assert!(t.pixel(2, 0).unwrap_err().is_bounds_error());
    assert!(t.pixel(0, 5).unwrap_err().is_bounds_error());
    assert!(t.set_pixel(0, 2, Rgba::RED).unwrap_err().is_bounds_error());
}

#[test]
fn size_mismatch_registers_nothing() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");
    let err = WorkingTexture::from_source(&cache, tex, || {
        Ok(DecodedImage::new(vec![Rgba::RED; 5], 2, 2, TextureFormat::Rgba32, false))
    })
    .unwrap_err();
    assert!(err.is_size_mismatch());
    assert_eq!(cache.live_buffers(), 0);
    assert!(!cache.contains_source(&tex));
}

#[test]
fn decode_error_propagates() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tex.png");
    let err = WorkingTexture::from_source(&cache, tex, || Err(IoError::DecodeError("truncated".into())))
        .unwrap_err();
    assert!(err.is_decode_error());
    assert_eq!(cache.live_buffers(), 0);
}

#[test]
#[should_panic(expected = "double release")]
fn double_release_is_fatal() {
    let cache = BufferCache::new();
    let t = rgba(&cache, 1, 1);
    let key = t.key();
    t.dispose();
    cache.release(key);
}

#[test]
fn decoded_metadata_reaches_texture() {
    let cache = BufferCache::new();
    let tex = SourceId::from_key("tiled.tga");
    let t = WorkingTexture::from_source(&cache, tex, || {
        Ok(DecodedImage::new(vec![Rgba::WHITE; 4], 2, 2, TextureFormat::Rgba32, false)
            .with_wrap_mode(WrapMode::Mirror)
            .with_name("tiled"))
    })
    .expect("load");
    assert_eq!(t.name(), "tiled");
    assert_eq!(t.wrap_mode(), WrapMode::Mirror);
    assert_eq!(t.format(), TextureFormat::Rgba32);
    assert!(!t.linear());
}

#[test]
fn export_through_sink() {
    let cache = BufferCache::new();
    let mut t = WorkingTexture::new(&cache, TextureFormat::Rgb24, 1, 2, false).expect("new");
    t.set_name("strip");
    t.set_pixel(0, 1, Rgba::RED).expect("set");

    let platform = t.to_platform(&mut MemorySink).expect("export");
    assert_eq!(platform.bytes, vec![0, 0, 0, 255, 0, 0]);
    assert_eq!(platform.name, "strip");
    assert!(!platform.linear);
}

#[test]
fn handles_work_across_threads() {
    let cache = BufferCache::new();
    let mut base = rgba(&cache, 4, 4);
    base.fill(Rgba::WHITE);

    let workers: Vec<_> = (0..4u32)
        .map(|i| {
            let mut t = base.clone();
            std::thread::spawn(move || {
                t.set_pixel(i, i, Rgba::BLACK).expect("set");
                t
            })
        })
        .collect();
    let results: Vec<_> = workers.into_iter().map(|h| h.join().expect("join")).collect();

    for (i, t) in results.iter().enumerate() {
        let i = i as u32;
        assert_eq!(t.pixel(i, i).expect("get"), Rgba::BLACK);
    }
    assert_eq!(base.pixel(0, 0).expect("get"), Rgba::WHITE);
    assert_eq!(base.ref_count(), 1);
    drop(results);
    drop(base);
    assert_eq!(cache.live_buffers(), 0);
}

#[test]
fn load_file_twice_shares_buffer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tex.png");
    let mut src = rgba(&BufferCache::new(), 3, 3);
    src.fill(Rgba::GREEN);
    worktex_io::png::write(&path, &src.to_external()).expect("write png");

    let cache = BufferCache::new();
    let registry = DecoderRegistry::with_builtin();
    let a = WorkingTexture::load(&cache, &registry, &path).expect("load");
    let b = WorkingTexture::load(&cache, &registry, dir.path().join(".").join("tex.png")).expect("load");

    assert!(a.same_buffer(&b));
    assert_eq!(a.name(), "tex");
    assert_eq!(a.pixel(2, 2).expect("get"), Rgba::GREEN);
    assert_eq!(cache.stats().hits, 1);
}
