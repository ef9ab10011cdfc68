use anim_atlas_core::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};
use rand::{Rng, SeedableRng};

fn random_set(seed: u64) -> SourceSet {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut images = Vec::new();
    for i in 0..6 {
        let w = rng.gen_range(5..40);
        let h = rng.gen_range(5..40);
        let mut img = RgbaImage::new(w, h);
        for px in img.pixels_mut() {
            *px = Rgba([
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
            ]);
        }
        images.push(
            SourceImage::new(
                format!("f{i}.tga"),
                FormatTag::Tga,
                DynamicImage::ImageRgba8(img),
            )
            .expect("source"),
        );
    }
    SourceSet::from_images(images).expect("set")
}

#[test]
fn same_inputs_yield_identical_buffers() {
    let cfg = AtlasConfig::builder().atlas_size(256).build();
    let a = build_atlas(random_set(42), &cfg).expect("pack");
    let b = build_atlas(random_set(42), &cfg).expect("pack");
    assert_eq!(a.color.as_raw(), b.color.as_raw());
    assert_eq!(
        a.alpha.as_ref().map(|m| m.as_raw()),
        b.alpha.as_ref().map(|m| m.as_raw())
    );
    assert_eq!(a.frames.len(), b.frames.len());
}

#[test]
fn filters_are_deterministic_individually() {
    for filter in [
        ResizeFilter::Nearest,
        ResizeFilter::Bilinear,
        ResizeFilter::CatmullRom,
        ResizeFilter::Lanczos3,
    ] {
        let cfg = AtlasConfig::builder().atlas_size(128).filter(filter).build();
        let a = build_atlas(random_set(9), &cfg).expect("pack");
        let b = build_atlas(random_set(9), &cfg).expect("pack");
        assert_eq!(a.color.as_raw(), b.color.as_raw(), "{filter:?} diverged");
    }
}
