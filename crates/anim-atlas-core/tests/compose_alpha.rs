use anim_atlas_core::prelude::*;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

fn cfg(size: u32) -> AtlasConfig {
    AtlasConfig::builder().atlas_size(size).build()
}

fn assert_cell_alpha(out: &AtlasOutput, cell: Rect, expected: u8) {
    let alpha = out.alpha.as_ref().expect("alpha buffer");
    for y in cell.y..cell.y + cell.h {
        for x in cell.x..cell.x + cell.w {
            assert_eq!(
                alpha.get_pixel(x, y)[0],
                expected,
                "mask mismatch at ({x},{y})"
            );
        }
    }
}

#[test]
fn jpeg_in_alpha_batch_gets_fully_opaque_mask() {
    // The RGBA source forces the batch to carry alpha; the 3-channel JPEG
    // frame must mask fully opaque, with no partial transparency from the
    // resize step leaking into the mask.
    let jpeg = SourceImage::new(
        "frame.jpg",
        FormatTag::Jpeg,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(33, 17, Rgb([10, 200, 30]))),
    )
    .expect("source");
    let rgba = SourceImage::new(
        "frame.tga",
        FormatTag::Tga,
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([5, 5, 5, 128]))),
    )
    .expect("source");
    let set = SourceSet::from_images(vec![jpeg, rgba]).expect("set");
    let out = build_atlas(set, &cfg(64)).expect("pack");
    let cell = out.frames[0].frame;
    assert_cell_alpha(&out, cell, 255);
}

#[test]
fn four_channel_alpha_plane_is_copied() {
    let jpeg = SourceImage::new(
        "frame.jpg",
        FormatTag::Jpeg,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]))),
    )
    .expect("source");
    let rgba = SourceImage::new(
        "frame.tga",
        FormatTag::Tga,
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([5, 5, 5, 128]))),
    )
    .expect("source");
    let set = SourceSet::from_images(vec![jpeg, rgba]).expect("set");
    let out = build_atlas(set, &cfg(64)).expect("pack");
    let cell = out.frames[1].frame;
    assert_cell_alpha(&out, cell, 128);
}

#[test]
fn keyed_background_in_rgb_png_masks_transparent() {
    // RGB-only PNGs: the capability table still forces an alpha channel.
    // A frame of pure background color masks fully transparent, a solid
    // foreground frame fully opaque.
    let bg = SourceImage::new(
        "bg.png",
        FormatTag::Png,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]))),
    )
    .expect("source");
    let fg = SourceImage::new(
        "fg.png",
        FormatTag::Png,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([250, 20, 20]))),
    )
    .expect("source");
    let set = SourceSet::from_images(vec![bg, fg]).expect("set");
    let out = build_atlas(set, &cfg(64)).expect("pack");
    assert_cell_alpha(&out, out.frames[0].frame, 0);
    assert_cell_alpha(&out, out.frames[1].frame, 255);
}

#[test]
fn background_tolerance_widens_the_key_match() {
    let near_bg = SourceImage::new(
        "near.png",
        FormatTag::Png,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([3, 2, 1]))),
    )
    .expect("source");
    let set = SourceSet::from_images(vec![near_bg]).expect("set");
    let cfg = AtlasConfig::builder()
        .atlas_size(64)
        .background_tolerance(4)
        .build();
    let out = build_atlas(set, &cfg).expect("pack");
    assert_cell_alpha(&out, out.frames[0].frame, 0);
}

#[test]
fn opaque_batch_has_no_alpha_buffer() {
    let a = SourceImage::new(
        "a.jpg",
        FormatTag::Jpeg,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([50, 60, 70]))),
    )
    .expect("source");
    let set = SourceSet::from_images(vec![a]).expect("set");
    let out = build_atlas(set, &cfg(64)).expect("pack");
    assert!(out.alpha.is_none());
    assert_eq!(out.meta.format, "RGB8");
}
