use anim_atlas_core::prelude::*;
use image::{DynamicImage, RgbImage, RgbaImage};

fn rgb_src(key: &str, format: FormatTag) -> SourceImage {
    SourceImage::new(key, format, DynamicImage::ImageRgb8(RgbImage::new(4, 4))).expect("source")
}

fn rgba_src(key: &str, format: FormatTag) -> SourceImage {
    SourceImage::new(key, format, DynamicImage::ImageRgba8(RgbaImage::new(4, 4))).expect("source")
}

#[test]
fn opaque_batch_needs_no_alpha() {
    let set = SourceSet::from_images(vec![
        rgb_src("a.jpg", FormatTag::Jpeg),
        rgb_src("b.tga", FormatTag::Tga),
        rgb_src("c.tif", FormatTag::Tiff),
    ])
    .expect("set");
    assert!(!needs_alpha(&set));
}

#[test]
fn one_four_channel_source_flips_the_batch() {
    let set = SourceSet::from_images(vec![
        rgb_src("a.jpg", FormatTag::Jpeg),
        rgba_src("b.tga", FormatTag::Tga),
        rgb_src("c.jpg", FormatTag::Jpeg),
    ])
    .expect("set");
    assert!(needs_alpha(&set));
}

#[test]
fn png_implies_alpha_even_when_decoded_as_rgb() {
    // Some codecs under-report channels; the capability table keeps the
    // batch alpha-aware regardless of what the decoder saw.
    let set = SourceSet::from_images(vec![rgb_src("a.png", FormatTag::Png)]).expect("set");
    assert!(needs_alpha(&set));
}

#[test]
fn single_rgba_source_is_enough() {
    let set = SourceSet::from_images(vec![rgba_src("only.tga", FormatTag::Tga)]).expect("set");
    assert!(needs_alpha(&set));
}

#[test]
fn format_capability_table() {
    assert!(FormatTag::Png.implies_alpha());
    for tag in [FormatTag::Jpeg, FormatTag::Tiff, FormatTag::Gif, FormatTag::Tga] {
        assert!(!tag.implies_alpha(), "{tag:?} should not imply alpha");
    }
}

#[test]
fn channel_metadata_is_cached() {
    let s = rgba_src("x.tga", FormatTag::Tga);
    assert_eq!(s.channel_count(), 4);
    assert!(s.has_alpha());
    let s = rgb_src("y.jpg", FormatTag::Jpeg);
    assert_eq!(s.channel_count(), 3);
    assert!(!s.has_alpha());
}
