//! Pixel-level operations: blitting resized frames into the shared canvas
//! and building per-frame alpha masks.

use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

/// Blit `src` into `canvas` with its top-left corner at (dx, dy).
/// Pixels falling outside the canvas are skipped.
pub fn blit_rgb(src: &RgbImage, canvas: &mut RgbImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        for xx in 0..sw {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
            }
        }
    }
}

/// Blit a single-channel mask into the alpha canvas at (dx, dy).
pub fn blit_gray(src: &GrayImage, canvas: &mut GrayImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        for xx in 0..sw {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
            }
        }
    }
}

/// Splits a resized RGBA frame into its color plane.
pub fn rgb_plane(src: &RgbaImage) -> RgbImage {
    let (w, h) = src.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = src.get_pixel(x, y);
        *px = Rgb([p[0], p[1], p[2]]);
    }
    out
}

/// Splits a resized RGBA frame into its alpha plane, used verbatim as the
/// frame's mask in the atlas alpha buffer.
pub fn alpha_plane(src: &RgbaImage) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        *px = Luma([src.get_pixel(x, y)[3]]);
    }
    out
}

/// Fully opaque mask for a 3-channel frame in an alpha-bearing batch.
pub fn opaque_mask(w: u32, h: u32) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([255]))
}

/// Synthesized mask for a 3-channel frame whose format implies alpha:
/// solid white everywhere except pixels matching the background key color,
/// which become fully transparent. `tolerance` is the maximum per-channel
/// distance from `background` that still counts as a match.
pub fn keyed_mask(src: &RgbImage, background: [u8; 3], tolerance: u8) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = src.get_pixel(x, y);
        let is_background = p
            .0
            .iter()
            .zip(background.iter())
            .all(|(&c, &b)| c.abs_diff(b) <= tolerance);
        *px = Luma([if is_background { 0 } else { 255 }]);
    }
    out
}
