//! The mutable pixel buffers assembled during one run.

use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// Color buffer plus optional alpha buffer, both `size x size`.
///
/// Owned exclusively by one assembler run: the compositor mutates it in
/// place, and it is converted into an immutable output once the last frame
/// is written. The color buffer starts filled with the background color;
/// the alpha buffer starts fully transparent.
pub struct AtlasCanvas {
    size: u32,
    color: RgbImage,
    alpha: Option<GrayImage>,
}

impl AtlasCanvas {
    pub fn new(size: u32, background: [u8; 3], with_alpha: bool) -> Self {
        Self {
            size,
            color: RgbImage::from_pixel(size, size, Rgb(background)),
            alpha: with_alpha.then(|| GrayImage::from_pixel(size, size, Luma([0]))),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn color_mut(&mut self) -> &mut RgbImage {
        &mut self.color
    }

    /// `None` when the batch did not require an alpha channel.
    pub fn alpha_mut(&mut self) -> Option<&mut GrayImage> {
        self.alpha.as_mut()
    }

    /// Finishes the run, releasing the buffers for export.
    pub fn into_parts(self) -> (RgbImage, Option<GrayImage>) {
        (self.color, self.alpha)
    }
}

/// Merges a color buffer and an optional alpha buffer into one RGBA image.
/// A missing alpha buffer yields a fully opaque result.
pub fn merge_rgba(color: &RgbImage, alpha: Option<&GrayImage>) -> RgbaImage {
    let (w, h) = color.dimensions();
    let mut out = RgbaImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let Rgb([r, g, b]) = *color.get_pixel(x, y);
        let a = alpha.map_or(255, |m| m.get_pixel(x, y)[0]);
        *px = Rgba([r, g, b, a]);
    }
    out
}
