use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if `self` and `r` share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        self.x <= r.right() && r.x <= self.right() && self.y <= r.bottom() && r.y <= self.bottom()
    }
}

/// Uniform grid layout for one atlas run.
///
/// Computed once from the atlas size, the image count and the aspect ratio
/// of a single sample image, then immutable. All cells share one size, and
/// `columns * cell_w <= atlas_size` / `rows * cell_h <= atlas_size` hold
/// because cell sizes are floored, never rounded up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridPlan {
    pub columns: u32,
    pub rows: u32,
    pub cell_w: u32,
    pub cell_h: u32,
}

impl GridPlan {
    /// Number of cells the grid can hold.
    pub fn capacity(&self) -> usize {
        (self.columns as usize) * (self.rows as usize)
    }

    /// Derives the placement for source image `index`, row-major:
    /// `column = index % columns`, `row = index / columns`.
    pub fn placement(&self, index: usize) -> FramePlacement {
        let col = (index as u32) % self.columns;
        let row = (index as u32) / self.columns;
        FramePlacement {
            index,
            rect: Rect::new(col * self.cell_w, row * self.cell_h, self.cell_w, self.cell_h),
        }
    }
}

/// Pairs a source image index with its target cell in the atlas.
/// Derived purely from the index and the grid plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FramePlacement {
    pub index: usize,
    pub rect: Rect,
}

/// A composited frame record kept in the output for metadata export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// User-specified key (e.g., filename or asset path).
    pub key: String,
    /// Position of the source image in discovery order.
    pub index: usize,
    /// Cell rectangle the frame was composited into.
    pub frame: Rect,
}

/// Atlas-level metadata (fields used by exporters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub app: String,
    pub version: String,
    /// Pixel format of the composite: "RGB8" or "RGBA8".
    pub format: String,
    pub atlas_size: u32,
    pub columns: u32,
    pub rows: u32,
    pub cell: (u32, u32),
    pub background: [u8; 3],
}
