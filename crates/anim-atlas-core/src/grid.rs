//! Uniform grid planning.
//!
//! The planner approximates a square grid from `sqrt(image_count)` and then
//! stretches it toward the aspect ratio of one sample image so cells waste
//! little area. This is a heuristic, not an optimal packer: rows and
//! columns derive from a single sample, so a batch of wildly varying
//! aspect ratios will be laid out poorly.

use crate::error::{AtlasError, Result};
use crate::model::GridPlan;

/// Computes the grid for `image_count` images on a square atlas of
/// `atlas_size` pixels, given the sample image's `width / height` ratio.
///
/// The axis suggested by the aspect ratio is raised to `ceil(count / other)`
/// when needed, so the grid always has a cell for every image and every
/// placement stays inside the canvas. Cell sizes floor, never round up.
pub fn plan_grid(atlas_size: u32, image_count: usize, sample_aspect: f64) -> Result<GridPlan> {
    if image_count == 0 {
        return Err(AtlasError::InvalidInput("no images to pack".into()));
    }
    if atlas_size == 0 {
        return Err(AtlasError::InvalidInput(
            "atlas size must be a positive number of pixels".into(),
        ));
    }
    if !(sample_aspect.is_finite() && sample_aspect > 0.0) {
        return Err(AtlasError::InvalidInput(format!(
            "sample aspect ratio must be positive, got {sample_aspect}"
        )));
    }

    let n = image_count as f64;
    let side = n.sqrt().round().max(1.0);

    let (columns, rows) = if sample_aspect >= 1.0 {
        // Wide or square frames: fix columns, derive rows.
        let columns = side as u32;
        let rows = (side / sample_aspect).round().max(1.0) as u32;
        (columns, rows.max((image_count as u32).div_ceil(columns)))
    } else {
        // Tall frames: fix rows, derive columns.
        let rows = side as u32;
        let columns = (side * sample_aspect).round().max(1.0) as u32;
        (columns.max((image_count as u32).div_ceil(rows)), rows)
    };

    let cell_w = atlas_size / columns;
    let cell_h = atlas_size / rows;
    if cell_w == 0 || cell_h == 0 {
        return Err(AtlasError::GridDegenerate {
            atlas_size,
            image_count,
        });
    }

    Ok(GridPlan {
        columns,
        rows,
        cell_w,
        cell_h,
    })
}
