//! Core library for merging animation frames into one fixed-size atlas.
//!
//! - Layout: a uniform grid derived from the frame count and the aspect
//!   ratio of one sample frame (`grid::plan_grid`)
//! - Compositing: each frame is resized to its cell and blitted into a
//!   shared canvas; a combined alpha channel is synthesized when any
//!   source carries (or implies) transparency
//! - Pipeline: `build_atlas` takes in-memory images,
//!   `build_atlas_from_paths` decodes files in order; both are
//!   all-or-nothing and deterministic
//!
//! Quick example:
//! ```ignore
//! use anim_atlas_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let cfg = AtlasConfig::builder().atlas_size(1024).build();
//! let out = build_atlas_from_paths(&["frames/walk_0.png", "frames/walk_1.png"], &cfg)?;
//! save_atlas(&out, "atlas.png".as_ref())?;
//! # Ok(()) }
//! ```

pub mod alpha;
pub mod canvas;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod model;
pub mod pipeline;

pub use alpha::*;
pub use canvas::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use grid::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `anim_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::alpha::{needs_alpha, FormatTag};
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder, ResizeFilter};
    pub use crate::export::{save_atlas, to_json_array};
    pub use crate::grid::plan_grid;
    pub use crate::model::{Frame, FramePlacement, GridPlan, Meta, Rect};
    pub use crate::pipeline::{
        build_atlas, build_atlas_cancellable, build_atlas_from_paths, AtlasOutput, CancelToken,
        SourceImage, SourceSet,
    };
}
