use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Resampling filter used when fitting a source image into its cell.
///
/// The filter is part of the output contract: the same filter on the same
/// inputs yields byte-identical atlases across runs and platforms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour (hard edges, exact palette preservation).
    Nearest,
    /// Bilinear (`Triangle`); the default.
    Bilinear,
    /// Catmull-Rom cubic.
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl ResizeFilter {
    pub fn to_filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "triangle" => Ok(Self::Bilinear),
            "catmullrom" | "cubic" => Ok(Self::CatmullRom),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Edge length of the square atlas canvas in pixels.
    pub atlas_size: u32,
    /// Canvas background color; also the key color for synthesized masks.
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Per-channel distance from `background` below which a pixel of an
    /// alpha-implying 3-channel source is masked transparent. 0 = exact match.
    #[serde(default)]
    pub background_tolerance: u8,
    /// Resampling filter for the per-cell resize.
    #[serde(default = "default_filter")]
    pub filter: ResizeFilter,
    /// Prepare frames (resize + mask) on worker threads when the crate is
    /// built with the `parallel` feature. Canvas writes stay serialized.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            atlas_size: 512,
            background: default_background(),
            background_tolerance: 0,
            filter: default_filter(),
            parallel: false,
        }
    }
}

fn default_background() -> [u8; 3] {
    [0, 0, 0]
}
fn default_filter() -> ResizeFilter {
    ResizeFilter::Bilinear
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;
        if self.atlas_size == 0 {
            return Err(AtlasError::InvalidInput(
                "atlas size must be a positive number of pixels".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn atlas_size(mut self, v: u32) -> Self {
        self.cfg.atlas_size = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn background_tolerance(mut self, v: u8) -> Self {
        self.cfg.background_tolerance = v;
        self
    }
    pub fn filter(mut self, v: ResizeFilter) -> Self {
        self.cfg.filter = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}
