//! Batch-level alpha policy.
//!
//! The atlas carries an alpha channel when any source brings one along,
//! either as an explicit 4th channel or by convention of its container
//! format. The decision is made once over the whole set, before any
//! compositing, and never revisited per image.

use crate::pipeline::SourceSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Container format of a source image, derived from its file extension.
///
/// Carries the format-capability table: `implies_alpha` marks formats that
/// conventionally hold transparency even when a decoder reports fewer
/// channels for a particular file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Png,
    Jpeg,
    Tiff,
    Gif,
    Tga,
}

impl FormatTag {
    /// Maps a path's extension to its tag. `None` for unsupported files;
    /// the discovery layer is expected to filter those out beforehand.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "gif" => Some(Self::Gif),
            "tga" => Some(Self::Tga),
            _ => None,
        }
    }

    /// True for formats that conventionally carry transparency.
    pub fn implies_alpha(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl FromStr for FormatTag {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "tif" | "tiff" => Ok(Self::Tiff),
            "gif" => Ok(Self::Gif),
            "tga" => Ok(Self::Tga),
            _ => Err(()),
        }
    }
}

/// Decides whether the atlas needs an alpha channel: true iff any source
/// image decodes with an alpha channel or has an alpha-implying format.
pub fn needs_alpha(sources: &SourceSet) -> bool {
    sources
        .iter()
        .any(|s| s.has_alpha() || s.format.implies_alpha())
}
