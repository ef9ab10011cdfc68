use crate::error::{AtlasError, Result};
use crate::pipeline::AtlasOutput;
use serde_json::{json, Value};
use std::path::Path;

/// Persists the composite at `path`, choosing the container by extension
/// (png, tga, ...). A 32-bit RGBA file is written when the atlas carries
/// an alpha buffer, a 24-bit RGB file otherwise. The codecs used here are
/// lossless for both containers, so per-pixel values survive export
/// exactly.
pub fn save_atlas(out: &AtlasOutput, path: &Path) -> Result<()> {
    let res = if out.alpha.is_some() {
        out.to_rgba().save(path)
    } else {
        out.color.save(path)
    };
    res.map_err(|e| AtlasError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize the frame map as a JSON object `{ frames, meta }`.
/// Suitable for generic tooling and simple consumption.
pub fn to_json_array(out: &AtlasOutput) -> Value {
    let frames: Vec<Value> = out
        .frames
        .iter()
        .map(|fr| {
            json!({
                "key": fr.key,
                "index": fr.index,
                "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
            })
        })
        .collect();
    json!({ "frames": frames, "meta": &out.meta })
}
