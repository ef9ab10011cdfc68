use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("cannot load source image {}: {message}", .path.display())]
    SourceLoad { path: PathBuf, message: String },
    #[error("atlas size {atlas_size} is too small for {image_count} images (cells would be empty)")]
    GridDegenerate { atlas_size: u32, image_count: usize },
    #[error("failed to export atlas to {}: {message}", .path.display())]
    Export { path: PathBuf, message: String },
    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AtlasError>;
