use crate::alpha::{self, FormatTag};
use crate::canvas::{merge_rgba, AtlasCanvas};
use crate::compositing;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::grid::plan_grid;
use crate::model::{Frame, GridPlan, Meta};
use image::{imageops, DynamicImage, GrayImage, ImageReader, Limits, RgbImage, RgbaImage};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Upper bound on source dimensions; decoding rejects anything larger so a
/// malformed header cannot demand an unbounded allocation.
const MAX_SOURCE_DIM: u32 = 16_384;

/// One validated source image with cached metadata. Immutable once loaded.
pub struct SourceImage {
    pub key: String,
    pub format: FormatTag,
    image: DynamicImage,
    width: u32,
    height: u32,
    channels: u8,
    has_alpha: bool,
}

impl SourceImage {
    /// Wraps an already-decoded image. Rejects empty pixel data.
    pub fn new(key: impl Into<String>, format: FormatTag, image: DynamicImage) -> Result<Self> {
        let key = key.into();
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(AtlasError::InvalidInput(format!(
                "source image {key} has no pixels"
            )));
        }
        let color = image.color();
        Ok(Self {
            key,
            format,
            width,
            height,
            channels: color.channel_count(),
            has_alpha: color.has_alpha(),
            image,
        })
    }

    /// Decodes the file at `path`. Any failure (unsupported extension,
    /// unreadable file, corrupt or oversized data) is a `SourceLoad`
    /// error naming the offending path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let load_err = |message: String| AtlasError::SourceLoad {
            path: path.to_path_buf(),
            message,
        };
        let format = FormatTag::from_path(path).ok_or_else(|| {
            load_err("unsupported file extension (expected jpg, tiff, png, gif or tga)".into())
        })?;
        let mut reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| load_err(e.to_string()))?;
        let mut limits = Limits::default();
        limits.max_image_width = Some(MAX_SOURCE_DIM);
        limits.max_image_height = Some(MAX_SOURCE_DIM);
        reader.limits(limits);
        let image = reader.decode().map_err(|e| load_err(e.to_string()))?;
        let key = path.to_string_lossy().replace('\\', "/");
        Self::new(key, format, image)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    /// Channels as decoded: 3 = RGB, 4 = RGB + alpha.
    pub fn channel_count(&self) -> u8 {
        self.channels
    }
    /// True when the decoded pixel data carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Ordered, non-empty list of source images. The order is the caller's
/// discovery order and determines each image's grid position.
pub struct SourceSet {
    images: Vec<SourceImage>,
}

impl SourceSet {
    /// Decodes `paths` strictly in order. The first failure aborts the
    /// load; paths after it are never touched.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut images = Vec::with_capacity(paths.len());
        for p in paths {
            images.push(SourceImage::from_path(p.as_ref())?);
        }
        Self::from_images(images)
    }

    pub fn from_images(images: Vec<SourceImage>) -> Result<Self> {
        if images.is_empty() {
            return Err(AtlasError::InvalidInput("no source images supplied".into()));
        }
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &SourceImage> {
        self.images.iter()
    }
    /// The representative image the grid plan derives its aspect ratio
    /// from: the first one in discovery order.
    pub fn sample(&self) -> &SourceImage {
        &self.images[0]
    }
    fn into_images(self) -> Vec<SourceImage> {
        self.images
    }
}

/// Cooperative cancellation flag, checked between image iterations.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Finished atlas: the composited buffers plus the frame records and
/// metadata needed by exporters.
pub struct AtlasOutput {
    pub color: RgbImage,
    /// Present iff the batch required an alpha channel.
    pub alpha: Option<GrayImage>,
    pub frames: Vec<Frame>,
    pub plan: GridPlan,
    pub meta: Meta,
}

impl AtlasOutput {
    /// Merges the color and alpha buffers into one 32-bit image for
    /// export; fully opaque when no alpha buffer exists.
    pub fn to_rgba(&self) -> RgbaImage {
        merge_rgba(&self.color, self.alpha.as_ref())
    }
}

/// A frame resized to cell dimensions with its mask, ready to blit.
/// Produced independently per image, so preparation may run on worker
/// threads; writes into the canvas stay serialized in index order.
struct PreparedFrame {
    color: RgbImage,
    mask: Option<GrayImage>,
}

fn prepare_frame(
    src: &SourceImage,
    cell_w: u32,
    cell_h: u32,
    cfg: &AtlasConfig,
    batch_alpha: bool,
) -> PreparedFrame {
    let filter = cfg.filter.to_filter_type();
    if src.has_alpha() {
        let resized = imageops::resize(&src.image().to_rgba8(), cell_w, cell_h, filter);
        PreparedFrame {
            color: compositing::rgb_plane(&resized),
            mask: batch_alpha.then(|| compositing::alpha_plane(&resized)),
        }
    } else {
        let resized = imageops::resize(&src.image().to_rgb8(), cell_w, cell_h, filter);
        let mask = batch_alpha.then(|| {
            if src.format.implies_alpha() {
                compositing::keyed_mask(&resized, cfg.background, cfg.background_tolerance)
            } else {
                compositing::opaque_mask(cell_w, cell_h)
            }
        });
        PreparedFrame {
            color: resized,
            mask,
        }
    }
}

/// Builds one atlas from `sources` using `cfg`.
///
/// The run is all-or-nothing: any error aborts the remaining images and no
/// partial atlas is returned. Output is deterministic for a given ordered
/// input set, size and filter.
pub fn build_atlas(sources: SourceSet, cfg: &AtlasConfig) -> Result<AtlasOutput> {
    build_atlas_cancellable(sources, cfg, &CancelToken::new())
}

/// Decodes `paths` in order, then builds the atlas from them.
pub fn build_atlas_from_paths<P: AsRef<Path>>(paths: &[P], cfg: &AtlasConfig) -> Result<AtlasOutput> {
    build_atlas(SourceSet::load(paths)?, cfg)
}

#[instrument(skip_all)]
/// Like `build_atlas`, but checks `cancel` between image iterations and
/// returns `Cancelled` once it is set.
pub fn build_atlas_cancellable(
    sources: SourceSet,
    cfg: &AtlasConfig,
    cancel: &CancelToken,
) -> Result<AtlasOutput> {
    cfg.validate()?;

    let plan = plan_grid(cfg.atlas_size, sources.len(), sources.sample().aspect_ratio())?;
    let with_alpha = alpha::needs_alpha(&sources);
    info!(
        columns = plan.columns,
        rows = plan.rows,
        cell_w = plan.cell_w,
        cell_h = plan.cell_h,
        with_alpha,
        "planned atlas grid"
    );

    let mut canvas = AtlasCanvas::new(cfg.atlas_size, cfg.background, with_alpha);
    let mut frames: Vec<Frame> = Vec::with_capacity(sources.len());

    // Parallel prepare path (optional): frames resize independently, the
    // canvas writes stay serialized in index order.
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            if cancel.is_cancelled() {
                return Err(AtlasError::Cancelled);
            }
            let prepared: Vec<(String, PreparedFrame)> = sources
                .into_images()
                .into_par_iter()
                .map(|src| {
                    let p = prepare_frame(&src, plan.cell_w, plan.cell_h, cfg, with_alpha);
                    (src.key, p)
                })
                .collect();
            for (index, (key, prep)) in prepared.into_iter().enumerate() {
                if cancel.is_cancelled() {
                    return Err(AtlasError::Cancelled);
                }
                write_frame(&mut canvas, &plan, index, &prep);
                frames.push(Frame {
                    key,
                    index,
                    frame: plan.placement(index).rect,
                });
            }
            return Ok(finalize(canvas, frames, plan, cfg, with_alpha));
        }
    }

    for (index, src) in sources.into_images().into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(AtlasError::Cancelled);
        }
        let prep = prepare_frame(&src, plan.cell_w, plan.cell_h, cfg, with_alpha);
        write_frame(&mut canvas, &plan, index, &prep);
        debug!(index, key = %src.key, "composited frame");
        frames.push(Frame {
            key: src.key,
            index,
            frame: plan.placement(index).rect,
        });
    }

    Ok(finalize(canvas, frames, plan, cfg, with_alpha))
}

fn write_frame(canvas: &mut AtlasCanvas, plan: &GridPlan, index: usize, prep: &PreparedFrame) {
    let rect = plan.placement(index).rect;
    compositing::blit_rgb(&prep.color, canvas.color_mut(), rect.x, rect.y);
    if let (Some(mask), Some(alpha)) = (&prep.mask, canvas.alpha_mut()) {
        compositing::blit_gray(mask, alpha, rect.x, rect.y);
    }
}

fn finalize(
    canvas: AtlasCanvas,
    frames: Vec<Frame>,
    plan: GridPlan,
    cfg: &AtlasConfig,
    with_alpha: bool,
) -> AtlasOutput {
    let (color, alpha) = canvas.into_parts();
    let meta = Meta {
        app: "anim-atlas".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        format: if with_alpha { "RGBA8" } else { "RGB8" }.into(),
        atlas_size: cfg.atlas_size,
        columns: plan.columns,
        rows: plan.rows,
        cell: (plan.cell_w, plan.cell_h),
        background: cfg.background,
    };
    AtlasOutput {
        color,
        alpha,
        frames,
        plan,
        meta,
    }
}
