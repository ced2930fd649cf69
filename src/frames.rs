//! Frame loading and fit-to-canvas scaling for the preview pane.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Preview canvas dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
        }
    }
}

/// A decoded frame already scaled to the canvas.
#[derive(Clone, Debug)]
pub struct Frame {
    /// File the frame was decoded from.
    pub source: PathBuf,
    pub image: RgbaImage,
}

/// Scaled frames of the currently selected theme.
#[derive(Clone, Debug, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

/// Shrink `(width, height)` to fit the canvas, never enlarging it.
///
/// Dimensions are truncated and kept at least one pixel.
pub fn fit_dimensions(width: u32, height: u32, canvas: CanvasSize) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }
    let scale_w = canvas.width as f64 / width as f64;
    let scale_h = canvas.height as f64 / height as f64;
    let scale = scale_w.min(scale_h).min(1.0);
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    (new_width, new_height)
}

/// Decode one frame and scale it to fit the canvas.
pub fn load_frame(path: &Path, canvas: CanvasSize) -> Result<Frame> {
    let image = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let (fit_width, fit_height) = fit_dimensions(width, height, canvas);
    let image = if (fit_width, fit_height) == (width, height) {
        image
    } else {
        imageops::resize(&image, fit_width, fit_height, FilterType::Triangle)
    };
    Ok(Frame {
        source: path.to_path_buf(),
        image,
    })
}

/// Load every frame eagerly, skipping (and logging) the ones that fail.
pub fn load_frames(paths: &[PathBuf], canvas: CanvasSize) -> FrameSequence {
    let frames = paths
        .iter()
        .filter_map(|path| match load_frame(path, canvas) {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::warn!("error loading frame: {err:#}");
                None
            }
        })
        .collect();
    FrameSequence { frames }
}
