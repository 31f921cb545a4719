//! Projection engine: pure rectangle math from (mode, image size) to tiles.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Source rectangles depend only on the mode and the image size. The output
//! scale only changes the destination size of each tile:
//!
//! - [`OutputScale::Preview`] → the mode's fixed preview size (e.g. 150×150).
//! - [`OutputScale::Native`] → the source rectangle's own size, so exports are
//!   crops at original resolution.
//!
//! Preview and export therefore share one code path and cannot drift apart.

use crate::layout::{Arrangement, AspectRatio, Column, Mode, layout};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate geometry for {mode} at {width}x{height}: {reason}")]
    Degenerate {
        mode: Mode,
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Largest preview edge `project` will hand out. A very narrow, very tall
/// image would otherwise ask for ARTWORK previews millions of pixels high.
pub const MAX_PREVIEW_DIMENSION: u32 = 16_384;

/// Which destination size to project to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputScale {
    Preview,
    Native,
}

/// A rectangle in source-image pixel space. Coordinates may be fractional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Snap to whole pixels for cropping, clamped into `image_w × image_h`.
    ///
    /// Returns `(x, y, width, height)`, always at least 1×1.
    pub fn pixel_bounds(&self, image_w: u32, image_h: u32) -> (u32, u32, u32, u32) {
        let max_x = image_w.saturating_sub(1);
        let max_y = image_h.saturating_sub(1);
        let x = (self.x.round().max(0.0) as u32).min(max_x);
        let y = (self.y.round().max(0.0) as u32).min(max_y);
        let w = (self.width.round() as u32).clamp(1, (image_w - x).max(1));
        let h = (self.height.round() as u32).clamp(1, (image_h - y).max(1));
        (x, y, w, h)
    }
}

/// Whole-pixel output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round fractional dimensions, never below one pixel.
    fn from_f64(width: f64, height: f64) -> Self {
        Self {
            width: (width.round() as u32).max(1),
            height: (height.round() as u32).max(1),
        }
    }
}

/// One projected tile: where to sample and how big to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileProjection {
    pub label: &'static str,
    pub source: Rect,
    pub dest: PixelSize,
}

/// Which image edge bounds a workshop capture region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Clamp {
    /// The full image width is used; height is derived from the ratio.
    Width,
    /// The full image height is used; width is derived from the ratio.
    Height,
}

/// The aspect-clamped region that workshop squares are spread across.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Capture {
    pub clamp: Clamp,
    pub width: f64,
    pub height: f64,
    /// Gap between neighbouring squares.
    pub separation: f64,
}

/// Result of [`project`]: one entry per tile, in tile order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub mode: Mode,
    pub scale: OutputScale,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<Capture>,
    pub tiles: Vec<TileProjection>,
}

/// Compute the capture region for `count` squares inside a region of
/// aspect ratio `ratio`, fitted into `width × height`.
///
/// The clamp decision is made on integers (`width·ah <= height·aw`, i.e.
/// `width / ratio <= height`) so images with exactly the target ratio always
/// clamp to width.
///
/// # Examples
/// ```
/// # use tile_cropper::imaging::{Clamp, calculate_capture};
/// # use tile_cropper::layout::AspectRatio;
/// let ratio = AspectRatio { width: 304, height: 150 };
/// let capture = calculate_capture(ratio, 2, 304, 150);
/// assert_eq!(capture.clamp, Clamp::Width);
/// assert_eq!((capture.width, capture.height), (304.0, 150.0));
/// assert_eq!(capture.separation, 4.0);
/// ```
pub fn calculate_capture(ratio: AspectRatio, count: u32, width: u32, height: u32) -> Capture {
    let (aw, ah) = (ratio.width as u64, ratio.height as u64);
    let clamp_to_width = width as u64 * ah <= height as u64 * aw;

    let (captured_w, captured_h, clamp) = if clamp_to_width {
        let h = width as f64 * ah as f64 / aw as f64;
        (width as f64, h, Clamp::Width)
    } else {
        let w = height as f64 * aw as f64 / ah as f64;
        (w, height as f64, Clamp::Height)
    };

    let separation = if count > 1 {
        (captured_w - count as f64 * captured_h) / (count - 1) as f64
    } else {
        0.0
    };

    Capture {
        clamp,
        width: captured_w,
        height: captured_h,
        separation,
    }
}

fn strip_tiles(
    logical_width: u32,
    columns: &[Column],
    width: u32,
    height: u32,
) -> Vec<(Rect, PixelSize)> {
    // Display units per source pixel.
    let ratio = logical_width as f64 / width as f64;
    let preview_height = height as f64 * ratio;

    columns
        .iter()
        .map(|column| {
            let source = Rect {
                x: column.offset as f64 / ratio,
                y: 0.0,
                width: column.width as f64 / ratio,
                height: height as f64,
            };
            let preview = PixelSize::from_f64(column.width as f64, preview_height);
            (source, preview)
        })
        .collect()
}

fn square_tiles(capture: &Capture, count: u32, preview: PixelSize) -> Vec<(Rect, PixelSize)> {
    let side = capture.height;
    (0..count)
        .map(|i| {
            let i = i as f64;
            let source = Rect {
                x: i * side + i * capture.separation,
                y: 0.0,
                width: side,
                height: side,
            };
            (source, preview)
        })
        .collect()
}

/// Project `mode` onto an image of `width × height` pixels.
///
/// Returns [`GeometryError::Degenerate`] for a zero-sized image, if any
/// computed dimension is not a positive finite number, or if a preview edge
/// exceeds [`MAX_PREVIEW_DIMENSION`].
pub fn project(
    mode: Mode,
    width: u32,
    height: u32,
    scale: OutputScale,
) -> Result<Projection, GeometryError> {
    let degenerate = |reason: String| GeometryError::Degenerate {
        mode,
        width,
        height,
        reason,
    };
    if width == 0 || height == 0 {
        return Err(degenerate("image has a zero dimension".into()));
    }

    let layout = layout(mode);
    let (capture, placed) = match layout.arrangement {
        Arrangement::Strip {
            logical_width,
            columns,
        } => (None, strip_tiles(logical_width, columns, width, height)),
        Arrangement::Squares { capture, count } => {
            let region = calculate_capture(capture, count, width, height);
            debug!(
                %mode,
                clamp = ?region.clamp,
                captured_width = region.width,
                captured_height = region.height,
                separation = region.separation,
                "captured area"
            );
            let spec = layout.tiles[0];
            let preview = PixelSize::new(spec.preview_width, spec.preview_height.nominal());
            (Some(region), square_tiles(&region, count, preview))
        }
    };

    let mut tiles = Vec::with_capacity(layout.tiles.len());
    for (spec, (source, preview)) in layout.tiles.iter().zip(placed) {
        let finite = [source.x, source.y, source.width, source.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || source.width <= 0.0 || source.height <= 0.0 {
            return Err(degenerate(format!(
                "tile '{}' has source rect {:?}",
                spec.label, source
            )));
        }
        let dest = match scale {
            OutputScale::Preview => preview,
            OutputScale::Native => PixelSize::from_f64(source.width, source.height),
        };
        // Native dests are bounded by the decoded image; previews are not.
        if scale == OutputScale::Preview
            && (dest.width > MAX_PREVIEW_DIMENSION || dest.height > MAX_PREVIEW_DIMENSION)
        {
            return Err(degenerate(format!(
                "tile '{}' preview would be {}x{} (limit {MAX_PREVIEW_DIMENSION})",
                spec.label, dest.width, dest.height
            )));
        }
        tiles.push(TileProjection {
            label: spec.label,
            source,
            dest,
        });
    }

    Ok(Projection {
        mode,
        scale,
        image_width: width,
        image_height: height,
        capture,
        tiles,
    })
}
