//! Export assembler: native crops plus previews, encoded and named.
//!
//! An export works from an [`ExportRequest`] snapshot taken when the export
//! was asked for. It holds its own handle on the image and its own copy of
//! the preview pixels, so loading another image or switching modes while the
//! export runs cannot change what ends up in the archive.
//!
//! ## File naming
//!
//! Two entries per tile, tile by tile:
//!
//! ```text
//! <basename>_<label>_original.<ext>   native-resolution crop
//! <basename>_<label>_scaled.<ext>     the on-screen preview
//! ```
//!
//! Labels are `left`/`right` for ARTWORK and `0`, `1`, … for the workshop modes.

use crate::imaging::{
    BackendError, Filter, GeometryError, ImageBackend, OutputFormat, OutputScale, Quality,
    SourceImage, Surface, project,
};
use crate::layout::Mode;
use crate::render::{RenderError, render_new};
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("{mode} needs {expected} previews, snapshot has {actual}")]
    PreviewMismatch {
        mode: Mode,
        expected: usize,
        actual: usize,
    },
}

/// Everything an export needs, captured at request time.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub mode: Mode,
    pub image: Arc<SourceImage>,
    pub previews: Vec<Surface>,
    pub basename: String,
}

/// Encoding settings for exported files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub format: OutputFormat,
    pub quality: Quality,
    /// Filter for the native crop. Native crops are 1:1, so this only
    /// matters when a tile rounds to a different size than its source rect.
    pub filter: Filter,
}

/// One file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `<basename>_<label>_<kind>.<ext>`
pub fn export_file_name(basename: &str, label: &str, kind: &str, format: OutputFormat) -> String {
    format!("{basename}_{label}_{kind}.{}", format.extension())
}

/// Build the `2 × tile count` archive entries for `request`.
pub fn build_export_set(
    backend: &impl ImageBackend,
    request: &ExportRequest,
    options: &ExportOptions,
) -> Result<Vec<ExportEntry>, ExportError> {
    let image = request.image.as_ref();
    let projection = project(
        request.mode,
        image.width(),
        image.height(),
        OutputScale::Native,
    )?;

    if request.previews.len() != projection.tiles.len() {
        return Err(ExportError::PreviewMismatch {
            mode: request.mode,
            expected: projection.tiles.len(),
            actual: request.previews.len(),
        });
    }

    info!(
        mode = %request.mode,
        basename = %request.basename,
        tiles = projection.tiles.len(),
        "preparing export"
    );

    let originals = render_new(backend, &projection, image, options.filter)?;

    // (filename, surface) in archive order: original then scaled, per tile
    let jobs: Vec<(String, &Surface)> = projection
        .tiles
        .iter()
        .zip(originals.iter().zip(request.previews.iter()))
        .flat_map(|(tile, (original, preview))| {
            [
                (
                    export_file_name(&request.basename, tile.label, "original", options.format),
                    original,
                ),
                (
                    export_file_name(&request.basename, tile.label, "scaled", options.format),
                    preview,
                ),
            ]
        })
        .collect();

    let entries = jobs
        .into_par_iter()
        .map(|(filename, surface)| {
            let bytes = backend.encode(surface, options.format, options.quality)?;
            Ok(ExportEntry { filename, bytes })
        })
        .collect::<Result<Vec<_>, BackendError>>()?;

    Ok(entries)
}
