//! Render adapter: draw a projection into surfaces.
//!
//! The adapter owns no geometry. It walks the tiles of a [`Projection`],
//! sizes each target surface to the tile's destination, and asks the backend
//! to draw the tile's source rect scaled into it.

use crate::imaging::{BackendError, Filter, ImageBackend, Projection, SourceImage, Surface};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("projection has {tiles} tiles but {surfaces} surfaces were supplied")]
    SurfaceCount { tiles: usize, surfaces: usize },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Draw every tile of `projection` into the matching surface of `targets`.
///
/// Targets are resized to the tile's destination size first, so the draw
/// always covers the full surface.
pub fn render(
    backend: &impl ImageBackend,
    projection: &Projection,
    source: &SourceImage,
    targets: &mut [Surface],
    filter: Filter,
) -> Result<(), RenderError> {
    if targets.len() != projection.tiles.len() {
        return Err(RenderError::SurfaceCount {
            tiles: projection.tiles.len(),
            surfaces: targets.len(),
        });
    }

    for (tile, target) in projection.tiles.iter().zip(targets.iter_mut()) {
        target.resize(tile.dest);
        debug!(
            tile = tile.label,
            x = tile.source.x,
            y = tile.source.y,
            width = tile.source.width,
            height = tile.source.height,
            dest_width = tile.dest.width,
            dest_height = tile.dest.height,
            "draw"
        );
        backend.draw_scaled(source, tile.source, target, filter)?;
    }
    Ok(())
}

/// Render a projection into freshly allocated surfaces.
pub fn render_new(
    backend: &impl ImageBackend,
    projection: &Projection,
    source: &SourceImage,
    filter: Filter,
) -> Result<Vec<Surface>, RenderError> {
    let mut surfaces: Vec<Surface> = projection
        .tiles
        .iter()
        .map(|tile| Surface::blank(tile.dest))
        .collect();
    render(backend, projection, source, &mut surfaces, filter)?;
    Ok(surfaces)
}
