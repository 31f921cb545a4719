//! The single editing session: one image, one mode, one set of previews.
//!
//! State only changes through three transitions:
//!
//! | Transition | Effect |
//! |---|---|
//! | [`Session::begin_load`] + [`Session::complete_load`] | Replace image + basename, re-render previews |
//! | [`Session::switch_mode`] | Rebuild one preview per tile of the new mode, re-render |
//! | [`Session::export_request`] | Read-only snapshot for the export assembler |
//!
//! Loads and mode switches render into fresh surfaces and only commit once
//! every tile has drawn, so a failure leaves the session exactly as it was.
//!
//! ## Last load wins
//!
//! Loading is split in two so the slow part (fetch + decode) can happen
//! outside the session. Each `begin_load` hands out a [`LoadTicket`] and makes
//! every earlier ticket stale. Completing a stale ticket is a no-op that
//! reports [`LoadOutcome::Superseded`], so an old load that finishes late can
//! never overwrite a newer one.

use crate::export::ExportRequest;
use crate::imaging::{
    BackendError, Filter, GeometryError, ImageBackend, OutputScale, PixelSize, Projection,
    SourceImage, Surface, project,
};
use crate::layout::{Mode, tile_specs};
use crate::render::{RenderError, render_new};
use crate::source::{ImageSource, SourceError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no image loaded")]
    NoImage,
}

/// Proof that a load was started; only the newest ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started after this one; nothing changed.
    Superseded,
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    filter: Filter,
    image: Option<Arc<SourceImage>>,
    basename: Option<String>,
    previews: Vec<Surface>,
    /// Preview projection of the current image in the current mode.
    projection: Option<Projection>,
    generation: u64,
}

/// Blank preview surfaces at the registry's nominal sizes.
fn nominal_previews(mode: Mode) -> Vec<Surface> {
    tile_specs(mode)
        .iter()
        .map(|spec| {
            Surface::blank(PixelSize::new(
                spec.preview_width,
                spec.preview_height.nominal(),
            ))
        })
        .collect()
}

impl Session {
    pub fn new(mode: Mode, filter: Filter) -> Self {
        Self {
            mode,
            filter,
            image: None,
            basename: None,
            previews: nominal_previews(mode),
            projection: None,
            generation: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_deref()
    }

    pub fn basename(&self) -> Option<&str> {
        self.basename.as_deref()
    }

    pub fn previews(&self) -> &[Surface] {
        &self.previews
    }

    /// Where the previews were sampled from; `None` until an image loads.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Start a load. Any ticket handed out before this one becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Finish a load started with `ticket`.
    ///
    /// On error the session keeps its previous image and previews.
    pub fn complete_load(
        &mut self,
        backend: &impl ImageBackend,
        ticket: LoadTicket,
        image: SourceImage,
        basename: String,
    ) -> Result<LoadOutcome, SessionError> {
        if ticket.0 != self.generation {
            warn!(%basename, "discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        let projection = project(self.mode, image.width(), image.height(), OutputScale::Preview)?;
        let previews = render_new(backend, &projection, &image, self.filter)?;

        info!(
            %basename,
            width = image.width(),
            height = image.height(),
            mode = %self.mode,
            "image loaded"
        );
        self.image = Some(Arc::new(image));
        self.basename = Some(basename);
        self.previews = previews;
        self.projection = Some(projection);
        Ok(LoadOutcome::Applied)
    }

    /// Fetch, decode, and apply `source` in one go.
    pub fn load(
        &mut self,
        backend: &impl ImageBackend,
        source: &ImageSource,
    ) -> Result<LoadOutcome, SessionError> {
        let ticket = self.begin_load();
        let fetched = source.fetch()?;
        debug!(bytes = fetched.bytes.len(), "decoding");
        let image = backend.decode(&fetched.bytes)?;
        self.complete_load(backend, ticket, image, fetched.basename)
    }

    /// Switch layouts. Previews are rebuilt for the new mode's tiles and,
    /// when an image is loaded, re-rendered.
    ///
    /// On error the session keeps its previous mode and previews.
    pub fn switch_mode(
        &mut self,
        backend: &impl ImageBackend,
        mode: Mode,
    ) -> Result<(), SessionError> {
        let (previews, projection) = match &self.image {
            Some(image) => {
                let projection =
                    project(mode, image.width(), image.height(), OutputScale::Preview)?;
                let previews = render_new(backend, &projection, image, self.filter)?;
                (previews, Some(projection))
            }
            None => (nominal_previews(mode), None),
        };

        info!(%mode, "switched mode");
        self.mode = mode;
        self.previews = previews;
        self.projection = projection;
        Ok(())
    }

    /// Snapshot everything an export needs.
    pub fn export_request(&self) -> Result<ExportRequest, SessionError> {
        let image = self.image.clone().ok_or(SessionError::NoImage)?;
        Ok(ExportRequest {
            mode: self.mode,
            image,
            previews: self.previews.clone(),
            basename: self
                .basename
                .clone()
                .unwrap_or_else(|| crate::source::DEFAULT_BASENAME.to_string()),
        })
    }
}
