//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Project** | [`project`]: tile rectangles for a mode and image size |
//! | **Decode** | `image::ImageReader` |
//! | **Draw scaled** | `crop_imm` + `resize` (Lanczos3) |
//! | **Encode** | PNG / JPEG / WebP encoders from `image` |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for rectangle math (unit testable)
//! - **Parameters**: Filter, format, and quality settings
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod geometry;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, SourceImage, Surface};
pub use geometry::{
    Capture, Clamp, GeometryError, MAX_PREVIEW_DIMENSION, OutputScale, PixelSize, Projection,
    Rect, TileProjection, calculate_capture, project,
};
pub use params::{Filter, OutputFormat, Quality};
pub use rust_backend::RustBackend;
