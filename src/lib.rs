//! # Tile Cropper
//!
//! Crops a single image into a fixed set of tiles defined by a layout mode,
//! renders a preview of each tile, and packages native-resolution crops plus
//! previews into one zip archive.
//!
//! # Pipeline
//!
//! ```text
//! source  →  Session (decode + preview render)  →  export set  →  zip
//!            file / URL / data URI                 2 × tiles      <name>_<MODE>_<hex ms>.zip
//! ```
//!
//! The geometry is computed once per (mode, image size) by
//! [`imaging::project`]. Previews and exports share the same source rects and
//! only differ in destination size, so a preview always shows exactly the
//! pixels its exported original contains.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`layout`] | Mode registry: tiles, labels, preview sizes, column/square arrangement |
//! | [`imaging`] | Projection geometry, resampling parameters, backend trait + `image` crate backend |
//! | [`render`] | Draws a projection's source rects into preview or export surfaces |
//! | [`export`] | Builds the named, encoded export set from a session snapshot |
//! | [`archive`] | Zip packaging and archive naming |
//! | [`source`] | File, URL, and data URI inputs, plus basename derivation |
//! | [`session`] | The single editing session with last-load-wins semantics |
//! | [`config`] | `tile-cropper.toml` loading, validation, and merging |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Geometry, Two Scales
//!
//! A [`imaging::Projection`] carries source rects plus a destination size per
//! tile. The preview projection and the native projection of the same image
//! have identical source rects. Rendering is then a single loop over tiles
//! with no mode-specific code.
//!
//! ## Modes Are Data
//!
//! The three modes live in a static registry in [`layout`]. Adding a mode
//! means adding a table entry, not a branch in the renderer or exporter.
//!
//! ## Snapshot Exports
//!
//! [`session::Session::export_request`] copies everything an export needs.
//! The image is shared through an `Arc`, previews are cloned, so a load or
//! mode switch during an export cannot leak into the archive.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling, and encoding use the `image` crate. No system
//! libraries are needed, and tests substitute a recording mock backend.

pub mod archive;
pub mod config;
pub mod export;
pub mod imaging;
pub mod layout;
pub mod logging;
pub mod output;
pub mod render;
pub mod session;
pub mod source;
