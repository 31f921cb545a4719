//! Image backend trait and the pixel containers it works on.
//!
//! The [`ImageBackend`] trait defines the three operations the cropper needs
//! from a drawing library: decode, draw a source rect scaled into a surface,
//! and encode a surface.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::geometry::{PixelSize, Rect};
use super::params::{Filter, OutputFormat, Quality};
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// A decoded source bitmap. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// A drawable RGBA target.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Transparent surface of the given size.
    pub fn blank(size: PixelSize) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.pixels.width(), self.pixels.height())
    }

    /// Resize to `size`, discarding the contents if the size changes.
    pub fn resize(&mut self, size: PixelSize) {
        if self.size() != size {
            self.pixels = RgbaImage::new(size.width, size.height);
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }
}

/// Trait for image backends.
///
/// Every backend must implement all three operations so the rest of the
/// codebase is backend-agnostic. `Sync` so encoding can run on rayon.
pub trait ImageBackend: Sync {
    /// Decode raw image bytes (format sniffed from content).
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, BackendError>;

    /// Draw `source_rect` of `source` scaled to fill all of `target`.
    fn draw_scaled(
        &self,
        source: &SourceImage,
        source_rect: Rect,
        target: &mut Surface,
        filter: Filter,
    ) -> Result<(), BackendError>;

    /// Encode a surface to file bytes.
    fn encode(
        &self,
        surface: &Surface,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<PixelSize>>,
        pub fail_draws: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Draw {
            source: Rect,
            target: PixelSize,
            filter: Filter,
        },
        Encode {
            size: PixelSize,
            format: OutputFormat,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Each `decode` pops the last size and returns a blank image of it.
        pub fn with_images(sizes: Vec<PixelSize>) -> Self {
            Self {
                decode_results: Mutex::new(sizes),
                ..Self::default()
            }
        }

        pub fn failing_draws() -> Self {
            Self {
                fail_draws: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn draws(&self) -> Vec<(Rect, PixelSize)> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Draw { source, target, .. } => Some((source, target)),
                    _ => None,
                })
                .collect()
        }
    }

    /// Blank source image for tests that never decode.
    pub fn blank_source(width: u32, height: u32) -> SourceImage {
        SourceImage::new(RgbaImage::new(width, height))
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<SourceImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(bytes.len()));

            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .map(|size| blank_source(size.width, size.height))
                .ok_or_else(|| BackendError::Decode("No mock image".to_string()))
        }

        fn draw_scaled(
            &self,
            _source: &SourceImage,
            source_rect: Rect,
            target: &mut Surface,
            filter: Filter,
        ) -> Result<(), BackendError> {
            if self.fail_draws {
                return Err(BackendError::Render("mock draw failure".to_string()));
            }
            self.operations.lock().unwrap().push(RecordedOp::Draw {
                source: source_rect,
                target: target.size(),
                filter,
            });
            Ok(())
        }

        fn encode(
            &self,
            surface: &Surface,
            format: OutputFormat,
            _quality: Quality,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                size: surface.size(),
                format,
            });
            let size = surface.size();
            Ok(format!("{}x{}.{}", size.width, size.height, format.extension()).into_bytes())
        }
    }

    #[test]
    fn mock_decode_returns_sized_image() {
        let backend = MockBackend::with_images(vec![PixelSize::new(800, 600)]);

        let image = backend.decode(b"fake").unwrap();
        assert_eq!((image.width(), image.height()), (800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode(4)]);
    }

    #[test]
    fn mock_decode_without_results_fails() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.decode(b"x"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn surface_resize_keeps_same_size_contents() {
        let mut surface = Surface::blank(PixelSize::new(2, 2));
        surface.pixels_mut().put_pixel(0, 0, image::Rgba([1, 2, 3, 4]));

        surface.resize(PixelSize::new(2, 2));
        assert_eq!(surface.pixels().get_pixel(0, 0).0, [1, 2, 3, 4]);

        surface.resize(PixelSize::new(3, 1));
        assert_eq!(surface.size(), PixelSize::new(3, 1));
        assert_eq!(surface.pixels().get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
