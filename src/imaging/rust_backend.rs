//! Pure Rust image backend on top of the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with content sniffing |
//! | Crop | `image::imageops::crop_imm` on the pixel-snapped source rect |
//! | Scale | `image::imageops::resize` with the configured filter (Lanczos3 by default) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha flattened) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |

use super::backend::{BackendError, ImageBackend, SourceImage, Surface};
use super::geometry::Rect;
use super::params::{Filter, OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, imageops};
use std::io::Cursor;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        if reader.format().is_none() {
            return Err(BackendError::Decode("unrecognized image format".into()));
        }
        let decoded = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(BackendError::Decode("image has no pixels".into()));
        }
        Ok(SourceImage::new(decoded.to_rgba8()))
    }

    fn draw_scaled(
        &self,
        source: &SourceImage,
        source_rect: Rect,
        target: &mut Surface,
        filter: Filter,
    ) -> Result<(), BackendError> {
        let size = target.size();
        if size.width == 0 || size.height == 0 {
            return Err(BackendError::Render(format!(
                "target surface is {}x{}",
                size.width, size.height
            )));
        }

        let (x, y, w, h) = source_rect.pixel_bounds(source.width(), source.height());
        let cropped = imageops::crop_imm(source.pixels(), x, y, w, h).to_image();

        *target.pixels_mut() = if (w, h) == (size.width, size.height) {
            cropped
        } else {
            imageops::resize(&cropped, size.width, size.height, filter.to_filter_type())
        };
        Ok(())
    }

    fn encode(
        &self,
        surface: &Surface,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let pixels = surface.pixels();
        let (w, h) = pixels.dimensions();
        let mut buf = Vec::new();

        let result = match format {
            OutputFormat::Png => {
                PngEncoder::new(&mut buf).write_image(pixels.as_raw(), w, h, ExtendedColorType::Rgba8)
            }
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, quality.value() as u8).write_image(
                    rgb.as_raw(),
                    w,
                    h,
                    ExtendedColorType::Rgb8,
                )
            }
            OutputFormat::Webp => WebPEncoder::new_lossless(&mut buf).write_image(
                pixels.as_raw(),
                w,
                h,
                ExtendedColorType::Rgba8,
            ),
        };
        result.map_err(|e| BackendError::Encode(format!("{format}: {e}")))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::PixelSize;
    use image::{Rgba, RgbaImage};

    /// Encode a gradient test image as PNG bytes.
    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn decode_synthetic_png() {
        let backend = RustBackend::new();
        let image = backend.decode(&gradient_png(200, 150)).unwrap();
        assert_eq!((image.width(), image.height()), (200, 150));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let backend = RustBackend::new();
        let result = backend.decode(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_truncated_png_errors() {
        let backend = RustBackend::new();
        let bytes = gradient_png(64, 64);
        let result = backend.decode(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn draw_at_native_size_copies_pixels() {
        let backend = RustBackend::new();
        let source = backend.decode(&gradient_png(100, 50)).unwrap();
        let mut target = Surface::blank(PixelSize::new(20, 10));
        let rect = Rect {
            x: 30.0,
            y: 5.0,
            width: 20.0,
            height: 10.0,
        };

        backend
            .draw_scaled(&source, rect, &mut target, Filter::Lanczos3)
            .unwrap();

        assert_eq!(target.pixels().get_pixel(0, 0).0, [30, 5, 128, 255]);
        assert_eq!(target.pixels().get_pixel(19, 9).0, [49, 14, 128, 255]);
    }

    #[test]
    fn draw_scaled_fills_whole_target() {
        let backend = RustBackend::new();
        let source = backend.decode(&gradient_png(300, 300)).unwrap();
        let mut target = Surface::blank(PixelSize::new(150, 150));
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 300.0,
            height: 300.0,
        };

        backend
            .draw_scaled(&source, rect, &mut target, Filter::Triangle)
            .unwrap();

        assert_eq!(target.size(), PixelSize::new(150, 150));
        // Opaque everywhere, including the far corner
        assert_eq!(target.pixels().get_pixel(149, 149).0[3], 255);
    }

    #[test]
    fn encode_png_roundtrips_dimensions() {
        let backend = RustBackend::new();
        let surface = Surface::blank(PixelSize::new(40, 30));
        let bytes = backend
            .encode(&surface, OutputFormat::Png, Quality::default())
            .unwrap();
        let decoded = backend.decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn encode_jpeg_and_webp_produce_bytes() {
        let backend = RustBackend::new();
        let surface = Surface::blank(PixelSize::new(16, 16));
        for format in [OutputFormat::Jpeg, OutputFormat::Webp] {
            let bytes = backend.encode(&surface, format, Quality::new(80)).unwrap();
            assert!(!bytes.is_empty(), "{format} produced no bytes");
        }
    }
}
