//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! WORKSHOP_QUAD 612x150 → preview
//!     Capture: 612 x 150 (full width), separation 4
//!     0  source 0,0 150x150 → 150x150
//!     1  source 154,0 150x150 → 150x150
//! ```
//!
//! ## Crop
//!
//! ```text
//! sunset_ARTWORK_18f3a2b4c5d.zip (4 files)
//!     sunset_left_original.png  12.4 KB
//!     sunset_left_scaled.png  9.1 KB
//! ```
//!
//! ## Modes
//!
//! ```text
//! ARTWORK (artwork)
//!     left  506 x proportional
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::export::ExportEntry;
use crate::imaging::{Clamp, OutputScale, Projection};
use crate::layout::{Mode, PreviewHeight, tile_specs};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Whole numbers print bare, fractions with two decimals.
fn px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Plan
// ============================================================================

pub fn format_projection(projection: &Projection) -> Vec<String> {
    let scale = match projection.scale {
        OutputScale::Preview => "preview",
        OutputScale::Native => "native",
    };
    let mut lines = vec![format!(
        "{} {}x{} → {}",
        projection.mode, projection.image_width, projection.image_height, scale
    )];

    if let Some(capture) = &projection.capture {
        let clamp = match capture.clamp {
            Clamp::Width => "full width",
            Clamp::Height => "full height",
        };
        lines.push(format!(
            "{}Capture: {} x {} ({}), separation {}",
            indent(1),
            px(capture.width),
            px(capture.height),
            clamp,
            px(capture.separation)
        ));
    }

    let label_width = projection
        .tiles
        .iter()
        .map(|t| t.label.len())
        .max()
        .unwrap_or(0);
    for tile in &projection.tiles {
        lines.push(format!(
            "{}{:<label_width$}  source {},{} {}x{} → {}x{}",
            indent(1),
            tile.label,
            px(tile.source.x),
            px(tile.source.y),
            px(tile.source.width),
            px(tile.source.height),
            tile.dest.width,
            tile.dest.height,
        ));
    }
    lines
}

pub fn print_projection(projection: &Projection) {
    for line in format_projection(projection) {
        println!("{}", line);
    }
}

// ============================================================================
// Crop
// ============================================================================

pub fn format_export(entries: &[ExportEntry], archive: &Path) -> Vec<String> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());
    let mut lines = vec![format!("{} ({} files)", name, entries.len())];
    for entry in entries {
        lines.push(format!(
            "{}{}  {}",
            indent(1),
            entry.filename,
            format_size(entry.bytes.len())
        ));
    }
    lines
}

pub fn print_export(entries: &[ExportEntry], archive: &Path) {
    for line in format_export(entries, archive) {
        println!("{}", line);
    }
}

// ============================================================================
// Modes
// ============================================================================

pub fn format_modes() -> Vec<String> {
    let mut lines = Vec::new();
    for mode in Mode::ALL {
        let cli_name = mode.name().to_ascii_lowercase().replace('_', "-");
        lines.push(format!("{} ({})", mode, cli_name));

        let specs = tile_specs(mode);
        let label_width = specs.iter().map(|s| s.label.len()).max().unwrap_or(0);
        for spec in specs {
            let height = match spec.preview_height {
                PreviewHeight::Fixed(h) => h.to_string(),
                PreviewHeight::Proportional { .. } => "proportional".to_string(),
            };
            lines.push(format!(
                "{}{:<label_width$}  {} x {}",
                indent(1),
                spec.label,
                spec.preview_width,
                height
            ));
        }
    }
    lines
}

pub fn print_modes() {
    for line in format_modes() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::project;

    #[test]
    fn px_trims_whole_numbers() {
        assert_eq!(px(150.0), "150");
        assert_eq!(px(4.0), "4");
        assert_eq!(px(75.123), "75.12");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn quad_plan_output() {
        let projection = project(Mode::WorkshopQuad, 612, 150, OutputScale::Preview).unwrap();
        let lines = format_projection(&projection);
        assert_eq!(lines[0], "WORKSHOP_QUAD 612x150 → preview");
        assert_eq!(
            lines[1],
            "    Capture: 612 x 150 (full width), separation 4"
        );
        assert_eq!(lines[2], "    0  source 0,0 150x150 → 150x150");
        assert_eq!(lines[5], "    3  source 462,0 150x150 → 150x150");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn artwork_plan_has_no_capture_line() {
        let projection = project(Mode::Artwork, 1228, 1000, OutputScale::Native).unwrap();
        let lines = format_projection(&projection);
        assert_eq!(lines[0], "ARTWORK 1228x1000 → native");
        assert_eq!(lines[1], "    left   source 0,0 1012x1000 → 1012x1000");
        assert_eq!(lines[2], "    right  source 1028,0 200x1000 → 200x1000");
    }

    #[test]
    fn export_lists_archive_and_entries() {
        let entries = vec![
            ExportEntry {
                filename: "a_0_original.png".into(),
                bytes: vec![0; 10],
            },
            ExportEntry {
                filename: "a_0_scaled.png".into(),
                bytes: vec![0; 2048],
            },
        ];
        let lines = format_export(&entries, Path::new("out/a_WORKSHOP_DUO_ff.zip"));
        assert_eq!(
            lines,
            vec![
                "a_WORKSHOP_DUO_ff.zip (2 files)",
                "    a_0_original.png  10 B",
                "    a_0_scaled.png  2.0 KB",
            ]
        );
    }

    #[test]
    fn modes_lists_every_tile() {
        let lines = format_modes();
        assert_eq!(lines[0], "ARTWORK (artwork)");
        assert_eq!(lines[1], "    left   506 x proportional");
        assert_eq!(lines[2], "    right  100 x proportional");
        assert!(lines.contains(&"WORKSHOP_QUAD (workshop-quad)".to_string()));
        // 3 headers + 2 + 2 + 4 tiles
        assert_eq!(lines.len(), 11);
    }
}
