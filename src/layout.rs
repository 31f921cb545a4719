//! Layout registry: the fixed set of crop modes and their tiles.
//!
//! Every mode describes two things:
//!
//! - **Tiles**: the ordered output regions, each with a label (used in export
//!   filenames) and a preview size in pixels.
//! - **Arrangement**: how the tiles are laid out over the source image. This is
//!   what the [projection engine](crate::imaging::project) reads.
//!
//! ## Modes
//!
//! | Mode | Tiles | Arrangement |
//! |------|-------|-------------|
//! | `ARTWORK` | `left` 506px, `right` 100px | Columns of a 614-unit strip spanning the full source height |
//! | `WORKSHOP_DUO` | `0`, `1` at 150×150 | Two squares inside a `304:150` capture region |
//! | `WORKSHOP_QUAD` | `0`..`3` at 150×150 | Four squares inside a `612:150` capture region |
//!
//! The ARTWORK strip is 506 (left) + 2×2 border + 6 margin + 100 (right) = 614
//! units wide. The right column therefore starts at unit 514.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a mode name does not match any known layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mode '{0}' (expected one of: artwork, workshop-duo, workshop-quad)")]
pub struct InvalidModeError(pub String);

/// Output layout. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Artwork,
    WorkshopDuo,
    WorkshopQuad,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Artwork, Mode::WorkshopDuo, Mode::WorkshopQuad];

    /// Upper-case name used in archive filenames and logs.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Artwork => "ARTWORK",
            Mode::WorkshopDuo => "WORKSHOP_DUO",
            Mode::WorkshopQuad => "WORKSHOP_QUAD",
        }
    }

    pub fn tile_count(self) -> usize {
        tile_specs(self).len()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = InvalidModeError;

    /// Accepts display names, kebab-case CLI names, and the legacy
    /// `WORKSHOP2` / `WORKSHOP4` names. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "ARTWORK" => Ok(Mode::Artwork),
            "WORKSHOP_DUO" | "WORKSHOP2" => Ok(Mode::WorkshopDuo),
            "WORKSHOP_QUAD" | "WORKSHOP4" => Ok(Mode::WorkshopQuad),
            _ => Err(InvalidModeError(s.to_string())),
        }
    }
}

/// Preview height of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewHeight {
    /// Always this many pixels.
    Fixed(u32),
    /// Follows the source image's proportions. `nominal` is used for the
    /// blank surface before any image is loaded.
    Proportional { nominal: u32 },
}

impl PreviewHeight {
    pub fn nominal(self) -> u32 {
        match self {
            PreviewHeight::Fixed(h) => h,
            PreviewHeight::Proportional { nominal } => nominal,
        }
    }
}

/// Static per-tile descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpec {
    /// Label used in export filenames (`<basename>_<label>_original.png`).
    pub label: &'static str,
    pub preview_width: u32,
    pub preview_height: PreviewHeight,
}

/// A column of the ARTWORK strip, in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub offset: u32,
    pub width: u32,
}

/// An exact `width:height` ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn as_f64(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// How a mode's tiles are placed over the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// Independent columns of a logical strip. The strip is scaled to the
    /// source width and every column spans the full source height.
    Strip {
        logical_width: u32,
        columns: &'static [Column],
    },
    /// Equal squares spread evenly across a capture region of the given
    /// aspect ratio, first flush left and last flush right.
    Squares { capture: AspectRatio, count: u32 },
}

/// Full description of one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub mode: Mode,
    pub tiles: &'static [TileSpec],
    pub arrangement: Arrangement,
}

const SQUARE_PREVIEW: u32 = 150;

const fn square(label: &'static str) -> TileSpec {
    TileSpec {
        label,
        preview_width: SQUARE_PREVIEW,
        preview_height: PreviewHeight::Fixed(SQUARE_PREVIEW),
    }
}

static ARTWORK: Layout = Layout {
    mode: Mode::Artwork,
    tiles: &[
        TileSpec {
            label: "left",
            preview_width: 506,
            preview_height: PreviewHeight::Proportional { nominal: 500 },
        },
        TileSpec {
            label: "right",
            preview_width: 100,
            preview_height: PreviewHeight::Proportional { nominal: 500 },
        },
    ],
    arrangement: Arrangement::Strip {
        logical_width: 614,
        columns: &[
            Column {
                offset: 0,
                width: 506,
            },
            Column {
                offset: 514,
                width: 100,
            },
        ],
    },
};

static WORKSHOP_DUO: Layout = Layout {
    mode: Mode::WorkshopDuo,
    tiles: &[square("0"), square("1")],
    arrangement: Arrangement::Squares {
        capture: AspectRatio {
            width: 304,
            height: 150,
        },
        count: 2,
    },
};

static WORKSHOP_QUAD: Layout = Layout {
    mode: Mode::WorkshopQuad,
    tiles: &[square("0"), square("1"), square("2"), square("3")],
    arrangement: Arrangement::Squares {
        capture: AspectRatio {
            width: 612,
            height: 150,
        },
        count: 4,
    },
};

pub fn layout(mode: Mode) -> &'static Layout {
    match mode {
        Mode::Artwork => &ARTWORK,
        Mode::WorkshopDuo => &WORKSHOP_DUO,
        Mode::WorkshopQuad => &WORKSHOP_QUAD,
    }
}

/// Ordered tile descriptors for a mode.
pub fn tile_specs(mode: Mode) -> &'static [TileSpec] {
    layout(mode).tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_counts_per_mode() {
        assert_eq!(Mode::Artwork.tile_count(), 2);
        assert_eq!(Mode::WorkshopDuo.tile_count(), 2);
        assert_eq!(Mode::WorkshopQuad.tile_count(), 4);
    }

    #[test]
    fn artwork_tiles_are_left_and_right() {
        let labels: Vec<_> = tile_specs(Mode::Artwork).iter().map(|t| t.label).collect();
        assert_eq!(labels, ["left", "right"]);
        assert_eq!(tile_specs(Mode::Artwork)[0].preview_width, 506);
        assert_eq!(tile_specs(Mode::Artwork)[1].preview_width, 100);
    }

    #[test]
    fn workshop_tiles_are_numbered_squares() {
        for tile in tile_specs(Mode::WorkshopQuad) {
            assert_eq!(tile.preview_width, 150);
            assert_eq!(tile.preview_height, PreviewHeight::Fixed(150));
        }
        let labels: Vec<_> = tile_specs(Mode::WorkshopQuad)
            .iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels, ["0", "1", "2", "3"]);
    }

    #[test]
    fn square_count_matches_tiles() {
        for mode in Mode::ALL {
            if let Arrangement::Squares { count, .. } = layout(mode).arrangement {
                assert_eq!(count as usize, mode.tile_count());
            }
        }
    }

    #[test]
    fn strip_columns_fit_logical_width() {
        let Arrangement::Strip {
            logical_width,
            columns,
        } = layout(Mode::Artwork).arrangement
        else {
            panic!("artwork must be a strip");
        };
        assert_eq!(columns.len(), 2);
        for c in columns {
            assert!(c.offset + c.width <= logical_width);
        }
    }

    #[test]
    fn parse_accepts_all_spellings() {
        assert_eq!("artwork".parse::<Mode>().unwrap(), Mode::Artwork);
        assert_eq!("ARTWORK".parse::<Mode>().unwrap(), Mode::Artwork);
        assert_eq!("workshop-duo".parse::<Mode>().unwrap(), Mode::WorkshopDuo);
        assert_eq!("WORKSHOP_QUAD".parse::<Mode>().unwrap(), Mode::WorkshopQuad);
        assert_eq!("WORKSHOP2".parse::<Mode>().unwrap(), Mode::WorkshopDuo);
        assert_eq!("workshop4".parse::<Mode>().unwrap(), Mode::WorkshopQuad);
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        let err = "banner".parse::<Mode>().unwrap_err();
        assert_eq!(err, InvalidModeError("banner".to_string()));
    }

    #[test]
    fn display_uses_archive_names() {
        assert_eq!(Mode::Artwork.to_string(), "ARTWORK");
        assert_eq!(Mode::WorkshopDuo.to_string(), "WORKSHOP_DUO");
        assert_eq!(Mode::WorkshopQuad.to_string(), "WORKSHOP_QUAD");
    }
}
