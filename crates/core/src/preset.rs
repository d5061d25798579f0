//! Named style presets and the parameter ranges they resolve to.
//!
//! A preset fills in the ranges of a [`PosterSpec`](crate::poster_spec::PosterSpec)
//! before any random draw. Explicit spec fields still win.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Srgb;
use crate::error::PosterError;
use crate::layout::LayoutKind;
use crate::palette::{HueBand, PaletteMode};
use crate::poster_spec::{CanvasSize, ValueRange, Wobble};
use crate::shape::AngleWeight;

/// A named bundle of parameter ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    Minimal,
    Vivid,
    NoiseTouch,
    Ocean,
    Depth,
}

impl StylePreset {
    pub const ALL: [StylePreset; 5] = [
        StylePreset::Minimal,
        StylePreset::Vivid,
        StylePreset::NoiseTouch,
        StylePreset::Ocean,
        StylePreset::Depth,
    ];

    /// Display name, as shown in poster titles.
    pub fn name(self) -> &'static str {
        match self {
            StylePreset::Minimal => "Minimal",
            StylePreset::Vivid => "Vivid",
            StylePreset::NoiseTouch => "NoiseTouch",
            StylePreset::Ocean => "Ocean",
            StylePreset::Depth => "Depth",
        }
    }

    /// Lowercase identifier used in file names and on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            StylePreset::Minimal => "minimal",
            StylePreset::Vivid => "vivid",
            StylePreset::NoiseTouch => "noise-touch",
            StylePreset::Ocean => "ocean",
            StylePreset::Depth => "depth",
        }
    }

    /// The concrete ranges this preset stands for.
    pub fn ranges(self) -> PresetRanges {
        let custom = PresetRanges::custom();
        match self {
            StylePreset::Minimal => PresetRanges {
                n_layers: 5,
                wobble: Wobble::range(0.02, 0.08),
                alpha_range: ValueRange::new(0.30, 0.50),
                palette_mode: PaletteMode::Pastel,
                ..custom
            },
            StylePreset::Vivid => PresetRanges {
                n_layers: 12,
                wobble: Wobble::range(0.05, 0.20),
                alpha_range: ValueRange::new(0.35, 0.70),
                palette_mode: PaletteMode::Vivid,
                ..custom
            },
            StylePreset::NoiseTouch => PresetRanges {
                n_layers: 14,
                wobble: Wobble::range(0.12, 0.30),
                alpha_range: ValueRange::new(0.25, 0.55),
                palette_mode: PaletteMode::Mono,
                ..custom
            },
            StylePreset::Ocean => PresetRanges {
                layout: LayoutKind::Wave,
                n_layers: 8,
                wobble: Wobble::Fixed(0.15),
                palette_mode: PaletteMode::Pastel,
                hue_band: HueBand::BlueGreen,
                angle_weight: AngleWeight::Crest,
                canvas: CanvasSize::new(6.0, 8.0),
                background: Srgb::new(0.97, 0.97, 0.97),
                ..custom
            },
            StylePreset::Depth => PresetRanges {
                layout: LayoutKind::Depth,
                n_layers: 6,
                wobble: Wobble::Fixed(0.12),
                canvas: CanvasSize::new(7.0, 7.0),
                background: Srgb::new(0.98, 0.97, 0.95),
                ..custom
            },
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StylePreset {
    type Err = PosterError;

    /// Case-insensitive; `-`, `_` and spaces are ignored, so "NoiseTouch",
    /// "noise-touch" and "noise_touch" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        StylePreset::ALL
            .into_iter()
            .find(|p| p.name().to_lowercase() == key)
            .ok_or_else(|| PosterError::UnknownPreset(s.to_string()))
    }
}

/// Immutable parameter ranges a poster is generated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresetRanges {
    pub layout: LayoutKind,
    pub n_layers: usize,
    pub wobble: Wobble,
    pub radius_range: ValueRange,
    pub alpha_range: ValueRange,
    pub palette_mode: PaletteMode,
    pub hue_band: HueBand,
    pub angle_weight: AngleWeight,
    pub canvas: CanvasSize,
    pub background: Srgb,
}

impl PresetRanges {
    /// Ranges used when no preset is named.
    pub fn custom() -> Self {
        Self {
            layout: LayoutKind::Scatter,
            n_layers: 8,
            wobble: Wobble::range(0.05, 0.25),
            radius_range: ValueRange::new(0.15, 0.45),
            alpha_range: ValueRange::new(0.25, 0.60),
            palette_mode: PaletteMode::Pastel,
            hue_band: HueBand::Full,
            angle_weight: AngleWeight::Uniform,
            canvas: CanvasSize::new(7.0, 10.0),
            background: Srgb::new(0.98, 0.98, 0.97),
        }
    }

    /// Ranges for an optional preset.
    pub fn for_preset(preset: Option<StylePreset>) -> Self {
        preset.map_or_else(Self::custom, StylePreset::ranges)
    }
}
