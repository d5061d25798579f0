//! Ordered color palettes: procedurally sampled in HSV or loaded from a table.
//!
//! Procedural palettes are regenerated on every request from the request's
//! random source; the persisted palette is read from the table managed by
//! [`crate::palette_table`]. Either way a [`Palette`] is an ordered, non-empty
//! list of swatches and layers index into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{hsv_to_srgb, Hsv, Srgb};
use crate::error::PosterError;
use crate::prng::Xorshift64;

/// Number of swatches drawn for a procedural palette when none is requested.
pub const DEFAULT_SWATCH_COUNT: usize = 6;

/// Hue used by [`PaletteMode::Mono`] when none is requested.
pub const DEFAULT_BASE_HUE: f64 = 0.60;

/// Sampling strategy used to pick layer colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMode {
    Pastel,
    Vivid,
    Mono,
    Random,
    /// Loaded from the palette table; ignores the requested swatch count.
    Persisted,
}

impl PaletteMode {
    pub const ALL: [PaletteMode; 5] = [
        PaletteMode::Pastel,
        PaletteMode::Vivid,
        PaletteMode::Mono,
        PaletteMode::Random,
        PaletteMode::Persisted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaletteMode::Pastel => "pastel",
            PaletteMode::Vivid => "vivid",
            PaletteMode::Mono => "mono",
            PaletteMode::Random => "random",
            PaletteMode::Persisted => "persisted",
        }
    }

    /// Returns true for modes that sample colors instead of loading them.
    pub fn is_procedural(self) -> bool {
        self != PaletteMode::Persisted
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaletteMode {
    type Err = PosterError;

    /// Accepts the mode names case-insensitively; `csv` is an alias of
    /// `persisted`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pastel" => Ok(PaletteMode::Pastel),
            "vivid" => Ok(PaletteMode::Vivid),
            "mono" => Ok(PaletteMode::Mono),
            "random" => Ok(PaletteMode::Random),
            "persisted" | "csv" => Ok(PaletteMode::Persisted),
            _ => Err(PosterError::UnknownPaletteMode(s.to_string())),
        }
    }
}

/// Hue interval sampled by the pastel, vivid and random modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HueBand {
    /// Whole color wheel, [0, 1).
    #[default]
    Full,
    /// Blue-green band, [0.5, 0.7).
    BlueGreen,
}

impl HueBand {
    pub const ALL: [HueBand; 2] = [HueBand::Full, HueBand::BlueGreen];

    /// Half-open hue interval `(lo, hi)`.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            HueBand::Full => (0.0, 1.0),
            HueBand::BlueGreen => (0.5, 0.7),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HueBand::Full => "full",
            HueBand::BlueGreen => "blue-green",
        }
    }
}

impl fmt::Display for HueBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HueBand {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "full" => Ok(HueBand::Full),
            "blue-green" => Ok(HueBand::BlueGreen),
            _ => Err(PosterError::UnknownHueBand(s.to_string())),
        }
    }
}

/// One palette entry. Procedural swatches are unnamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub name: Option<String>,
    pub color: Srgb,
}

impl Swatch {
    pub fn named(name: impl Into<String>, color: Srgb) -> Self {
        Self {
            name: Some(name.into()),
            color,
        }
    }

    pub fn unnamed(color: Srgb) -> Self {
        Self { name: None, color }
    }
}

/// An ordered, non-empty list of swatches.
///
/// Deserialization goes through [`Palette::new`], so an empty list is
/// rejected there too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PaletteRepr")]
pub struct Palette {
    swatches: Vec<Swatch>,
}

#[derive(Deserialize)]
struct PaletteRepr {
    swatches: Vec<Swatch>,
}

impl TryFrom<PaletteRepr> for Palette {
    type Error = PosterError;

    fn try_from(repr: PaletteRepr) -> Result<Self, Self::Error> {
        Palette::new(repr.swatches)
    }
}

impl Palette {
    /// Creates a palette from swatches. Requires at least one swatch.
    pub fn new(swatches: Vec<Swatch>) -> Result<Self, PosterError> {
        if swatches.is_empty() {
            return Err(PosterError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { swatches })
    }

    /// Creates an unnamed palette from colors. Requires at least one color.
    pub fn from_colors(colors: impl IntoIterator<Item = Srgb>) -> Result<Self, PosterError> {
        Self::new(colors.into_iter().map(Swatch::unnamed).collect())
    }

    /// Number of swatches.
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// Color at `index`, if present.
    pub fn color(&self, index: usize) -> Option<Srgb> {
        self.swatches.get(index).map(|s| s.color)
    }

    /// Colors in palette order.
    pub fn colors(&self) -> impl Iterator<Item = Srgb> + '_ {
        self.swatches.iter().map(|s| s.color)
    }

    /// Picks a uniformly random color using one draw from `rng`.
    pub fn choose(&self, rng: &mut Xorshift64) -> Srgb {
        self.swatches[rng.next_usize(self.swatches.len())].color
    }

    /// Deep sea to sun-lit blues, plus a wave-white accent at index 3.
    ///
    /// Written to the palette table on first run.
    pub fn ocean() -> Self {
        Self {
            swatches: vec![
                Swatch::named("deep_sea", Srgb::new(0.05, 0.1, 0.3)),
                Swatch::named("mid_sea", Srgb::new(0.1, 0.2, 0.5)),
                Swatch::named("shallow_sea", Srgb::new(0.2, 0.4, 0.7)),
                Swatch::named("wave_white", Srgb::new(0.9, 0.95, 1.0)),
                Swatch::named("sea_green", Srgb::new(0.1, 0.3, 0.5)),
                Swatch::named("sun_blue", Srgb::new(0.3, 0.6, 0.9)),
            ],
        }
    }
}

/// Hand-picked five-color palettes, used as-is instead of a sampled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixedPalette {
    Pastel,
    Vivid,
    NoiseTouch,
}

impl FixedPalette {
    pub const ALL: [FixedPalette; 3] = [
        FixedPalette::Pastel,
        FixedPalette::Vivid,
        FixedPalette::NoiseTouch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FixedPalette::Pastel => "pastel",
            FixedPalette::Vivid => "vivid",
            FixedPalette::NoiseTouch => "noise-touch",
        }
    }

    fn rgb(self) -> [(f64, f64, f64); 5] {
        match self {
            FixedPalette::Pastel => [
                (0.96, 0.75, 0.76),
                (0.74, 0.89, 0.82),
                (0.86, 0.80, 0.95),
                (0.97, 0.93, 0.76),
                (0.75, 0.86, 0.96),
            ],
            FixedPalette::Vivid => [
                (0.9, 0.3, 0.3),
                (0.3, 0.6, 0.9),
                (0.3, 0.9, 0.5),
                (0.95, 0.8, 0.25),
                (0.7, 0.4, 0.9),
            ],
            FixedPalette::NoiseTouch => [
                (0.85, 0.8, 0.75),
                (0.76, 0.82, 0.85),
                (0.8, 0.83, 0.8),
                (0.9, 0.88, 0.8),
                (0.7, 0.75, 0.7),
            ],
        }
    }

    /// The five colors, in their listed order.
    pub fn palette(self) -> Palette {
        Palette {
            swatches: self
                .rgb()
                .into_iter()
                .map(|(r, g, b)| Swatch::unnamed(Srgb::new(r, g, b)))
                .collect(),
        }
    }
}

impl fmt::Display for FixedPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FixedPalette {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pastel" => Ok(FixedPalette::Pastel),
            "vivid" => Ok(FixedPalette::Vivid),
            "noise-touch" | "noisetouch" => Ok(FixedPalette::NoiseTouch),
            _ => Err(PosterError::UnknownPaletteMode(format!("fixed:{s}"))),
        }
    }
}

/// HSV sampling rules for one procedural palette mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteSampler {
    pub mode: PaletteMode,
    pub base_hue: f64,
    pub band: HueBand,
}

impl PaletteSampler {
    /// Validates the sampler: the mode must be procedural and `base_hue` in [0, 1].
    pub fn new(mode: PaletteMode, base_hue: f64, band: HueBand) -> Result<Self, PosterError> {
        if !mode.is_procedural() {
            return Err(PosterError::Validation(
                "persisted palettes are loaded from the palette table, not sampled".into(),
            ));
        }
        if !base_hue.is_finite() || !(0.0..=1.0).contains(&base_hue) {
            return Err(PosterError::Validation(format!(
                "base_hue must be in [0, 1], got {base_hue}"
            )));
        }
        Ok(Self {
            mode,
            base_hue,
            band,
        })
    }

    /// Draws one HSV color. Each mode draws hue (unless fixed), saturation,
    /// then value, in that order.
    pub fn sample_hsv(&self, rng: &mut Xorshift64) -> Hsv {
        let (hue_lo, hue_hi) = self.band.bounds();
        let (h, s_range, v_range) = match self.mode {
            PaletteMode::Pastel => (rng.next_range(hue_lo, hue_hi), (0.15, 0.35), (0.9, 1.0)),
            PaletteMode::Vivid => (rng.next_range(hue_lo, hue_hi), (0.8, 1.0), (0.8, 1.0)),
            PaletteMode::Mono => (self.base_hue, (0.2, 0.6), (0.5, 1.0)),
            PaletteMode::Random | PaletteMode::Persisted => {
                (rng.next_range(hue_lo, hue_hi), (0.3, 1.0), (0.5, 1.0))
            }
        };
        let s = rng.next_range(s_range.0, s_range.1);
        let v = rng.next_range(v_range.0, v_range.1);
        Hsv { h, s, v }
    }

    /// Draws exactly `k` independent colors. Duplicates are allowed.
    pub fn sample(&self, k: usize, rng: &mut Xorshift64) -> Result<Palette, PosterError> {
        if k == 0 {
            return Err(PosterError::InvalidPalette(
                "swatch count must be at least 1".into(),
            ));
        }
        Palette::from_colors((0..k).map(|_| hsv_to_srgb(self.sample_hsv(rng))))
    }
}

/// Samples a procedural palette of `k` colors from a fresh random source
/// seeded with `seed`, over the full hue wheel.
///
/// The composer does not call this: it samples through [`PaletteSampler`]
/// with the request's single random source.
pub fn get_palette(
    mode: PaletteMode,
    k: usize,
    seed: u64,
    base_hue: f64,
) -> Result<Palette, PosterError> {
    let sampler = PaletteSampler::new(mode, base_hue, HueBand::Full)?;
    let mut rng = Xorshift64::seeded(seed);
    sampler.sample(k, &mut rng)
}
