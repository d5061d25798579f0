//! Color types for the poster-engine.
//!
//! Colors are plain RGB triples with channels in [0, 1]. Opacity is never
//! stored inside a color; it travels alongside it (see [`crate::scene::Fill`]).
//! Procedural palettes are sampled in HSV and converted with [`hsv_to_srgb`].

use serde::{Deserialize, Serialize};

use crate::error::PosterError;

/// sRGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSV color, every component in [0, 1] (hue is a fraction of a full turn).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Srgb {
    pub const WHITE: Srgb = Srgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Srgb = Srgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from channels that must already lie in [0, 1].
    ///
    /// Returns `PosterError::InvalidColor` for non-finite or out-of-range
    /// channels instead of clamping them.
    pub fn try_new(r: f64, g: f64, b: f64) -> Result<Self, PosterError> {
        for (name, value) in [("r", r), ("g", g), ("b", b)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PosterError::InvalidColor(format!(
                    "channel '{name}' = {value} is outside [0, 1]"
                )));
            }
        }
        Ok(Self { r, g, b })
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Srgb, PosterError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(PosterError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map(|c| c as f64 / 255.0)
                .map_err(|e| PosterError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels with rounding, clamping out-of-range input.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Clamps every channel into [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Converts to HSV. Achromatic colors report hue 0.
    pub fn to_hsv(self) -> Hsv {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        let s = if max > 0.0 { delta / max } else { 0.0 };
        let h = if delta < 1e-12 {
            0.0
        } else if max == self.r {
            ((self.g - self.b) / delta).rem_euclid(6.0) / 6.0
        } else if max == self.g {
            ((self.b - self.r) / delta + 2.0) / 6.0
        } else {
            ((self.r - self.g) / delta + 4.0) / 6.0
        };
        Hsv { h, s, v: max }
    }
}

/// Converts HSV (all components in [0, 1]) to sRGB.
///
/// Uses the standard sextant decomposition; hue wraps, saturation and value
/// are clamped so the result always lies in [0, 1].
pub fn hsv_to_srgb(c: Hsv) -> Srgb {
    let h = c.h.rem_euclid(1.0) * 6.0;
    let s = c.s.clamp(0.0, 1.0);
    let v = c.v.clamp(0.0, 1.0);

    let sector = (h.floor() as u8).min(5);
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Srgb { r, g, b }
}
