#![deny(unsafe_code)]
//! Core types for the poster-engine generative poster system.
//!
//! Provides the `Xorshift64` PRNG, `Srgb`/`Hsv` colors, procedural and
//! persisted `Palette`s, the blob shape generator, `StylePreset`s, the
//! `PosterSpec` request model, layer `Layout` policies, and the `Composer`
//! that turns a request into an immutable `Poster` scene.

pub mod color;
pub mod composer;
pub mod error;
pub mod layout;
pub mod palette;
pub mod palette_table;
pub mod poster_spec;
pub mod preset;
pub mod prng;
pub mod scene;
pub mod shape;

pub use color::{Hsv, Srgb};
pub use composer::{compose, Composer};
pub use error::{ErrorKind, PosterError};
pub use layout::{Layout, LayoutKind};
pub use palette::{get_palette, FixedPalette, HueBand, Palette, PaletteMode, Swatch};
pub use palette_table::{load_palette, Bootstrap, PaletteStore, PaletteTable};
pub use poster_spec::{PosterSpec, ResolvedSpec, ValueRange, Wobble};
pub use preset::{PresetRanges, StylePreset};
pub use prng::Xorshift64;
pub use scene::{Fill, Label, LabelStyle, Poster, Shape, ShapeRole};
pub use shape::{generate_blob, AngleWeight, ShapeParams};
