//! Poster composition: request in, immutable [`Poster`] out.
//!
//! A [`Composer`] holds a validated request (the idle state). Calling
//! [`Composer::compose`] seeds one random source from the request seed,
//! builds the palette, places every layer in index order and stamps the
//! labels, returning a finished [`Poster`]. Any failure returns an error and
//! no poster, so partial output never escapes.

use tracing::{debug, info_span};

use crate::error::PosterError;
use crate::layout::{LayerContext, Layout};
use crate::palette::{Palette, PaletteMode, PaletteSampler};
use crate::palette_table::PaletteStore;
use crate::poster_spec::{PosterSpec, ResolvedSpec};
use crate::prng::Xorshift64;
use crate::scene::{
    Label, LabelStyle, Poster, LABEL_COLOR, SUBTITLE_ANCHOR, TITLE_ANCHOR,
};

/// Composes posters from a validated request.
///
/// The persisted palette mode needs a [`PaletteStore`]; attach one with
/// [`with_palette_store`](Self::with_palette_store).
pub struct Composer<'a> {
    spec: ResolvedSpec,
    store: Option<&'a dyn PaletteStore>,
}

impl<'a> Composer<'a> {
    /// Resolves and validates `spec`. Nothing is drawn yet.
    pub fn new(spec: &PosterSpec) -> Result<Self, PosterError> {
        Ok(Self {
            spec: spec.resolve()?,
            store: None,
        })
    }

    /// Source of the persisted palette.
    pub fn with_palette_store(mut self, store: &'a dyn PaletteStore) -> Self {
        self.store = Some(store);
        self
    }

    /// The resolved request.
    pub fn spec(&self) -> &ResolvedSpec {
        &self.spec
    }

    /// Builds the poster. Identical requests yield identical posters.
    #[tracing::instrument(skip(self), fields(seed = self.spec.seed, layout = %self.spec.layout, layers = self.spec.n_layers))]
    pub fn compose(&self) -> Result<Poster, PosterError> {
        let spec = &self.spec;
        let size = spec.pixel_size()?;
        let mut rng = Xorshift64::seeded(spec.seed);
        let palette = self.build_palette(&mut rng)?;
        debug!(
            mode = %spec.palette_mode,
            fixed = ?spec.fixed_palette,
            swatches = palette.len(),
            "palette ready"
        );

        let mut shapes = Vec::with_capacity(spec.n_layers * 2);
        for index in 0..spec.n_layers {
            let _layer = info_span!("layer", index).entered();
            let ctx = LayerContext {
                index,
                spec,
                palette: &palette,
            };
            shapes.extend(spec.layout.place_layer(&ctx, &mut rng)?);
        }

        let labels = vec![
            Label {
                text: spec.title.clone(),
                anchor: TITLE_ANCHOR,
                style: LabelStyle::Title,
                color: LABEL_COLOR,
            },
            Label {
                text: spec.subtitle.clone(),
                anchor: SUBTITLE_ANCHOR,
                style: LabelStyle::Subtitle,
                color: LABEL_COLOR,
            },
        ];
        debug!(shapes = shapes.len(), "poster composed");
        Ok(Poster::new(spec.clone(), size, palette, shapes, labels))
    }

    /// Procedural palettes draw from `rng`; fixed and persisted ones are
    /// taken whole without drawing.
    fn build_palette(&self, rng: &mut Xorshift64) -> Result<Palette, PosterError> {
        let spec = &self.spec;
        if let Some(fixed) = spec.fixed_palette {
            return Ok(fixed.palette());
        }
        if spec.palette_mode == PaletteMode::Persisted {
            let store = self.store.ok_or_else(|| {
                PosterError::Validation(
                    "palette_mode 'persisted' requires a palette table".into(),
                )
            })?;
            return store.load();
        }
        PaletteSampler::new(spec.palette_mode, spec.base_hue, spec.hue_band)?
            .sample(spec.swatch_count, rng)
    }
}

/// Composes a poster that does not use the persisted palette.
pub fn compose(spec: &PosterSpec) -> Result<Poster, PosterError> {
    Composer::new(spec)?.compose()
}
