//! Layer placement policies.
//!
//! A [`Layout`] turns one layer index into the shapes painted for it, drawing
//! every random value from the request's random source. Three policies exist:
//!
//! - [`ScatterLayout`]: each layer at an independent uniform position, with
//!   radius, wobble and alpha drawn from the configured ranges.
//! - [`WaveLayout`]: layers climb a vertical gradient with shrinking radius
//!   and rising opacity; high layers may carry a foam accent.
//! - [`DepthLayout`]: uniformly placed layers with a drop shadow and a
//!   warm-to-cool recolor suggesting distance.
//!
//! [`LayoutKind`] names the policy and dispatches to it.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::Srgb;
use crate::error::PosterError;
use crate::palette::{Palette, PaletteMode};
use crate::poster_spec::ResolvedSpec;
use crate::prng::Xorshift64;
use crate::scene::{Fill, Shape, ShapeRole};
use crate::shape::{generate_blob, scale_about, ShapeParams};

/// Fewest crest points a foam accent is drawn with.
pub const FOAM_MIN_POINTS: usize = 20;

/// Opacity of foam accents.
pub const FOAM_ALPHA: f64 = 0.5;

const SHADOW_COLOR: Srgb = Srgb::new(0.2, 0.2, 0.2);
const SHADOW_OFFSET: DVec2 = DVec2::new(0.015, -0.015);
const WARM: Srgb = Srgb::new(0.8, 0.4, 0.2);
const COOL: Srgb = Srgb::new(0.2, 0.4, 0.8);

/// Everything a layout needs to place one layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerContext<'a> {
    pub index: usize,
    pub spec: &'a ResolvedSpec,
    pub palette: &'a Palette,
}

impl LayerContext<'_> {
    /// `index / (n - 1)`, or 0 for a single layer.
    pub fn ratio(&self) -> f64 {
        layer_ratio(self.index, self.spec.n_layers)
    }

    fn blob(&self, center: DVec2, radius: f64, wobble: f64) -> ShapeParams {
        ShapeParams::new(center, radius, wobble)
            .with_point_count(self.spec.point_count)
            .with_weight(self.spec.angle_weight)
    }
}

/// Position of layer `index` in `[0, 1]` across `count` layers.
pub fn layer_ratio(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// A layer placement policy.
pub trait Layout {
    /// Shapes for one layer, in paint order.
    fn place_layer(
        &self,
        ctx: &LayerContext<'_>,
        rng: &mut Xorshift64,
    ) -> Result<Vec<Shape>, PosterError>;
}

/// Independent uniform placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScatterLayout;

impl Layout for ScatterLayout {
    fn place_layer(
        &self,
        ctx: &LayerContext<'_>,
        rng: &mut Xorshift64,
    ) -> Result<Vec<Shape>, PosterError> {
        let spec = ctx.spec;
        let center = DVec2::new(rng.next_f64(), rng.next_f64());
        let radius = spec.radius_range.sample(rng);
        let wobble = spec.wobble.sample(rng);
        let points = generate_blob(&ctx.blob(center, radius, wobble), rng)?;
        let color = ctx.palette.choose(rng);
        let alpha = spec.alpha_range.sample(rng);

        debug!(layer = ctx.index, %center, radius, wobble, alpha, "scatter layer");
        Ok(vec![Shape {
            layer: ctx.index,
            role: ShapeRole::Body,
            fill: Fill::new(color, alpha),
            points,
        }])
    }
}

/// Vertical gradient of shrinking blobs with optional foam on the crests.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveLayout;

impl WaveLayout {
    /// Palette entry 0, 1 or 2 by ratio threshold.
    fn gradient_color(palette: &Palette, ratio: f64) -> Option<Srgb> {
        let index = if ratio < 0.3 {
            0
        } else if ratio < 0.6 {
            1
        } else {
            2
        };
        palette.color(index)
    }

    /// Jittered copy of the crest points lying above `threshold_y`.
    ///
    /// Returns `None` when fewer than [`FOAM_MIN_POINTS`] qualify; no draws
    /// are made in that case.
    fn foam(points: &[DVec2], threshold_y: f64, rng: &mut Xorshift64) -> Option<Vec<DVec2>> {
        let mut crest: Vec<DVec2> = points.iter().copied().filter(|p| p.y > threshold_y).collect();
        if crest.len() < FOAM_MIN_POINTS {
            return None;
        }
        for p in crest.iter_mut() {
            p.x += (rng.next_f64() - 0.5) * 0.03;
        }
        for p in crest.iter_mut() {
            p.y += (rng.next_f64() - 0.5) * 0.02;
        }
        Some(crest)
    }
}

impl Layout for WaveLayout {
    fn place_layer(
        &self,
        ctx: &LayerContext<'_>,
        rng: &mut Xorshift64,
    ) -> Result<Vec<Shape>, PosterError> {
        let spec = ctx.spec;
        let ratio = ctx.ratio();
        let cx = 0.5 + (rng.next_f64() - 0.5) * 0.4 * (1.0 - ratio);
        let cy = 0.2 + 0.6 * ratio;
        let radius = 0.4 - 0.25 * ratio;
        let wobble = spec.wobble.nominal() * (0.5 + ratio);
        let center = DVec2::new(cx, cy);
        let points = generate_blob(&ctx.blob(center, radius, wobble), rng)?;

        let gradient = spec.palette_mode == PaletteMode::Persisted && ctx.palette.len() >= 4;
        let color = if gradient {
            Self::gradient_color(ctx.palette, ratio)
        } else {
            None
        }
        .unwrap_or_else(|| ctx.palette.choose(rng));
        let alpha = 0.5 + 0.3 * ratio;
        debug!(layer = ctx.index, ratio, %center, radius, wobble, alpha, "wave layer");

        let mut shapes = Vec::with_capacity(2);
        let foam = if spec.foam && ratio > 0.7 && rng.next_above(0.5) {
            let foam = Self::foam(&points, cy + radius * 0.6, rng);
            if foam.is_none() {
                trace!(layer = ctx.index, "foam skipped: too few crest points");
            }
            foam
        } else {
            None
        };
        shapes.push(Shape {
            layer: ctx.index,
            role: ShapeRole::Body,
            fill: Fill::new(color, alpha),
            points,
        });
        if let Some(points) = foam {
            let accent = ctx.palette.color(3).unwrap_or(Srgb::WHITE);
            debug!(layer = ctx.index, points = points.len(), "foam accent");
            shapes.push(Shape {
                layer: ctx.index,
                role: ShapeRole::Foam,
                fill: Fill::new(accent, FOAM_ALPHA),
                points,
            });
        }
        Ok(shapes)
    }
}

/// Uniform placement with drop shadows and a warm-to-cool depth tint.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthLayout;

impl DepthLayout {
    /// `max(0.12 - 0.02·depth, 0)`, exactly zero from depth 6 on.
    fn shadow_alpha(depth: usize) -> f64 {
        0.02 * 6usize.saturating_sub(depth) as f64
    }

    fn body_alpha(depth: usize) -> f64 {
        (0.5 + 0.08 * depth as f64).min(1.0)
    }

    /// Warm tone for the near half, cool for the far half, jittered per channel.
    fn tint(depth: usize, count: usize, rng: &mut Xorshift64) -> Srgb {
        let near = (depth as f64) < count as f64 / 2.0;
        let (base, jitter) = if near {
            (WARM, [(-0.2, 0.1), (-0.1, 0.1), (0.0, 0.1)])
        } else {
            (COOL, [(0.0, 0.1), (-0.1, 0.1), (-0.2, 0.1)])
        };
        let r = base.r + rng.next_range(jitter[0].0, jitter[0].1);
        let g = base.g + rng.next_range(jitter[1].0, jitter[1].1);
        let b = base.b + rng.next_range(jitter[2].0, jitter[2].1);
        Srgb::new(r, g, b).clamped()
    }
}

impl Layout for DepthLayout {
    fn place_layer(
        &self,
        ctx: &LayerContext<'_>,
        rng: &mut Xorshift64,
    ) -> Result<Vec<Shape>, PosterError> {
        let spec = ctx.spec;
        let depth = ctx.index;
        let center = DVec2::new(rng.next_f64(), rng.next_f64());
        let radius = spec.radius_range.sample(rng);
        let wobble = spec.wobble.sample(rng);
        let points = generate_blob(&ctx.blob(center, radius, wobble), rng)?;

        let mut shapes = Vec::with_capacity(2);
        let shadow_alpha = Self::shadow_alpha(depth);
        if spec.shadows && shadow_alpha > 0.0 {
            let scale = 1.05 + 0.02 * depth as f64;
            let shadow = scale_about(&points, center, scale)
                .into_iter()
                .map(|p| p + SHADOW_OFFSET)
                .collect();
            shapes.push(Shape {
                layer: depth,
                role: ShapeRole::Shadow,
                fill: Fill::new(SHADOW_COLOR, shadow_alpha),
                points: shadow,
            });
        }

        let color = Self::tint(depth, spec.n_layers, rng);
        let alpha = Self::body_alpha(depth);
        debug!(layer = depth, %center, radius, alpha, shadow_alpha, "depth layer");
        shapes.push(Shape {
            layer: depth,
            role: ShapeRole::Body,
            fill: Fill::new(color, alpha),
            points,
        });
        Ok(shapes)
    }
}

/// Names a layout policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Scatter,
    Wave,
    Depth,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [LayoutKind::Scatter, LayoutKind::Wave, LayoutKind::Depth];

    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::Scatter => "scatter",
            LayoutKind::Wave => "wave",
            LayoutKind::Depth => "depth",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Layout for LayoutKind {
    fn place_layer(
        &self,
        ctx: &LayerContext<'_>,
        rng: &mut Xorshift64,
    ) -> Result<Vec<Shape>, PosterError> {
        match self {
            LayoutKind::Scatter => ScatterLayout.place_layer(ctx, rng),
            LayoutKind::Wave => WaveLayout.place_layer(ctx, rng),
            LayoutKind::Depth => DepthLayout.place_layer(ctx, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Swatch;
    use crate::poster_spec::{PosterSpec, ValueRange, Wobble};
    use crate::preset::StylePreset;

    fn place(
        layout: &dyn Layout,
        spec: &ResolvedSpec,
        palette: &Palette,
        index: usize,
        seed: u64,
    ) -> Vec<Shape> {
        let ctx = LayerContext {
            index,
            spec,
            palette,
        };
        layout.place_layer(&ctx, &mut Xorshift64::seeded(seed)).unwrap()
    }

    fn bodies(shapes: &[Shape]) -> Vec<&Shape> {
        shapes.iter().filter(|s| s.role == ShapeRole::Body).collect()
    }

    // -- Ratio --

    #[test]
    fn ratio_spans_unit_interval() {
        assert_eq!(layer_ratio(0, 5), 0.0);
        assert_eq!(layer_ratio(4, 5), 1.0);
        assert_eq!(layer_ratio(2, 5), 0.5);
    }

    #[test]
    fn ratio_of_single_layer_is_zero() {
        assert_eq!(layer_ratio(0, 1), 0.0);
        assert!(layer_ratio(0, 1).is_finite());
    }

    // -- Scatter --

    #[test]
    fn scatter_body_uses_palette_color_and_alpha_range() {
        let spec = PosterSpec::new(3)
            .with_alpha_range(ValueRange::new(0.3, 0.4))
            .resolve()
            .unwrap();
        let palette = Palette::ocean();
        for seed in 0..50 {
            let shapes = place(&ScatterLayout, &spec, &palette, 0, seed);
            assert_eq!(shapes.len(), 1);
            let body = &shapes[0];
            assert_eq!(body.role, ShapeRole::Body);
            assert!(palette.colors().any(|c| c == body.fill.color));
            assert!((0.3..0.4).contains(&body.fill.alpha), "{}", body.fill.alpha);
            assert_eq!(body.points.len(), 200);
        }
    }

    #[test]
    fn scatter_fixed_wobble_zero_gives_circle_within_radius_range() {
        let spec = PosterSpec::new(3)
            .with_wobble(Wobble::Fixed(0.0))
            .with_radius_range(ValueRange::new(0.2, 0.3))
            .resolve()
            .unwrap();
        let shapes = place(&ScatterLayout, &spec, &Palette::ocean(), 0, 11);
        let points = &shapes[0].points;
        let center = crate::shape::centroid(points).unwrap();
        let d = points[0].distance(center);
        assert!((0.2..0.3).contains(&d), "{d}");
        for p in points {
            assert!((p.distance(center) - d).abs() < 1e-9);
        }
    }

    // -- Wave --

    fn ocean_spec(n_layers: usize) -> ResolvedSpec {
        PosterSpec::new(0)
            .with_preset(StylePreset::Ocean)
            .with_layers(n_layers)
            .resolve()
            .unwrap()
    }

    #[test]
    fn wave_layers_climb_and_shrink() {
        let spec = ocean_spec(5);
        let palette = Palette::ocean();
        let first = place(&WaveLayout, &spec, &palette, 0, 1);
        let last = place(&WaveLayout, &spec, &palette, 4, 1);
        let c0 = crate::shape::centroid(&bodies(&first)[0].points).unwrap();
        let c4 = crate::shape::centroid(&bodies(&last)[0].points).unwrap();
        assert!(c4.y > c0.y + 0.4, "{c0} -> {c4}");
        assert!((bodies(&first)[0].fill.alpha - 0.5).abs() < 1e-12);
        assert!((bodies(&last)[0].fill.alpha - 0.8).abs() < 1e-12);
    }

    #[test]
    fn wave_single_layer_sits_at_gradient_start() {
        let spec = ocean_spec(1);
        let shapes = place(&WaveLayout, &spec, &Palette::ocean(), 0, 9);
        assert_eq!(shapes.len(), 1, "no foam at ratio 0");
        let c = crate::shape::centroid(&shapes[0].points).unwrap();
        assert!((c.y - 0.2).abs() < 0.05, "{c}");
        assert!((c.x - 0.5).abs() <= 0.2 + 0.05, "{c}");
    }

    #[test]
    fn wave_gradient_lookup_for_persisted_table() {
        let mut spec = ocean_spec(10);
        spec.palette_mode = PaletteMode::Persisted;
        let palette = Palette::ocean();
        let expected = [(0, 0), (2, 0), (3, 1), (5, 1), (6, 2), (9, 2)];
        for (layer, entry) in expected {
            let shapes = place(&WaveLayout, &spec, &palette, layer, 5);
            assert_eq!(
                bodies(&shapes)[0].fill.color,
                palette.color(entry).unwrap(),
                "layer {layer}"
            );
        }
    }

    #[test]
    fn wave_short_persisted_table_falls_back_to_random_choice() {
        let mut spec = ocean_spec(10);
        spec.palette_mode = PaletteMode::Persisted;
        let palette = Palette::new(vec![
            Swatch::named("a", Srgb::new(0.1, 0.1, 0.1)),
            Swatch::named("b", Srgb::new(0.9, 0.9, 0.9)),
        ])
        .unwrap();
        let seen: std::collections::HashSet<_> = (0..40)
            .map(|seed| bodies(&place(&WaveLayout, &spec, &palette, 0, seed))[0].fill.color.to_hex())
            .collect();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn wave_foam_lies_on_crest_with_accent_color() {
        let spec = ocean_spec(8);
        let palette = Palette::ocean();
        let mut found = 0;
        for seed in 0..60 {
            let shapes = place(&WaveLayout, &spec, &palette, 7, seed);
            let body = bodies(&shapes)[0];
            if let Some(foam) = shapes.iter().find(|s| s.role == ShapeRole::Foam) {
                found += 1;
                assert_eq!(shapes.last().map(|s| s.role), Some(ShapeRole::Foam));
                assert_eq!(foam.fill.color, palette.color(3).unwrap());
                assert_eq!(foam.fill.alpha, FOAM_ALPHA);
                assert!(foam.points.len() >= FOAM_MIN_POINTS);
                assert!(foam.points.len() < body.points.len());
                let top = body.points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
                for p in &foam.points {
                    assert!(p.y <= top + 0.011, "foam point {p} above crest {top}");
                }
            }
        }
        assert!(found > 10, "foam drawn only {found} times");
    }

    #[test]
    fn wave_foam_never_below_high_layers() {
        let spec = ocean_spec(8);
        let palette = Palette::ocean();
        for layer in 0..=4 {
            for seed in 0..20 {
                let shapes = place(&WaveLayout, &spec, &palette, layer, seed);
                assert!(shapes.iter().all(|s| s.role != ShapeRole::Foam));
            }
        }
    }

    #[test]
    fn wave_foam_can_be_disabled() {
        let mut spec = ocean_spec(8);
        spec.foam = false;
        for seed in 0..30 {
            let shapes = place(&WaveLayout, &spec, &Palette::ocean(), 7, seed);
            assert_eq!(shapes.len(), 1);
        }
    }

    #[test]
    fn foam_with_too_few_crest_points_is_skipped_without_drawing() {
        let points: Vec<DVec2> = (0..19).map(|i| DVec2::new(i as f64, 1.0)).collect();
        let mut rng = Xorshift64::new(4);
        let mut reference = Xorshift64::new(4);
        assert!(WaveLayout::foam(&points, 0.5, &mut rng).is_none());
        assert_eq!(rng.next_u64(), reference.next_u64());

        let points: Vec<DVec2> = (0..20).map(|i| DVec2::new(i as f64, 1.0)).collect();
        assert_eq!(WaveLayout::foam(&points, 0.5, &mut rng).unwrap().len(), 20);
    }

    #[test]
    fn foam_uses_white_without_fourth_entry() {
        let palette = Palette::from_colors([Srgb::BLACK, Srgb::BLACK, Srgb::BLACK]).unwrap();
        assert_eq!(palette.color(3).unwrap_or(Srgb::WHITE), Srgb::WHITE);
        let spec = ocean_spec(8);
        for seed in 0..60 {
            let shapes = place(&WaveLayout, &spec, &palette, 7, seed);
            if let Some(foam) = shapes.iter().find(|s| s.role == ShapeRole::Foam) {
                assert_eq!(foam.fill.color, Srgb::WHITE);
                return;
            }
        }
        panic!("no foam drawn in 60 seeds");
    }

    // -- Depth --

    fn depth_spec(n_layers: usize) -> ResolvedSpec {
        PosterSpec::new(0)
            .with_preset(StylePreset::Depth)
            .with_layers(n_layers)
            .resolve()
            .unwrap()
    }

    #[test]
    fn depth_shadow_precedes_body_and_fades() {
        let spec = depth_spec(8);
        let palette = Palette::ocean();
        let near = place(&DepthLayout, &spec, &palette, 0, 3);
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].role, ShapeRole::Shadow);
        assert_eq!(near[1].role, ShapeRole::Body);
        assert!((near[0].fill.alpha - 0.12).abs() < 1e-12);
        assert_eq!(near[0].fill.color, SHADOW_COLOR);

        let layer5 = place(&DepthLayout, &spec, &palette, 5, 3);
        assert!((layer5[0].fill.alpha - 0.02).abs() < 1e-9);

        let far = place(&DepthLayout, &spec, &palette, 6, 3);
        assert_eq!(far.len(), 1, "shadow alpha reaches zero at depth 6");
    }

    #[test]
    fn depth_shadow_is_scaled_and_offset_copy() {
        let spec = depth_spec(6);
        let shapes = place(&DepthLayout, &spec, &Palette::ocean(), 2, 21);
        let (shadow, body) = (&shapes[0], &shapes[1]);
        assert_eq!(shadow.points.len(), body.points.len());
        let body_c = crate::shape::centroid(&body.points).unwrap();
        let shadow_c = crate::shape::centroid(&shadow.points).unwrap();
        let offset = shadow_c - body_c;
        assert!((offset.x - 0.015).abs() < 0.01, "{offset}");
        assert!((offset.y + 0.015).abs() < 0.01, "{offset}");
    }

    #[test]
    fn depth_alpha_grows_with_depth_and_caps_at_one() {
        assert!((DepthLayout::body_alpha(0) - 0.5).abs() < 1e-12);
        assert!((DepthLayout::body_alpha(3) - 0.74).abs() < 1e-12);
        assert_eq!(DepthLayout::body_alpha(7), 1.0);
        assert_eq!(DepthLayout::body_alpha(19), 1.0);
    }

    #[test]
    fn depth_tint_is_warm_near_and_cool_far() {
        let spec = depth_spec(6);
        let palette = Palette::ocean();
        for seed in 0..30 {
            let near = bodies(&place(&DepthLayout, &spec, &palette, 2, seed))[0].fill.color;
            assert!(near.r > near.b, "near {near:?}");
            let far = bodies(&place(&DepthLayout, &spec, &palette, 3, seed))[0].fill.color;
            assert!(far.b > far.r, "far {far:?}");
            for c in [near, far] {
                assert!([c.r, c.g, c.b].iter().all(|ch| (0.0..=1.0).contains(ch)));
            }
        }
    }

    #[test]
    fn depth_shadows_can_be_disabled() {
        let mut spec = depth_spec(6);
        spec.shadows = false;
        let shapes = place(&DepthLayout, &spec, &Palette::ocean(), 0, 1);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].role, ShapeRole::Body);
    }

    // -- Dispatch --

    #[test]
    fn kind_dispatch_matches_concrete_layout() {
        let spec = depth_spec(6);
        let palette = Palette::ocean();
        assert_eq!(
            place(&LayoutKind::Depth, &spec, &palette, 1, 8),
            place(&DepthLayout, &spec, &palette, 1, 8)
        );
        assert_eq!(
            place(&LayoutKind::Scatter, &spec, &palette, 1, 8),
            place(&ScatterLayout, &spec, &palette, 1, 8)
        );
    }
}
