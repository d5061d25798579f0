//! Blob generation: closed polygons approximating a wobbly circle.
//!
//! A blob has `point_count` vertices at evenly spaced angles over [0, 2π),
//! endpoint excluded so there is no duplicate seam vertex. Each vertex radius
//! is perturbed by one uniform draw. The polygon is implicitly closed: the
//! rasterizer connects the last vertex back to the first.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::PosterError;
use crate::prng::Xorshift64;

/// Polygon resolution used when none is requested.
pub const DEFAULT_POINT_COUNT: usize = 200;

/// Smallest point count that still forms a polygon.
pub const MIN_POINT_COUNT: usize = 3;

/// Per-angle modulation of the wobble amplitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleWeight {
    /// Every vertex wobbles with the full amplitude.
    #[default]
    Uniform,
    /// `0.6 + 0.4·cos θ`: strongest on the right-hand side, used for wave crests.
    Crest,
}

impl AngleWeight {
    pub fn at(self, theta: f64) -> f64 {
        match self {
            AngleWeight::Uniform => 1.0,
            AngleWeight::Crest => 0.6 + 0.4 * theta.cos(),
        }
    }
}

/// Parameters of a single blob, in normalized canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    pub center: DVec2,
    pub radius: f64,
    pub point_count: usize,
    /// Fraction of `radius`; 0 yields a perfect circle.
    pub wobble: f64,
    #[serde(default)]
    pub weight: AngleWeight,
}

impl ShapeParams {
    pub fn new(center: DVec2, radius: f64, wobble: f64) -> Self {
        Self {
            center,
            radius,
            point_count: DEFAULT_POINT_COUNT,
            wobble,
            weight: AngleWeight::Uniform,
        }
    }

    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    pub fn with_weight(mut self, weight: AngleWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Checks the parameters without drawing anything.
    pub fn validate(&self) -> Result<(), PosterError> {
        if self.point_count < MIN_POINT_COUNT {
            return Err(PosterError::InvalidShape(format!(
                "point_count must be >= {MIN_POINT_COUNT}, got {}",
                self.point_count
            )));
        }
        if !self.center.is_finite() {
            return Err(PosterError::InvalidShape(format!(
                "center must be finite, got {}",
                self.center
            )));
        }
        if !self.radius.is_finite() {
            return Err(PosterError::InvalidShape(format!(
                "radius must be finite, got {}",
                self.radius
            )));
        }
        if !self.wobble.is_finite() || self.wobble < 0.0 {
            return Err(PosterError::InvalidShape(format!(
                "wobble must be finite and >= 0, got {}",
                self.wobble
            )));
        }
        Ok(())
    }
}

/// Generates the blob vertices, drawing one value from `rng` per vertex.
///
/// Vertex `i` sits at angle `θ = 2πi / n` and radius
/// `radius · (1 + wobble · (u − 0.5) · weight(θ))`.
///
/// A non-positive radius degenerates to the single center point and draws
/// nothing. Returns `PosterError::InvalidShape` for fewer than 3 points or
/// non-finite input.
pub fn generate_blob(params: &ShapeParams, rng: &mut Xorshift64) -> Result<Vec<DVec2>, PosterError> {
    params.validate()?;
    if params.radius <= 0.0 {
        return Ok(vec![params.center]);
    }

    let n = params.point_count;
    let points = (0..n)
        .map(|i| {
            let theta = TAU * i as f64 / n as f64;
            let u = rng.next_f64();
            let r = params.radius * (1.0 + params.wobble * (u - 0.5) * params.weight.at(theta));
            params.center + r * DVec2::new(theta.cos(), theta.sin())
        })
        .collect();
    Ok(points)
}

/// Scales `points` about `origin` by `factor`.
pub fn scale_about(points: &[DVec2], origin: DVec2, factor: f64) -> Vec<DVec2> {
    points.iter().map(|&p| origin + (p - origin) * factor).collect()
}

/// Mean of the vertices, or `None` for an empty slice.
pub fn centroid(points: &[DVec2]) -> Option<DVec2> {
    if points.is_empty() {
        return None;
    }
    let sum: DVec2 = points.iter().copied().sum();
    Some(sum / points.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(radius: f64, wobble: f64) -> ShapeParams {
        ShapeParams::new(DVec2::new(0.5, 0.5), radius, wobble)
    }

    #[test]
    fn zero_wobble_is_perfect_circle() {
        let p = params(0.3, 0.0);
        let mut rng = Xorshift64::new(1);
        let points = generate_blob(&p, &mut rng).unwrap();
        assert_eq!(points.len(), DEFAULT_POINT_COUNT);
        for pt in &points {
            let d = pt.distance(p.center);
            assert!((d - 0.3).abs() < 1e-12, "distance {d}");
        }
    }

    #[test]
    fn point_count_two_is_rejected() {
        let p = params(0.3, 0.1).with_point_count(2);
        let mut rng = Xorshift64::new(1);
        let err = generate_blob(&p, &mut rng).unwrap_err();
        assert!(matches!(err, PosterError::InvalidShape(_)));
        assert!(err.to_string().contains("point_count"), "{err}");
    }

    #[test]
    fn rejected_shape_draws_nothing() {
        let p = params(0.3, 0.1).with_point_count(2);
        let mut rng = Xorshift64::new(9);
        let mut reference = Xorshift64::new(9);
        let _ = generate_blob(&p, &mut rng);
        assert_eq!(rng.next_u64(), reference.next_u64());
    }

    #[test]
    fn non_positive_radius_is_single_center_point() {
        let mut rng = Xorshift64::new(4);
        let mut reference = Xorshift64::new(4);
        for radius in [0.0, -0.2] {
            let p = params(radius, 0.3);
            assert_eq!(generate_blob(&p, &mut rng).unwrap(), vec![p.center]);
        }
        assert_eq!(rng.next_u64(), reference.next_u64());
    }

    #[test]
    fn negative_or_nan_wobble_is_rejected() {
        let mut rng = Xorshift64::new(4);
        assert!(generate_blob(&params(0.3, -0.1), &mut rng).is_err());
        assert!(generate_blob(&params(0.3, f64::NAN), &mut rng).is_err());
        let bad_center = ShapeParams::new(DVec2::new(f64::INFINITY, 0.5), 0.3, 0.1);
        assert!(generate_blob(&bad_center, &mut rng).is_err());
    }

    #[test]
    fn consumes_one_draw_per_vertex() {
        let p = params(0.2, 0.1).with_point_count(17);
        let mut rng = Xorshift64::new(33);
        let mut reference = Xorshift64::new(33);
        generate_blob(&p, &mut rng).unwrap();
        for _ in 0..17 {
            reference.next_u64();
        }
        assert_eq!(rng.next_u64(), reference.next_u64());
    }

    #[test]
    fn first_vertex_lies_on_positive_x_axis() {
        let p = params(0.25, 0.0).with_point_count(4);
        let points = generate_blob(&p, &mut Xorshift64::new(1)).unwrap();
        assert!((points[0] - DVec2::new(0.75, 0.5)).length() < 1e-12);
        assert!((points[1] - DVec2::new(0.5, 0.75)).length() < 1e-12);
    }

    #[test]
    fn same_seed_same_vertices() {
        let p = params(0.3, 0.25);
        let a = generate_blob(&p, &mut Xorshift64::new(77)).unwrap();
        let b = generate_blob(&p, &mut Xorshift64::new(77)).unwrap();
        assert!(a
            .iter()
            .zip(&b)
            .all(|(x, y)| x.x.to_bits() == y.x.to_bits() && x.y.to_bits() == y.y.to_bits()));
    }

    #[test]
    fn crest_weight_peaks_at_zero_and_dips_at_pi() {
        assert!((AngleWeight::Crest.at(0.0) - 1.0).abs() < 1e-12);
        assert!((AngleWeight::Crest.at(std::f64::consts::PI) - 0.2).abs() < 1e-12);
        assert_eq!(AngleWeight::Uniform.at(1.234), 1.0);
    }

    #[test]
    fn scale_about_center_keeps_center_fixed() {
        let center = DVec2::new(0.4, 0.6);
        let pts = [center, center + DVec2::new(0.1, 0.0)];
        let scaled = scale_about(&pts, center, 1.5);
        assert_eq!(scaled[0], center);
        assert!((scaled[1] - (center + DVec2::new(0.15, 0.0))).length() < 1e-12);
    }

    #[test]
    fn centroid_of_circle_is_center() {
        let p = params(0.2, 0.0);
        let points = generate_blob(&p, &mut Xorshift64::new(3)).unwrap();
        let c = centroid(&points).unwrap();
        assert!((c - p.center).length() < 1e-9, "{c}");
        assert!(centroid(&[]).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn vertex_radius_stays_within_wobble_envelope(
                seed: u64,
                radius in 0.01_f64..0.5,
                wobble in 0.0_f64..0.5,
                point_count in 3_usize..300,
                crest: bool,
            ) {
                let weight = if crest { AngleWeight::Crest } else { AngleWeight::Uniform };
                let p = params(radius, wobble)
                    .with_point_count(point_count)
                    .with_weight(weight);
                let points = generate_blob(&p, &mut Xorshift64::new(seed)).unwrap();
                prop_assert_eq!(points.len(), point_count);
                let max_dev = radius * wobble * 0.5 + 1e-12;
                for pt in points {
                    let d = pt.distance(p.center);
                    prop_assert!((d - radius).abs() <= max_dev, "d={} r={} w={}", d, radius, wobble);
                }
            }
        }
    }
}
