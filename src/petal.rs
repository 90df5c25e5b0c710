//! Spherical multi-lobed petal curve generator.
//!
//! A petal is a closed curve on the unit sphere whose radial profile pinches
//! at every lobe boundary and bulges at every lobe midpoint:
//!
//! ```text
//! r(t) = radius · (join + (1 − join) · sin(π · (t mod lobeAngle) / lobeAngle))
//! ```
//!
//! with `lobeAngle = τ / lobes`. `join = 0` gives sharp cusps that touch the
//! center, `join = 1` degenerates to a plain circle. The generator walks the
//! sweep parameter in `precision`-sized steps, converts each polar sample to
//! a cartesian unit vector and back to spherical coordinates, and re-centers
//! the ring on an arbitrary `[λ, φ]` through an inverse Euler rotation.

use crate::geo::{self, DEGREES, EPSILON, RADIANS, Rotation, TAU};
use crate::scene::Ring;
use std::f64::consts::PI;

/// Angular extent of a partial petal, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Span {
    /// Sweep from 0° to the given angle.
    To(f64),
    /// Sweep between the two given angles.
    Between(f64, f64),
}

/// Immutable petal configuration.
///
/// All angles are degrees. Construct with [`PetalConfig::default`] and refine
/// with the chainable `with_*` methods; the struct is `Copy`, so a base
/// configuration can be specialized per draw call without mutation.
#[derive(Clone, Copy, Debug)]
pub struct PetalConfig {
    center: [f64; 2],
    radius: f64,
    precision: f64,
    lobes: u32,
    join_ratio: f64,
    span: Option<Span>,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            radius: 90.0,
            precision: 0.2,
            lobes: 10,
            join_ratio: 0.5,
            span: None,
        }
    }
}

impl PetalConfig {
    pub fn with_center(mut self, center: [f64; 2]) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Angular step of the sweep; smaller is smoother. A sensible default is
    /// `2 / lobes` so every lobe gets the same vertex budget.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_lobes(mut self, lobes: u32) -> Self {
        self.lobes = lobes;
        self
    }

    pub fn with_join_ratio(mut self, join_ratio: f64) -> Self {
        self.join_ratio = join_ratio;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn full_circle(mut self) -> Self {
        self.span = None;
        self
    }

    /// Generates the closed polygon ring for this configuration, as
    /// `[longitude, latitude]` degrees.
    ///
    /// A zero or non-finite `precision` yields an empty ring: an absent
    /// angular step produces no sweep output.
    pub fn ring(&self) -> Ring {
        let radius = self.radius * RADIANS;
        let delta = self.precision * RADIANS;
        let rotation = Rotation::new(
            -self.center[0] * RADIANS,
            -self.center[1] * RADIANS,
            0.0,
        );

        // Span endpoints expressed as spherical points on the circle of the
        // configured radius; a single-angle span sweeps from 0° to it.
        let endpoints = self.span.map(|span| {
            let point_at = |angle_degrees: f64| {
                let a = angle_degrees * RADIANS;
                [-radius * a.cos(), -radius * a.sin()]
            };
            match span {
                Span::To(angle) => (point_at(angle), [-radius, 0.0]),
                Span::Between(a, b) => (point_at(a), point_at(b)),
            }
        });

        let mut local = Vec::new();
        sweep(
            &mut local,
            radius,
            delta,
            1.0,
            endpoints,
            self.lobes,
            self.join_ratio,
        );

        Ring(
            local
                .into_iter()
                .map(|point| {
                    let [lon, lat] = rotation.invert(point);
                    [lon * DEGREES, lat * DEGREES]
                })
                .collect(),
        )
    }
}

/// Walks the petal sweep, appending local-frame `[λ, φ]` radian points.
///
/// With `endpoints` absent the sweep covers the full circle. Otherwise the
/// local pole is emitted first so the partial petal closes back through the
/// origin, the endpoints are resolved to sweep parameters on the lobe
/// profile's circumscribing circle, and an inverted pair is normalized by a
/// full turn so the sweep always proceeds in `direction`.
fn sweep(
    points: &mut Vec<[f64; 2]>,
    radius: f64,
    delta: f64,
    direction: f64,
    endpoints: Option<([f64; 2], [f64; 2])>,
    lobes: u32,
    join_ratio: f64,
) {
    if !(delta > 0.0) || !delta.is_finite() {
        return;
    }
    let step = direction * delta;
    let lobe_angle = TAU / f64::from(lobes.max(1));

    let (t0, t1) = match endpoints {
        None => (direction * TAU, -step / 2.0),
        Some((start, end)) => {
            points.push([0.0, 0.0]);
            let cos_radius = radius.cos();
            let mut t0 = locate_angle(cos_radius, start);
            let t1 = locate_angle(cos_radius, end);
            if direction > 0.0 && t0 < t1 || direction < 0.0 && t0 > t1 {
                t0 += direction * TAU;
            }
            (t0, t1)
        }
    };

    let mut t = t0;
    while if direction > 0.0 { t > t1 } else { t < t1 } {
        let r = radius
            * (join_ratio + (1.0 - join_ratio) * (PI * (t % lobe_angle) / lobe_angle).sin());
        points.push(geo::spherical([
            r.cos(),
            -r.sin() * t.cos(),
            -r.sin() * t.sin(),
        ]));
        t -= step;
    }
}

/// Signed sweep parameter of `point` on the circle of the given radius,
/// measured relative to the cartesian axis `[cosRadius, 0, 0]` and shifted
/// into `[0, τ)` with an epsilon so the 0/τ seam never produces an empty or
/// endless sweep.
fn locate_angle(cos_radius: f64, point: [f64; 2]) -> f64 {
    let mut p = geo::cartesian(point);
    p[0] -= cos_radius;
    geo::normalize_in_place(&mut p);
    let angle = (-p[1]).acos();
    let signed = if -p[2] < 0.0 { -angle } else { angle };
    (signed + TAU - EPSILON) % TAU
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn angular_distance_degrees(a: [f64; 2], b: [f64; 2]) -> f64 {
        let va = geo::cartesian([a[0] * RADIANS, a[1] * RADIANS]);
        let vb = geo::cartesian([b[0] * RADIANS, b[1] * RADIANS]);
        let dot = va[0] * vb[0] + va[1] * vb[1] + va[2] * vb[2];
        dot.clamp(-1.0, 1.0).acos() * DEGREES
    }

    #[test]
    fn full_circle_ring_closes_within_precision() {
        let config = PetalConfig::default().with_radius(30.0).with_precision(0.2);
        let ring = config.ring();
        assert!(ring.len() > 100);
        let first = ring[0];
        let last = ring[ring.len() - 1];
        assert!(angular_distance_degrees(first, last) <= 0.2);
    }

    #[test]
    fn zero_precision_yields_empty_ring() {
        let ring = PetalConfig::default().with_precision(0.0).ring();
        assert!(ring.is_empty());
    }

    #[test]
    fn non_finite_precision_yields_empty_ring() {
        let ring = PetalConfig::default().with_precision(f64::NAN).ring();
        assert!(ring.is_empty());
    }

    #[test]
    fn join_ratio_one_degenerates_to_circle() {
        let ring = PetalConfig::default()
            .with_radius(20.0)
            .with_join_ratio(1.0)
            .ring();
        for point in ring.iter() {
            assert_relative_eq!(
                angular_distance_degrees(*point, [0.0, 0.0]),
                20.0,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn lobe_profile_pinches_to_join_ratio() {
        let ring = PetalConfig::default()
            .with_radius(40.0)
            .with_join_ratio(0.25)
            .with_precision(0.05)
            .ring();
        let distances: Vec<f64> = ring
            .iter()
            .map(|p| angular_distance_degrees(*p, [0.0, 0.0]))
            .collect();
        let min = distances.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = distances.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(min, 10.0, epsilon = 0.05);
        assert_relative_eq!(max, 40.0, epsilon = 0.05);
    }

    #[test]
    fn partial_span_includes_pole_exactly_once() {
        let ring = PetalConfig::default()
            .with_radius(30.0)
            .with_span(Span::Between(90.0, 0.0))
            .ring();
        let near_center = ring
            .iter()
            .filter(|p| angular_distance_degrees(**p, [0.0, 0.0]) < 1e-9)
            .count();
        assert_eq!(near_center, 1);
        // The closing vertex comes first, before the arc itself.
        assert!(angular_distance_degrees(ring[0], [0.0, 0.0]) < 1e-9);
    }

    #[test]
    fn partial_span_stays_within_requested_arc() {
        // A quarter sweep must produce roughly a quarter of the full ring.
        let full = PetalConfig::default().with_radius(30.0).ring().len();
        let quarter = PetalConfig::default()
            .with_radius(30.0)
            .with_span(Span::Between(90.0, 0.0))
            .ring()
            .len();
        let ratio = quarter as f64 / full as f64;
        assert!(ratio > 0.2 && ratio < 0.3, "ratio was {ratio}");
    }

    #[test]
    fn recentered_ring_surrounds_the_pole() {
        let ring = PetalConfig::default()
            .with_center([0.0, 90.0])
            .with_radius(15.0)
            .with_join_ratio(1.0)
            .ring();
        for point in ring.iter() {
            assert_relative_eq!(point[1], 75.0, epsilon = 1e-6);
        }
    }
}
