//! Stateless spherical trigonometry helpers shared by the petal generator.
//!
//! Points are `[longitude, latitude]` pairs in radians unless a function says
//! otherwise; 3-vectors are unit cartesian coordinates on the sphere.

use std::f64::consts::PI;

pub const TAU: f64 = 2.0 * PI;

/// Tolerance for angle comparisons near the 0/τ seam.
pub const EPSILON: f64 = 1e-6;

pub const DEGREES: f64 = 180.0 / PI;
pub const RADIANS: f64 = PI / 180.0;

/// Converts spherical `[λ, φ]` (radians) to a unit cartesian 3-vector.
pub fn cartesian(spherical: [f64; 2]) -> [f64; 3] {
    let [lambda, phi] = spherical;
    let cos_phi = phi.cos();
    [cos_phi * lambda.cos(), cos_phi * lambda.sin(), phi.sin()]
}

/// Converts a cartesian 3-vector back to spherical `[λ, φ]` (radians).
pub fn spherical(cartesian: [f64; 3]) -> [f64; 2] {
    [cartesian[1].atan2(cartesian[0]), cartesian[2].asin()]
}

/// Rescales a 3-vector to unit length in place.
pub fn normalize_in_place(v: &mut [f64; 3]) {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    v[0] /= len;
    v[1] /= len;
    v[2] /= len;
}

fn wrap_longitude(lambda: f64) -> f64 {
    if lambda > PI {
        lambda - TAU
    } else if lambda < -PI {
        lambda + TAU
    } else {
        lambda
    }
}

/// An Euler rotation of the sphere, precomputed from `(δλ, δφ, δγ)` in radians.
///
/// `forward` rotates a point by the configured angles; `invert` undoes it.
/// The petal generator builds rings around the local pole and uses `invert`
/// to re-center them on an arbitrary `[λ, φ]`.
#[derive(Clone, Copy, Debug)]
pub struct Rotation {
    delta_lambda: f64,
    cos_delta_phi: f64,
    sin_delta_phi: f64,
    cos_delta_gamma: f64,
    sin_delta_gamma: f64,
}

impl Rotation {
    pub fn new(delta_lambda: f64, delta_phi: f64, delta_gamma: f64) -> Self {
        Self {
            delta_lambda: delta_lambda % TAU,
            cos_delta_phi: delta_phi.cos(),
            sin_delta_phi: delta_phi.sin(),
            cos_delta_gamma: delta_gamma.cos(),
            sin_delta_gamma: delta_gamma.sin(),
        }
    }

    /// Applies the rotation to `[λ, φ]` (radians).
    pub fn forward(&self, point: [f64; 2]) -> [f64; 2] {
        let lambda = wrap_longitude(point[0] + self.delta_lambda);
        let phi = point[1];
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * self.cos_delta_phi + x * self.sin_delta_phi;
        [
            (y * self.cos_delta_gamma - k * self.sin_delta_gamma)
                .atan2(x * self.cos_delta_phi - z * self.sin_delta_phi),
            (k * self.cos_delta_gamma + y * self.sin_delta_gamma).asin(),
        ]
    }

    /// Applies the inverse rotation to `[λ, φ]` (radians).
    pub fn invert(&self, point: [f64; 2]) -> [f64; 2] {
        let [lambda, phi] = point;
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * self.cos_delta_gamma - y * self.sin_delta_gamma;
        let unrotated_lambda = (y * self.cos_delta_gamma + z * self.sin_delta_gamma)
            .atan2(x * self.cos_delta_phi + k * self.sin_delta_phi);
        [
            wrap_longitude(unrotated_lambda - self.delta_lambda),
            (k * self.cos_delta_phi - x * self.sin_delta_phi).asin(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cartesian_round_trip() {
        let p = [0.7, -0.3];
        let back = spherical(cartesian(p));
        assert_relative_eq!(back[0], p[0], epsilon = 1e-12);
        assert_relative_eq!(back[1], p[1], epsilon = 1e-12);
    }

    #[test]
    fn rotation_forward_then_invert_is_identity() {
        let rotation = Rotation::new(0.4, -1.1, 0.25);
        let p = [1.2, 0.5];
        let back = rotation.invert(rotation.forward(p));
        assert_relative_eq!(back[0], p[0], epsilon = 1e-12);
        assert_relative_eq!(back[1], p[1], epsilon = 1e-12);
    }

    #[test]
    fn pole_recentering_moves_origin_to_pole() {
        // The generator rotates by (-λ, -φ, 0) and inverts; the local origin
        // must land on the requested center.
        let center = [0.0, PI / 2.0];
        let rotation = Rotation::new(-center[0], -center[1], 0.0);
        let moved = rotation.invert([0.0, 0.0]);
        assert_relative_eq!(moved[1], PI / 2.0, epsilon = 1e-12);
    }
}
