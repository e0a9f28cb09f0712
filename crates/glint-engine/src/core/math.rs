//! Small vector helpers shared by the hold kernels and the sampler.

use glam::Vec3;

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f32 = 1e-6;

/// Normalize `v`, or return `fallback` when `v` is (nearly) zero-length.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len = v.length();
    if len > EPSILON && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

/// A unit vector perpendicular to `normal`, running around the world Y axis.
/// Falls back to +X when `normal` is parallel to Y.
#[inline]
pub fn tangent_of(normal: Vec3) -> Vec3 {
    safe_normalize(Vec3::Y.cross(normal), Vec3::X)
}

/// Fractional part in [0, 1), also for negative inputs.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Deterministic hash of a float into [0, 1).
#[inline]
pub fn hash01(x: f32) -> f32 {
    fract((x * 12.9898 + 78.233).sin() * 43758.547)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_uses_fallback() {
        assert_eq!(safe_normalize(Vec3::ZERO, Vec3::Y), Vec3::Y);
        let n = safe_normalize(Vec3::new(3.0, 0.0, 4.0), Vec3::Y);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tangent_is_perpendicular() {
        let n = Vec3::new(1.0, 0.0, 0.0);
        let t = tangent_of(n);
        assert!(t.dot(n).abs() < 1e-6);
        assert_eq!(tangent_of(Vec3::Y), Vec3::X);
    }

    #[test]
    fn fract_wraps_negative() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert!((hash01(3.0) - hash01(3.0)).abs() < f32::EPSILON);
        let h = hash01(17.5);
        assert!((0.0..1.0).contains(&h));
    }
}
