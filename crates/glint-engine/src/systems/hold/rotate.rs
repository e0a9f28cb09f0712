//! Rotation offset modifier.

use glam::Vec3;
use crate::core::math::safe_normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotateMode {
    /// Spin around the axis forever.
    #[default]
    Continuous,
    /// Rock back and forth within `range`.
    Oscillate,
    /// Continuous spin with the axis chosen round-robin (X, Y, Z) by element index.
    Gyroscope,
}

impl RotateMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "continuous" | "spin" => Some(Self::Continuous),
            "oscillate" | "oscillating" => Some(Self::Oscillate),
            "gyroscope" => Some(Self::Gyroscope),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateConfig {
    pub axis: Vec3,
    /// Radians per second.
    pub speed: f32,
    pub mode: RotateMode,
    /// Oscillation amplitude in radians.
    pub range: f32,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            speed: 1.0,
            mode: RotateMode::Continuous,
            range: std::f32::consts::FRAC_PI_8,
        }
    }
}

impl RotateConfig {
    pub fn with_axis(mut self, axis: Vec3) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_mode(mut self, mode: RotateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Axis this element actually rotates about.
    pub fn axis_for(&self, index: usize) -> Vec3 {
        match self.mode {
            RotateMode::Gyroscope => match index % 3 {
                0 => Vec3::X,
                1 => Vec3::Y,
                _ => Vec3::Z,
            },
            _ => safe_normalize(self.axis, Vec3::Y),
        }
    }
}

/// New rotation offset (Euler radians) for element `index`.
///
/// Continuous modes add `axis * speed * dt` to `current`; oscillation is a
/// closed form in `t`. Both times are seconds.
pub fn rotate(
    config: &RotateConfig,
    index: usize,
    current: Vec3,
    t: f32,
    dt: f32,
    speed_scale: f32,
) -> Vec3 {
    let axis = config.axis_for(index);
    let speed = config.speed * speed_scale;
    match config.mode {
        RotateMode::Continuous | RotateMode::Gyroscope => current + axis * speed * dt,
        RotateMode::Oscillate => axis * (2.0 * speed * t).sin() * config.range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_accumulates() {
        let cfg = RotateConfig::default().with_speed(2.0);
        let mut r = Vec3::ZERO;
        for _ in 0..10 {
            r = rotate(&cfg, 0, r, 0.0, 0.1, 1.0);
        }
        assert!((r.y - 2.0).abs() < 1e-5);
        assert_eq!(r.x, 0.0);
    }

    #[test]
    fn oscillation_stays_in_range() {
        let cfg = RotateConfig::default()
            .with_mode(RotateMode::Oscillate)
            .with_range(0.5)
            .with_axis(Vec3::Z);
        for i in 0..100 {
            let r = rotate(&cfg, 0, Vec3::ZERO, i as f32 * 0.05, 0.05, 1.0);
            assert!(r.z.abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn gyroscope_round_robins_axes() {
        let cfg = RotateConfig::default().with_mode(RotateMode::Gyroscope);
        assert_eq!(cfg.axis_for(0), Vec3::X);
        assert_eq!(cfg.axis_for(1), Vec3::Y);
        assert_eq!(cfg.axis_for(2), Vec3::Z);
        assert_eq!(cfg.axis_for(5), Vec3::Z);
    }

    #[test]
    fn zero_axis_falls_back_to_y() {
        let cfg = RotateConfig::default().with_axis(Vec3::ZERO);
        assert_eq!(cfg.axis_for(0), Vec3::Y);
    }
}
