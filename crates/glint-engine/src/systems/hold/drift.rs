//! Incremental positional drift.
//!
//! The drift offset travels `distance` over one gesture duration and is then
//! either clamped or bounced back, so it never leaves a ball of radius
//! `distance` around the element's original position.

use glam::Vec3;
use crate::core::math::{safe_normalize, tangent_of};
use crate::core::random::RandomSource;

/// Direction table for drift travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftDirection {
    /// Along the element's outward surface normal.
    #[default]
    Outward,
    Inward,
    Up,
    Down,
    /// Around the world Y axis, perpendicular to the normal.
    Tangent,
    /// A random direction chosen once per element.
    Random,
}

impl DriftDirection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "outward" => Some(Self::Outward),
            "inward" => Some(Self::Inward),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "tangent" => Some(Self::Tangent),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    /// Unit vector for this direction given the element's outward normal.
    pub fn resolve(self, outward: Vec3, rng: &mut dyn RandomSource) -> Vec3 {
        let outward = safe_normalize(outward, Vec3::Y);
        match self {
            DriftDirection::Outward => outward,
            DriftDirection::Inward => -outward,
            DriftDirection::Up => Vec3::Y,
            DriftDirection::Down => Vec3::NEG_Y,
            DriftDirection::Tangent => tangent_of(outward),
            DriftDirection::Random => rng.unit_vector(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftConfig {
    pub direction: DriftDirection,
    /// Maximum offset from the original position.
    pub distance: f32,
    /// Amplitude of wandering added to each step, relative to the step.
    pub noise: f32,
    /// Reflect at `distance` instead of clamping.
    pub bounce: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            direction: DriftDirection::Outward,
            distance: 0.1,
            noise: 0.0,
            bounce: false,
        }
    }
}

impl DriftConfig {
    pub fn with_direction(mut self, direction: DriftDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }
}

/// Accumulated drift for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftState {
    pub offset: Vec3,
    direction: Vec3,
    /// +1 travelling out, -1 travelling back after a bounce.
    sign: f32,
    noise_phase: f32,
}

impl DriftState {
    pub fn new(config: &DriftConfig, outward: Vec3, rng: &mut dyn RandomSource) -> Self {
        Self {
            offset: Vec3::ZERO,
            direction: config.direction.resolve(outward, rng),
            sign: 1.0,
            noise_phase: rng.next_f32() * std::f32::consts::TAU,
        }
    }

    /// Resolved unit travel direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Current travel velocity in units per second.
    ///
    /// Zero once a clamped drift has reached `distance`; a bouncing drift
    /// reports its reversed heading on the way back.
    pub fn velocity(&self, config: &DriftConfig, gesture_duration: f32, speed_scale: f32) -> Vec3 {
        if gesture_duration <= 0.0 || config.distance <= 0.0 {
            return Vec3::ZERO;
        }
        if !config.bounce && self.offset.length() + 1e-6 >= config.distance {
            return Vec3::ZERO;
        }
        self.direction * self.sign * (config.distance / gesture_duration * 1000.0 * speed_scale)
    }

    /// Clear accumulated offset (on respawn).
    pub fn reset(&mut self) {
        self.offset = Vec3::ZERO;
        self.sign = 1.0;
    }
}

/// Advance drift by `dt` ms and return the new offset.
///
/// `t` is seconds into the hold phase (drives the noise), `speed_scale`
/// multiplies the per-ms step.
pub fn drift(
    config: &DriftConfig,
    state: &mut DriftState,
    gesture_duration: f32,
    dt: f32,
    t: f32,
    speed_scale: f32,
) -> Vec3 {
    if gesture_duration <= 0.0 || dt <= 0.0 || config.distance <= 0.0 {
        return state.offset;
    }
    let step = config.distance / gesture_duration * dt * speed_scale;
    let mut increment = state.direction * step * state.sign;
    if config.noise > 0.0 {
        let p = state.noise_phase;
        let wander = Vec3::new(
            (t * 3.1 + p).sin(),
            (t * 2.3 + p * 1.7).sin(),
            (t * 2.7 + p * 2.3).sin(),
        );
        increment += wander * config.noise * step;
    }
    state.offset += increment;

    let len = state.offset.length();
    if len > config.distance {
        if config.bounce {
            let excess = len - config.distance;
            let reflected = (config.distance - excess).max(0.0);
            state.offset *= reflected / len;
            state.sign = -state.sign;
        } else {
            state.offset *= config.distance / len;
        }
    }
    state.offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::Rng;

    fn up_state(config: &DriftConfig) -> DriftState {
        DriftState::new(config, Vec3::X, &mut Rng::new(3))
    }

    #[test]
    fn half_gesture_covers_half_distance() {
        let cfg = DriftConfig::default()
            .with_direction(DriftDirection::Up)
            .with_distance(0.2);
        let mut state = up_state(&cfg);
        for _ in 0..50 {
            drift(&cfg, &mut state, 1000.0, 10.0, 0.0, 1.0);
        }
        assert!((state.offset.y - 0.1).abs() < 1e-4, "y = {}", state.offset.y);
    }

    #[test]
    fn clamps_at_distance() {
        let cfg = DriftConfig::default()
            .with_direction(DriftDirection::Up)
            .with_distance(0.2)
            .with_noise(0.5);
        let mut state = up_state(&cfg);
        for i in 0..500 {
            let offset = drift(&cfg, &mut state, 1000.0, 16.0, i as f32 * 0.016, 1.0);
            assert!(offset.length() <= 0.2 + 1e-5);
        }
    }

    #[test]
    fn bounce_reverses_travel() {
        let cfg = DriftConfig::default()
            .with_direction(DriftDirection::Up)
            .with_distance(0.1)
            .with_bounce(true);
        let mut state = up_state(&cfg);
        // 1.5 gestures: out to 0.1 then back halfway
        for _ in 0..150 {
            drift(&cfg, &mut state, 1000.0, 10.0, 0.0, 1.0);
        }
        assert!((state.offset.y - 0.05).abs() < 1e-3, "y = {}", state.offset.y);
    }

    #[test]
    fn velocity_follows_heading_and_speed() {
        let cfg = DriftConfig::default()
            .with_direction(DriftDirection::Up)
            .with_distance(0.1)
            .with_bounce(true);
        let mut state = up_state(&cfg);
        // 0.1 over 1000ms is 0.1 per second, doubled by the speed factor
        assert!((state.velocity(&cfg, 1000.0, 2.0).y - 0.2).abs() < 1e-6);

        for _ in 0..150 {
            drift(&cfg, &mut state, 1000.0, 10.0, 0.0, 1.0);
        }
        assert!(state.velocity(&cfg, 1000.0, 1.0).y < 0.0);
    }

    #[test]
    fn clamped_drift_stops_moving() {
        let cfg = DriftConfig::default()
            .with_direction(DriftDirection::Up)
            .with_distance(0.1);
        let mut state = up_state(&cfg);
        for _ in 0..200 {
            drift(&cfg, &mut state, 1000.0, 10.0, 0.0, 1.0);
        }
        assert_eq!(state.velocity(&cfg, 1000.0, 1.0), Vec3::ZERO);
    }

    #[test]
    fn zero_dt_is_noop() {
        let cfg = DriftConfig::default().with_noise(1.0);
        let mut state = up_state(&cfg);
        drift(&cfg, &mut state, 1000.0, 100.0, 0.1, 1.0);
        let before = state.offset;
        drift(&cfg, &mut state, 1000.0, 0.0, 0.2, 1.0);
        assert_eq!(before, state.offset);
    }

    #[test]
    fn direction_table() {
        let mut rng = Rng::new(1);
        assert_eq!(DriftDirection::Inward.resolve(Vec3::X, &mut rng), Vec3::NEG_X);
        assert_eq!(DriftDirection::Down.resolve(Vec3::X, &mut rng), Vec3::NEG_Y);
        let t = DriftDirection::Tangent.resolve(Vec3::X, &mut rng);
        assert!(t.dot(Vec3::X).abs() < 1e-6);
        let r = DriftDirection::Random.resolve(Vec3::X, &mut rng);
        assert!((r.length() - 1.0).abs() < 1e-4);
    }
}
