//! Stylized physics drift.
//!
//! Closed-form offsets (not a simulation) for falling, arcing, rising and
//! radial motion. Time is capped at `max_duration` so offsets stay bounded
//! however long an element is held.

use std::f32::consts::TAU;
use glam::Vec3;
use crate::core::math::{hash01, safe_normalize, tangent_of};

/// Finite-difference step used for velocity estimates (seconds).
const VELOCITY_STEP: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicsModel {
    /// Cling for `adherence`, then fall with constant acceleration.
    #[default]
    Gravity,
    /// Ballistic arc from a seeded launch velocity.
    Parabolic,
    /// Float upward, optionally accelerating, with a sideways wobble.
    Rising,
    Outward,
    Inward,
    /// Flow along the surface, around the world Y axis.
    Tangent,
    /// Bounded jitter around the origin.
    Random,
}

impl PhysicsModel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gravity" | "drip" => Some(Self::Gravity),
            "parabolic" | "arc" => Some(Self::Parabolic),
            "rising" | "buoyant" => Some(Self::Rising),
            "outward" => Some(Self::Outward),
            "inward" => Some(Self::Inward),
            "tangent" => Some(Self::Tangent),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsDriftConfig {
    pub model: PhysicsModel,
    /// Units per second.
    pub speed: f32,
    /// Units per second squared.
    pub gravity: f32,
    /// Milliseconds an element clings before gravity takes over.
    pub adherence: f32,
    /// Milliseconds after which motion stops advancing.
    pub max_duration: f32,
    /// Upward acceleration for `Rising`.
    pub buoyancy: f32,
    /// Sideways wobble amplitude for `Rising`.
    pub wobble: f32,
    /// Wobble cycles per second.
    pub wobble_frequency: f32,
    /// Horizontal launch spread for `Parabolic`, relative to `speed`.
    pub spread: f32,
    /// Jitter amplitude for `Random`.
    pub jitter: f32,
}

impl Default for PhysicsDriftConfig {
    fn default() -> Self {
        Self {
            model: PhysicsModel::Gravity,
            speed: 0.1,
            gravity: 0.5,
            adherence: 300.0,
            max_duration: 3000.0,
            buoyancy: 0.0,
            wobble: 0.02,
            wobble_frequency: 1.5,
            spread: 0.5,
            jitter: 0.02,
        }
    }
}

impl PhysicsDriftConfig {
    pub fn with_model(mut self, model: PhysicsModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_adherence(mut self, adherence: f32) -> Self {
        self.adherence = adherence;
        self
    }

    pub fn with_max_duration(mut self, max_duration: f32) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_buoyancy(mut self, buoyancy: f32) -> Self {
        self.buoyancy = buoyancy;
        self
    }
}

/// Deterministic per-element seed in [0, 1) from its spawn offset and index.
pub fn physics_seed(spawn_offset: f32, index: usize) -> f32 {
    hash01(spawn_offset * 0.001 + index as f32 * 1.618)
}

/// Offset at `t` seconds for an element with surface `normal` and `seed`.
pub fn physics_drift(config: &PhysicsDriftConfig, t: f32, normal: Vec3, seed: f32) -> Vec3 {
    let cap = (config.max_duration / 1000.0).max(0.0);
    let t = t.clamp(0.0, cap);
    let normal = safe_normalize(normal, Vec3::Y);
    match config.model {
        PhysicsModel::Gravity => {
            let adherence = (config.adherence / 1000.0).max(0.0);
            if t < adherence {
                return Vec3::ZERO;
            }
            let tt = t - adherence;
            Vec3::new(0.0, -0.5 * config.gravity * tt * tt, 0.0)
        }
        PhysicsModel::Parabolic => {
            let angle = seed * TAU;
            let horizontal = config.speed * config.spread * (0.5 + 0.5 * hash01(seed * 97.0));
            let v0 = Vec3::new(angle.cos() * horizontal, config.speed, angle.sin() * horizontal);
            v0 * t + Vec3::new(0.0, -0.5 * config.gravity * t * t, 0.0)
        }
        PhysicsModel::Rising => {
            let phase = seed * TAU;
            let w = TAU * config.wobble_frequency * t;
            Vec3::new(
                ((w + phase).sin() - phase.sin()) * config.wobble,
                config.speed * t + 0.5 * config.buoyancy * t * t,
                ((w + phase).cos() - phase.cos()) * config.wobble,
            )
        }
        PhysicsModel::Outward => normal * config.speed * t,
        PhysicsModel::Inward => -normal * config.speed * t,
        PhysicsModel::Tangent => tangent_of(normal) * config.speed * t,
        PhysicsModel::Random => {
            let s = seed * 50.0;
            let jitter = |rate: f32, k: f32| (t * rate + s * k).sin() - (s * k).sin();
            Vec3::new(jitter(11.0, 1.0), jitter(13.7, 0.62), jitter(9.3, 0.34)) * config.jitter
        }
    }
}

/// Velocity estimate at `t` seconds (forward difference).
pub fn physics_velocity(config: &PhysicsDriftConfig, t: f32, normal: Vec3, seed: f32) -> Vec3 {
    let a = physics_drift(config, t, normal, seed);
    let b = physics_drift(config, t + VELOCITY_STEP, normal, seed);
    (b - a) / VELOCITY_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_clings_then_falls() {
        let cfg = PhysicsDriftConfig::default().with_adherence(500.0).with_gravity(2.0);
        assert_eq!(physics_drift(&cfg, 0.4, Vec3::X, 0.3), Vec3::ZERO);
        let p = physics_drift(&cfg, 1.5, Vec3::X, 0.3);
        assert!((p.y + 1.0).abs() < 1e-5, "y = {}", p.y);
    }

    #[test]
    fn motion_is_time_capped() {
        let cfg = PhysicsDriftConfig::default()
            .with_model(PhysicsModel::Outward)
            .with_speed(1.0)
            .with_max_duration(2000.0);
        let capped = physics_drift(&cfg, 2.0, Vec3::X, 0.0);
        let later = physics_drift(&cfg, 50.0, Vec3::X, 0.0);
        assert_eq!(capped, later);
        assert!((capped.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn parabolic_is_seed_deterministic() {
        let cfg = PhysicsDriftConfig::default().with_model(PhysicsModel::Parabolic);
        let seed = physics_seed(120.0, 4);
        let a = physics_drift(&cfg, 0.7, Vec3::Y, seed);
        let b = physics_drift(&cfg, 0.7, Vec3::Y, seed);
        assert_eq!(a, b);
        let other = physics_drift(&cfg, 0.7, Vec3::Y, physics_seed(120.0, 5));
        assert_ne!(a, other);
    }

    #[test]
    fn rising_climbs_and_starts_at_origin() {
        let cfg = PhysicsDriftConfig::default()
            .with_model(PhysicsModel::Rising)
            .with_buoyancy(0.2);
        assert!(physics_drift(&cfg, 0.0, Vec3::Y, 0.42).length() < 1e-6);
        assert!(physics_drift(&cfg, 1.0, Vec3::Y, 0.42).y > 0.1);
    }

    #[test]
    fn radial_models_follow_normal() {
        let out = PhysicsDriftConfig::default().with_model(PhysicsModel::Outward);
        let inward = PhysicsDriftConfig::default().with_model(PhysicsModel::Inward);
        let n = Vec3::new(0.0, 0.0, 2.0);
        assert!(physics_drift(&out, 1.0, n, 0.0).z > 0.0);
        assert!(physics_drift(&inward, 1.0, n, 0.0).z < 0.0);
    }

    #[test]
    fn random_jitter_is_bounded() {
        let cfg = PhysicsDriftConfig::default().with_model(PhysicsModel::Random);
        for i in 0..100 {
            let p = physics_drift(&cfg, i as f32 * 0.03, Vec3::Y, 0.7);
            assert!(p.abs().max_element() <= 2.0 * cfg.jitter + 1e-6);
        }
    }

    #[test]
    fn velocity_of_outward_is_speed() {
        let cfg = PhysicsDriftConfig::default()
            .with_model(PhysicsModel::Outward)
            .with_speed(0.5);
        let v = physics_velocity(&cfg, 0.5, Vec3::X, 0.0);
        assert!((v.x - 0.5).abs() < 1e-3);
    }
}
