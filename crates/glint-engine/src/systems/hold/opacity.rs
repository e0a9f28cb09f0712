//! Opacity linked to scale, time or a seeded flicker.

use std::f32::consts::TAU;
use glam::Vec3;
use crate::core::math::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpacityLinkMode {
    /// Fade as the average scale grows through `scale_range`.
    #[default]
    InverseScale,
    /// Product of two seeded sine terms.
    Flicker,
    /// Linear fade over `duration`.
    Dissipate,
}

impl OpacityLinkMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "inverse-scale" | "inverse" => Some(Self::InverseScale),
            "flicker" => Some(Self::Flicker),
            "dissipate" => Some(Self::Dissipate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityLinkConfig {
    pub mode: OpacityLinkMode,
    /// Average scale at which fading starts and completes.
    pub scale_range: (f32, f32),
    /// Opacity multiplier floor.
    pub min_opacity: f32,
    /// Flicker cycles per second.
    pub rate: f32,
    /// Dissipation time in milliseconds.
    pub duration: f32,
}

impl Default for OpacityLinkConfig {
    fn default() -> Self {
        Self {
            mode: OpacityLinkMode::InverseScale,
            scale_range: (1.0, 2.0),
            min_opacity: 0.0,
            rate: 6.0,
            duration: 1000.0,
        }
    }
}

impl OpacityLinkConfig {
    pub fn with_mode(mut self, mode: OpacityLinkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_scale_range(mut self, from: f32, to: f32) -> Self {
        self.scale_range = (from, to);
        self
    }

    pub fn with_min_opacity(mut self, min_opacity: f32) -> Self {
        self.min_opacity = min_opacity;
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }
}

/// Opacity multiplier in `[min_opacity, 1]`.
pub fn opacity_link(config: &OpacityLinkConfig, scale: Vec3, t: f32, seed: f32) -> f32 {
    let floor = config.min_opacity.clamp(0.0, 1.0);
    let fade = match config.mode {
        OpacityLinkMode::InverseScale => {
            let avg = (scale.x + scale.y + scale.z) / 3.0;
            let (from, to) = config.scale_range;
            let span = to - from;
            if span.abs() <= EPSILON {
                if avg >= to { 1.0 } else { 0.0 }
            } else {
                ((avg - from) / span).clamp(0.0, 1.0)
            }
        }
        OpacityLinkMode::Flicker => {
            let a = 0.5 + 0.5 * (TAU * config.rate * t + seed * 10.0).sin();
            let b = 0.5 + 0.5 * (TAU * config.rate * 1.7 * t + seed * 20.0).sin();
            1.0 - a * b
        }
        OpacityLinkMode::Dissipate => {
            if config.duration <= 0.0 {
                1.0
            } else {
                (t * 1000.0 / config.duration).clamp(0.0, 1.0)
            }
        }
    };
    1.0 - fade * (1.0 - floor)
}
