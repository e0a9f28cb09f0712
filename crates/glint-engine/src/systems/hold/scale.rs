//! Non-uniform scale modifier.
//!
//! Returns per-axis multipliers. `VelocityStretch` also reports the axis the
//! host should align the element's local Y with.

use std::f32::consts::{FRAC_PI_2, TAU};
use glam::Vec3;
use crate::core::math::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Same breathing on every axis.
    #[default]
    UniformPulse,
    /// Axes expand and contract against each other, with wobble.
    NonUniform,
    /// Elongate along velocity, squash across it.
    VelocityStretch,
}

impl ScaleMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "uniform-pulse" | "uniform" => Some(Self::UniformPulse),
            "non-uniform" | "nonuniform" => Some(Self::NonUniform),
            "velocity-stretch" | "stretch" => Some(Self::VelocityStretch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonUniformScaleConfig {
    pub mode: ScaleMode,
    pub amplitude: f32,
    /// Cycles per second.
    pub frequency: f32,
    /// Per-axis weight of the expand/contract motion.
    pub axes: Vec3,
    /// Secondary wobble amplitude.
    pub wobble: f32,
    /// Extra Y stretch per unit of speed (`NonUniform`).
    pub velocity_link: f32,
    /// Stretch per unit of speed (`VelocityStretch`).
    pub stretch_factor: f32,
    pub max_stretch: f32,
}

impl Default for NonUniformScaleConfig {
    fn default() -> Self {
        Self {
            mode: ScaleMode::UniformPulse,
            amplitude: 0.1,
            frequency: 1.0,
            axes: Vec3::ONE,
            wobble: 0.0,
            velocity_link: 0.0,
            stretch_factor: 1.0,
            max_stretch: 2.0,
        }
    }
}

impl NonUniformScaleConfig {
    pub fn with_mode(mut self, mode: ScaleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_wobble(mut self, wobble: f32) -> Self {
        self.wobble = wobble;
        self
    }

    pub fn with_stretch(mut self, factor: f32, max: f32) -> Self {
        self.stretch_factor = factor;
        self.max_stretch = max;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOutput {
    pub scale: Vec3,
    /// Unit velocity direction to orient the stretched axis along.
    pub align_axis: Option<Vec3>,
}

/// Per-axis scale at `t` seconds given the element's current `velocity`.
pub fn non_uniform_scale(config: &NonUniformScaleConfig, t: f32, velocity: Vec3) -> ScaleOutput {
    let phase = TAU * config.frequency * t;
    let output = match config.mode {
        ScaleMode::UniformPulse => ScaleOutput {
            scale: Vec3::splat(1.0 + phase.sin() * config.amplitude),
            align_axis: None,
        },
        ScaleMode::NonUniform => {
            let s = phase.sin() * config.amplitude;
            let mut scale = Vec3::new(
                1.0 + s * config.axes.x,
                1.0 - s * config.axes.y,
                1.0 + (phase + FRAC_PI_2).sin() * config.amplitude * config.axes.z
                    - config.amplitude * config.axes.z,
            );
            if config.wobble != 0.0 {
                let w = phase * 2.7;
                scale += Vec3::new(w.sin(), (w + 2.1).sin() - 2.1f32.sin(), (w + 4.2).sin() - 4.2f32.sin())
                    * config.wobble;
            }
            if config.velocity_link != 0.0 {
                scale.y *= 1.0 + velocity.length() * config.velocity_link;
            }
            ScaleOutput {
                scale,
                align_axis: None,
            }
        }
        ScaleMode::VelocityStretch => {
            let speed = velocity.length();
            if speed <= EPSILON {
                ScaleOutput {
                    scale: Vec3::ONE,
                    align_axis: None,
                }
            } else {
                let stretch = (1.0 + speed * config.stretch_factor).min(config.max_stretch.max(1.0));
                // Squash both perpendicular axes so stretch * squash^2 == 1.
                let squash = 1.0 / stretch.sqrt();
                ScaleOutput {
                    scale: Vec3::new(squash, stretch, squash),
                    align_axis: Some(velocity / speed),
                }
            }
        }
    };
    ScaleOutput {
        scale: output.scale.max(Vec3::ZERO),
        ..output
    }
}
