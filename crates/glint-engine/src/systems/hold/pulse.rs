//! Breathing scale modifier.

use std::f32::consts::TAU;

/// Sinusoidal scale pulse applied during the hold phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseConfig {
    /// Peak deviation from 1.0.
    pub amplitude: f32,
    /// Cycles per second.
    pub frequency: f32,
    /// Phase offset in seconds.
    pub phase: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.1,
            frequency: 1.0,
            phase: 0.0,
        }
    }
}

impl PulseConfig {
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }
}

/// Scale multiplier at `t` seconds into the hold phase.
#[inline]
pub fn pulse(config: &PulseConfig, t: f32) -> f32 {
    1.0 + (TAU * config.frequency * (t + config.phase)).sin() * config.amplitude
}
