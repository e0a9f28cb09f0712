//! Emissive glow waveform.

use crate::core::math::fract;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissiveWave {
    #[default]
    Sine,
    Sawtooth,
    Triangle,
    /// Sharp attack with exponential decay, once per cycle.
    Pulse,
}

impl EmissiveWave {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sine" => Some(Self::Sine),
            "sawtooth" | "saw" => Some(Self::Sawtooth),
            "triangle" => Some(Self::Triangle),
            "pulse" => Some(Self::Pulse),
            _ => None,
        }
    }

    /// Waveform value in [0, 1] at `cycles` (1.0 = one full period).
    pub fn sample(self, cycles: f32) -> f32 {
        let f = fract(cycles);
        match self {
            EmissiveWave::Sine => 0.5 + 0.5 * (cycles * std::f32::consts::TAU).sin(),
            EmissiveWave::Sawtooth => f,
            EmissiveWave::Triangle => 1.0 - (2.0 * f - 1.0).abs(),
            EmissiveWave::Pulse => (-6.0 * f).exp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissiveConfig {
    pub min: f32,
    pub max: f32,
    /// Cycles per second.
    pub frequency: f32,
    pub pattern: EmissiveWave,
}

impl Default for EmissiveConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 1.5,
            frequency: 1.0,
            pattern: EmissiveWave::Sine,
        }
    }
}

impl EmissiveConfig {
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_pattern(mut self, pattern: EmissiveWave) -> Self {
        self.pattern = pattern;
        self
    }
}

/// Emissive intensity at `t` seconds, mapped into `[min, max]`.
#[inline]
pub fn emissive(config: &EmissiveConfig, t: f32) -> f32 {
    let w = config.pattern.sample(config.frequency * t);
    (config.min + (config.max - config.min) * w).max(0.0)
}
