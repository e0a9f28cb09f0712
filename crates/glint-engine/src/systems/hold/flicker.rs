//! Opacity flicker modifier.
//!
//! Every pattern yields a multiplier in `[1 - intensity, 1]`. The closed-form
//! patterns start at 1.0; `Random` needs a [`FlickerMemory`] to smooth
//! toward freshly drawn targets.

use std::f32::consts::TAU;
use crate::core::random::RandomSource;

/// Flicker waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlickerPattern {
    #[default]
    Sine,
    Square,
    /// Three summed sine octaves.
    Noise,
    /// Smoothed random targets.
    Random,
}

impl FlickerPattern {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sine" => Some(Self::Sine),
            "square" => Some(Self::Square),
            "noise" => Some(Self::Noise),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickerConfig {
    /// Depth of the dip, 0 = none, 1 = fully transparent at the trough.
    pub intensity: f32,
    /// Cycles (or random retargets) per second.
    pub rate: f32,
    pub pattern: FlickerPattern,
    /// Random pattern only: higher values glide more slowly toward each target.
    pub smoothing: f32,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            intensity: 0.3,
            rate: 8.0,
            pattern: FlickerPattern::Sine,
            smoothing: 0.3,
        }
    }
}

impl FlickerConfig {
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_pattern(mut self, pattern: FlickerPattern) -> Self {
        self.pattern = pattern;
        self
    }
}

/// Per-element state for the `Random` pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlickerMemory {
    current: f32,
    target: f32,
    timer: f32,
}

impl FlickerMemory {
    /// Current dip level in [0, 1].
    pub fn level(&self) -> f32 {
        self.current
    }
}

/// Opacity multiplier at `t` seconds, advancing random memory by `dt` seconds.
pub fn flicker(
    config: &FlickerConfig,
    t: f32,
    dt: f32,
    memory: &mut FlickerMemory,
    rng: &mut dyn RandomSource,
) -> f32 {
    if config.rate <= 0.0 || config.intensity == 0.0 {
        return 1.0;
    }
    let phase = TAU * config.rate * t;
    let level = match config.pattern {
        FlickerPattern::Sine => 0.5 - 0.5 * phase.cos(),
        FlickerPattern::Square => {
            if phase.sin() >= 0.0 {
                0.0
            } else {
                1.0
            }
        }
        FlickerPattern::Noise => {
            let sum = phase.sin()
                + 0.5 * (2.17 * phase + 1.3).sin()
                + 0.25 * (4.73 * phase + 2.9).sin();
            (sum / 1.75 + 1.0) * 0.5
        }
        FlickerPattern::Random => {
            let interval = 1.0 / config.rate;
            memory.timer += dt.max(0.0);
            while memory.timer >= interval {
                memory.timer -= interval;
                memory.target = rng.next_f32();
            }
            let alpha = 1.0 - (-dt.max(0.0) * config.rate / config.smoothing.max(0.01)).exp();
            memory.current += (memory.target - memory.current) * alpha;
            memory.current
        }
    };
    1.0 - config.intensity * level.clamp(0.0, 1.0)
}
