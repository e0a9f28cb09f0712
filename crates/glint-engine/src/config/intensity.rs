//! Intensity scaling: how strongly each property responds to the global
//! intensity scalar.

use super::raw::RawIntensityScaling;

/// Properties that respond to intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaledProperty {
    Scale,
    Count,
    Lifetime,
    EnterDuration,
    ExitDuration,
    PulseAmplitude,
    FlickerIntensity,
    EmissiveMax,
    DriftSpeed,
    RotateSpeed,
}

/// Multiplier reached at intensity 1 for each property (identity at 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityScaling {
    pub scale: f32,
    pub count: f32,
    pub lifetime: f32,
    pub enter_duration: f32,
    pub exit_duration: f32,
    pub pulse_amplitude: f32,
    pub flicker_intensity: f32,
    pub emissive_max: f32,
    pub drift_speed: f32,
    pub rotate_speed: f32,
}

impl Default for IntensityScaling {
    fn default() -> Self {
        Self {
            scale: 1.0,
            count: 1.0,
            lifetime: 1.0,
            enter_duration: 1.0,
            exit_duration: 1.0,
            pulse_amplitude: 1.0,
            flicker_intensity: 1.0,
            emissive_max: 1.0,
            drift_speed: 1.0,
            rotate_speed: 1.0,
        }
    }
}

impl IntensityScaling {
    pub(crate) fn from_raw(raw: Option<&RawIntensityScaling>) -> Self {
        let d = Self::default();
        let Some(raw) = raw else { return d };
        Self {
            scale: raw.scale.unwrap_or(d.scale),
            count: raw.count.unwrap_or(d.count),
            lifetime: raw.lifetime.unwrap_or(d.lifetime),
            enter_duration: raw.enter_duration.unwrap_or(d.enter_duration),
            exit_duration: raw.exit_duration.unwrap_or(d.exit_duration),
            pulse_amplitude: raw.pulse_amplitude.unwrap_or(d.pulse_amplitude),
            flicker_intensity: raw.flicker_intensity.unwrap_or(d.flicker_intensity),
            emissive_max: raw.emissive_max.unwrap_or(d.emissive_max),
            drift_speed: raw.drift_speed.unwrap_or(d.drift_speed),
            rotate_speed: raw.rotate_speed.unwrap_or(d.rotate_speed),
        }
    }

    pub fn with_factor(mut self, property: ScaledProperty, factor: f32) -> Self {
        *self.factor_mut(property) = factor;
        self
    }

    pub fn factor(&self, property: ScaledProperty) -> f32 {
        match property {
            ScaledProperty::Scale => self.scale,
            ScaledProperty::Count => self.count,
            ScaledProperty::Lifetime => self.lifetime,
            ScaledProperty::EnterDuration => self.enter_duration,
            ScaledProperty::ExitDuration => self.exit_duration,
            ScaledProperty::PulseAmplitude => self.pulse_amplitude,
            ScaledProperty::FlickerIntensity => self.flicker_intensity,
            ScaledProperty::EmissiveMax => self.emissive_max,
            ScaledProperty::DriftSpeed => self.drift_speed,
            ScaledProperty::RotateSpeed => self.rotate_speed,
        }
    }

    fn factor_mut(&mut self, property: ScaledProperty) -> &mut f32 {
        match property {
            ScaledProperty::Scale => &mut self.scale,
            ScaledProperty::Count => &mut self.count,
            ScaledProperty::Lifetime => &mut self.lifetime,
            ScaledProperty::EnterDuration => &mut self.enter_duration,
            ScaledProperty::ExitDuration => &mut self.exit_duration,
            ScaledProperty::PulseAmplitude => &mut self.pulse_amplitude,
            ScaledProperty::FlickerIntensity => &mut self.flicker_intensity,
            ScaledProperty::EmissiveMax => &mut self.emissive_max,
            ScaledProperty::DriftSpeed => &mut self.drift_speed,
            ScaledProperty::RotateSpeed => &mut self.rotate_speed,
        }
    }

    /// `base * (1 + (factor - 1) * intensity)`, intensity clamped to [0, 1].
    pub fn apply(&self, property: ScaledProperty, base: f32, intensity: f32) -> f32 {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        base * (1.0 + (self.factor(property) - 1.0) * intensity)
    }
}
