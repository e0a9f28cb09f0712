//! Raw, partially-specified configuration as it arrives from JSON.
//!
//! Every field is optional and deserialized leniently: a value of the wrong
//! type is logged and treated as absent, so only malformed JSON text can
//! fail. [`AnimationConfig::parse`](super::AnimationConfig::parse) fills the
//! gaps with defaults.

use std::collections::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize into `Some(T)`, or `None` (with a warning) if the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            log::warn!("ignoring config value {}: {}", value, err);
            Ok(None)
        }
    }
}

/// A section that may be given as `true`/`false` or as a full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSection<T> {
    Flag(bool),
    Config(T),
}

impl<T: Default + Clone> RawSection<T> {
    /// `Some(config)` when enabled; `true` enables the section with defaults.
    pub fn enabled(&self) -> Option<T> {
        match self {
            RawSection::Flag(true) => Some(T::default()),
            RawSection::Flag(false) => None,
            RawSection::Config(c) => Some(c.clone()),
        }
    }
}

/// `appearOnBeat` accepts a beat number or `true` (any beat).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBeat {
    Flag(bool),
    Beat(u32),
}

/// Colour as `"#rrggbb"` or `[r, g, b]` in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawColor {
    Hex(String),
    Rgb([f32; 3]),
}

/// A base value with optional variance, or a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSpread {
    Value(f32),
    Spread {
        #[serde(default)]
        base: Option<f32>,
        #[serde(default)]
        variance: Option<f32>,
    },
}

/// Axis as `[x, y, z]` or a name (`"x"`, `"y"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAxis {
    Vector([f32; 3]),
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTiming {
    #[serde(deserialize_with = "lenient")]
    pub appear_at: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub disappear_at: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub delay_ms: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub lifetime_ms: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub stagger: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub stagger_ms: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub appear_on_beat: Option<RawBeat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransition {
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub easing: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scale_range: Option<[f32; 2]>,
    #[serde(deserialize_with = "lenient")]
    pub overshoot: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPulse {
    #[serde(deserialize_with = "lenient")]
    pub amplitude: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub frequency: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub phase: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFlicker {
    #[serde(deserialize_with = "lenient")]
    pub intensity: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub rate: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub pattern: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub smoothing: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDrift {
    #[serde(deserialize_with = "lenient")]
    pub direction: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub distance: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub noise: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub bounce: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRotate {
    #[serde(deserialize_with = "lenient")]
    pub axis: Option<RawAxis>,
    #[serde(deserialize_with = "lenient")]
    pub speed: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub oscillate: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub range: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEmissive {
    #[serde(deserialize_with = "lenient")]
    pub min: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub max: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub frequency: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPhysics {
    #[serde(deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub speed: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub gravity: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub adherence: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub max_duration: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub buoyancy: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub wobble: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub wobble_frequency: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub spread: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub jitter: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawScale {
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub amplitude: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub frequency: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub axes: Option<[f32; 3]>,
    #[serde(deserialize_with = "lenient")]
    pub wobble: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub velocity_link: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub stretch_factor: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub max_stretch: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOpacityLink {
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scale_range: Option<[f32; 2]>,
    #[serde(deserialize_with = "lenient")]
    pub min_opacity: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub rate: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawHold {
    #[serde(deserialize_with = "lenient")]
    pub pulse: Option<RawSection<RawPulse>>,
    #[serde(deserialize_with = "lenient")]
    pub flicker: Option<RawSection<RawFlicker>>,
    #[serde(deserialize_with = "lenient")]
    pub drift: Option<RawSection<RawDrift>>,
    #[serde(deserialize_with = "lenient")]
    pub rotate: Option<RawSection<RawRotate>>,
    #[serde(deserialize_with = "lenient")]
    pub emissive: Option<RawSection<RawEmissive>>,
    #[serde(deserialize_with = "lenient")]
    pub physics: Option<RawSection<RawPhysics>>,
    #[serde(deserialize_with = "lenient")]
    pub scale: Option<RawSection<RawScale>>,
    #[serde(deserialize_with = "lenient")]
    pub opacity_link: Option<RawSection<RawOpacityLink>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVariance {
    #[serde(deserialize_with = "lenient")]
    pub scale: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub lifetime: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub color: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub delay: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAppearance {
    #[serde(deserialize_with = "lenient")]
    pub color: Option<RawColor>,
    #[serde(deserialize_with = "lenient")]
    pub opacity: Option<RawSpread>,
    #[serde(deserialize_with = "lenient")]
    pub scale: Option<RawSpread>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTrail {
    #[serde(deserialize_with = "lenient")]
    pub length: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub fade: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRendering {
    #[serde(deserialize_with = "lenient")]
    pub render_order: Option<i32>,
    #[serde(deserialize_with = "lenient")]
    pub depth_test: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub depth_write: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub blending: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub trail: Option<RawSection<RawTrail>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLifecycle {
    #[serde(deserialize_with = "lenient")]
    pub respawn: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub respawn_delay: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub max_respawns: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawIntensityScaling {
    #[serde(deserialize_with = "lenient")]
    pub scale: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub count: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub lifetime: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub enter_duration: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub exit_duration: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub pulse_amplitude: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub flicker_intensity: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub emissive_max: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub drift_speed: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub rotate_speed: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProcedural {
    #[serde(deserialize_with = "lenient")]
    pub geometry_stability: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub scale_smoothing: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCurve {
    #[serde(deserialize_with = "lenient")]
    pub from: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub to: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub easing: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub start: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub end: Option<f32>,
}

/// `{ start: [min, max], end: [min, max] }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRangeRamp {
    pub start: [f32; 2],
    pub end: [f32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProgression {
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub lifetime: Option<RawRangeRamp>,
    #[serde(deserialize_with = "lenient")]
    pub flash_in: Option<RawRangeRamp>,
    #[serde(deserialize_with = "lenient")]
    pub fade_out: Option<RawRangeRamp>,
    #[serde(deserialize_with = "lenient")]
    pub respawn_delay: Option<RawRangeRamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEphemeral {
    #[serde(deserialize_with = "lenient")]
    pub lifetime: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub flash_in: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub fade_out: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub respawn: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub respawn_delay: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub initial_delay: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub stagger: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub base_opacity: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub base_emissive: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub flash_emissive: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub hold_flicker: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub progression: Option<RawProgression>,
}

/// Top-level raw configuration. Timing keys sit at the top level
/// (`appearAt`, `delayMs`, …); everything else is grouped by section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnimationConfig {
    #[serde(flatten)]
    pub timing: RawTiming,
    #[serde(deserialize_with = "lenient")]
    pub enter: Option<RawTransition>,
    #[serde(deserialize_with = "lenient")]
    pub exit: Option<RawTransition>,
    #[serde(deserialize_with = "lenient")]
    pub hold: Option<RawHold>,
    #[serde(deserialize_with = "lenient")]
    pub variance: Option<RawVariance>,
    #[serde(deserialize_with = "lenient")]
    pub appearance: Option<RawAppearance>,
    #[serde(deserialize_with = "lenient")]
    pub rendering: Option<RawRendering>,
    #[serde(deserialize_with = "lenient")]
    pub lifecycle: Option<RawLifecycle>,
    #[serde(deserialize_with = "lenient")]
    pub intensity_scaling: Option<RawIntensityScaling>,
    #[serde(deserialize_with = "lenient")]
    pub procedural: Option<RawProcedural>,
    #[serde(deserialize_with = "lenient")]
    pub parameter_animation: Option<HashMap<String, RawCurve>>,
    /// Present when elements use the flash/hold/fade lifecycle instead.
    #[serde(deserialize_with = "lenient")]
    pub ephemeral: Option<RawEphemeral>,
}

impl RawAnimationConfig {
    /// Parse a raw configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
