//! Animation configuration: lenient raw input, parsed into a fully
//! defaulted, immutable [`AnimationConfig`] shared by a spawn batch.

pub mod raw;
mod element;
mod intensity;
mod sections;

use std::collections::HashMap;

use glam::Vec3;

use crate::core::random::RandomSource;
use crate::core::timing::{TimePoint, TimingMode};
use crate::lifecycle::ephemeral::EphemeralConfig;
use crate::lifecycle::events::{ElementHooks, HookError, LifecycleEvent, StateSnapshot};
use raw::{RawAnimationConfig, RawBeat, RawTiming};

pub use element::{ElementConfig, ElementWindow};
pub use intensity::{IntensityScaling, ScaledProperty};
pub use sections::{
    parse_color, Appearance, BlendMode, EnterConfig, EnterType, ExitConfig, ExitType,
    HoldConfig, ParameterCurve, ProceduralConfig, RenderingConfig, RespawnPolicy, Spread,
    TrailConfig, Transition, VarianceConfig,
};

/// Gesture length assumed when the caller passes an unusable one.
pub const FALLBACK_GESTURE_DURATION: f32 = 1000.0;

/// When elements appear and disappear, in the unit the configuration chose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub appear: TimePoint,
    pub disappear: TimePoint,
    /// Per-index stagger step.
    pub stagger: TimePoint,
    /// Beat number that releases the element, if beat-gated.
    pub appear_on_beat: Option<u32>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            appear: TimePoint::Progress(0.0),
            disappear: TimePoint::Progress(1.0),
            stagger: TimePoint::Progress(0.0),
            appear_on_beat: None,
        }
    }
}

impl Timing {
    /// Progress mode if `appearAt`/`disappearAt` is given, else milliseconds
    /// if `delayMs`/`lifetimeMs` is, else progress.
    pub fn mode_of(raw: &RawTiming) -> TimingMode {
        if raw.appear_at.is_some() || raw.disappear_at.is_some() {
            TimingMode::Progress
        } else if raw.delay_ms.is_some() || raw.lifetime_ms.is_some() {
            TimingMode::Milliseconds
        } else {
            TimingMode::Progress
        }
    }

    fn from_raw(raw: &RawTiming, gesture_duration: f32) -> Self {
        let delay = raw.delay_ms.unwrap_or(0.0);
        let appear_on_beat = match raw.appear_on_beat {
            Some(RawBeat::Beat(n)) => Some(n),
            Some(RawBeat::Flag(true)) => Some(0),
            Some(RawBeat::Flag(false)) | None => None,
        };
        match Self::mode_of(raw) {
            TimingMode::Progress => {
                let stagger = match (raw.stagger, raw.stagger_ms) {
                    (Some(p), _) => TimePoint::Progress(p),
                    (None, Some(ms)) => {
                        TimePoint::Progress(TimePoint::Millis(ms).to_progress(gesture_duration))
                    }
                    (None, None) => TimePoint::Progress(0.0),
                };
                Self {
                    appear: TimePoint::Progress(raw.appear_at.unwrap_or(0.0))
                        .offset_millis(delay, gesture_duration),
                    disappear: TimePoint::Progress(raw.disappear_at.unwrap_or(1.0)),
                    stagger,
                    appear_on_beat,
                }
            }
            TimingMode::Milliseconds => {
                let lifetime = raw
                    .lifetime_ms
                    .unwrap_or((gesture_duration - delay).max(0.0));
                let stagger = match (raw.stagger_ms, raw.stagger) {
                    (Some(ms), _) => TimePoint::Millis(ms),
                    (None, Some(p)) => TimePoint::Millis(TimePoint::Progress(p).to_millis(gesture_duration)),
                    (None, None) => TimePoint::Millis(0.0),
                };
                Self {
                    appear: TimePoint::Millis(delay),
                    disappear: TimePoint::Millis(delay + lifetime),
                    stagger,
                    appear_on_beat,
                }
            }
        }
    }

    pub fn mode(&self) -> TimingMode {
        self.appear.mode()
    }
}

/// Fully resolved configuration for one spawn batch.
///
/// Built once by [`AnimationConfig::parse`] and shared between elements
/// (usually behind an `Arc`). Intensity is not stored here; it arrives with
/// every tick.
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    /// Milliseconds; always positive and finite.
    pub gesture_duration: f32,
    pub timing: Timing,
    pub enter: EnterConfig,
    pub exit: ExitConfig,
    pub hold: HoldConfig,
    pub variance: VarianceConfig,
    pub appearance: Appearance,
    pub rendering: RenderingConfig,
    pub lifecycle: RespawnPolicy,
    pub hooks: ElementHooks,
    pub intensity_scaling: IntensityScaling,
    pub procedural: Option<ProceduralConfig>,
    pub parameter_animation: HashMap<String, ParameterCurve>,
    /// When set, elements run the flash/hold/fade lifecycle instead.
    pub ephemeral: Option<EphemeralConfig>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::parse(&RawAnimationConfig::default(), FALLBACK_GESTURE_DURATION)
    }
}

impl AnimationConfig {
    /// Fill every absent field with its default. Never fails.
    pub fn parse(raw: &RawAnimationConfig, gesture_duration: f32) -> Self {
        let gesture_duration = if gesture_duration.is_finite() && gesture_duration > 0.0 {
            gesture_duration
        } else {
            log::warn!(
                "invalid gesture duration {}, using {}ms",
                gesture_duration,
                FALLBACK_GESTURE_DURATION
            );
            FALLBACK_GESTURE_DURATION
        };
        let variance = VarianceConfig::from_raw(raw.variance.as_ref());
        let parameter_animation = raw
            .parameter_animation
            .as_ref()
            .map(|curves| {
                curves
                    .iter()
                    .map(|(name, curve)| (name.clone(), ParameterCurve::from_raw(curve)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            gesture_duration,
            timing: Timing::from_raw(&raw.timing, gesture_duration),
            enter: EnterConfig::from_raw(raw.enter.as_ref(), EnterType::from_name),
            exit: ExitConfig::from_raw(raw.exit.as_ref(), ExitType::from_name),
            hold: HoldConfig::from_raw(raw.hold.as_ref()),
            appearance: Appearance::from_raw(raw.appearance.as_ref(), &variance),
            variance,
            rendering: RenderingConfig::from_raw(raw.rendering.as_ref()),
            lifecycle: RespawnPolicy::from_raw(raw.lifecycle.as_ref()),
            hooks: ElementHooks::new(),
            intensity_scaling: IntensityScaling::from_raw(raw.intensity_scaling.as_ref()),
            procedural: raw.procedural.as_ref().map(ProceduralConfig::from_raw),
            parameter_animation,
            ephemeral: raw.ephemeral.as_ref().map(EphemeralConfig::from_raw),
        }
    }

    /// Parse JSON text. Only malformed JSON is an error; bad values are defaulted.
    pub fn from_json(json: &str, gesture_duration: f32) -> Result<Self, serde_json::Error> {
        let raw = RawAnimationConfig::from_json(json)?;
        Ok(Self::parse(&raw, gesture_duration))
    }

    pub fn timing_mode(&self) -> TimingMode {
        self.timing.mode()
    }

    /// Appear time in the active unit, delay included.
    pub fn get_appear_time(&self) -> TimePoint {
        self.timing.appear
    }

    pub fn get_disappear_time(&self) -> TimePoint {
        self.timing.disappear
    }

    pub fn appear_ms(&self) -> f32 {
        self.timing.appear.to_millis(self.gesture_duration)
    }

    pub fn disappear_ms(&self) -> f32 {
        self.timing.disappear.to_millis(self.gesture_duration)
    }

    /// `index * stagger`, in the active unit.
    pub fn get_stagger_offset(&self, index: usize) -> TimePoint {
        self.timing.stagger.scaled(index as f32)
    }

    /// `base + uniform(-1, 1) * base * variance`.
    pub fn apply_variance(base: f32, variance: f32, rng: &mut dyn RandomSource) -> f32 {
        if variance == 0.0 {
            return base;
        }
        base + rng.signed() * base * variance
    }

    /// Bake the randomized per-element targets for `index`.
    pub fn create_element_config(&self, index: usize, rng: &mut dyn RandomSource) -> ElementConfig {
        let scale = Self::apply_variance(self.appearance.scale.base, self.appearance.scale.variance, rng);
        let opacity =
            Self::apply_variance(self.appearance.opacity.base, self.appearance.opacity.variance, rng);
        let lifetime_multiplier = Self::apply_variance(1.0, self.variance.lifetime, rng);
        let delay_offset = rng.next_f32() * self.variance.delay;
        let color = self.appearance.color.map(|base| {
            if self.variance.color > 0.0 {
                let jitter = Vec3::new(rng.signed(), rng.signed(), rng.signed()) * self.variance.color;
                (base + jitter).clamp(Vec3::ZERO, Vec3::ONE)
            } else {
                base
            }
        });
        ElementConfig {
            index,
            appear_offset: self.get_stagger_offset(index).to_millis(self.gesture_duration),
            scale: scale.max(0.0),
            opacity: opacity.max(0.0),
            lifetime_multiplier: lifetime_multiplier.max(0.0),
            delay_offset,
            color,
            seed: rng.next_f32(),
        }
    }

    /// `base * (1 + (factor - 1) * intensity)`.
    pub fn get_scaled_value(&self, property: ScaledProperty, base: f32, intensity: f32) -> f32 {
        self.intensity_scaling.apply(property, base, intensity)
    }

    /// Element count for a batch at `intensity`.
    pub fn scaled_count(&self, base: usize, intensity: f32) -> usize {
        let scaled = self.get_scaled_value(ScaledProperty::Count, base as f32, intensity);
        scaled.round().max(0.0) as usize
    }

    /// The element's appear/disappear thresholds in ms on its local clock.
    ///
    /// The window length is stretched by the element's lifetime multiplier
    /// and the intensity-scaled lifetime factor; it is not clamped, so a
    /// disappear time before the appear time survives.
    pub fn element_window(&self, element: &ElementConfig, intensity: f32) -> ElementWindow {
        let appear = self.appear_ms() + element.start_delay();
        let base_span = self.disappear_ms() - self.appear_ms();
        let span = self.get_scaled_value(
            ScaledProperty::Lifetime,
            base_span * element.lifetime_multiplier,
            intensity,
        );
        ElementWindow {
            appear,
            disappear: appear + span,
        }
    }

    pub fn with_hook<F>(mut self, event: LifecycleEvent, hook: F) -> Self
    where
        F: Fn(&StateSnapshot) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.set(event, hook);
        self
    }

    pub fn with_enter(mut self, enter: EnterConfig) -> Self {
        self.enter = enter;
        self
    }

    pub fn with_exit(mut self, exit: ExitConfig) -> Self {
        self.exit = exit;
        self
    }

    pub fn with_hold(mut self, hold: HoldConfig) -> Self {
        self.hold = hold;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: RespawnPolicy) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_ephemeral(mut self, ephemeral: EphemeralConfig) -> Self {
        self.ephemeral = Some(ephemeral);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::{ConstantRandom, Rng};
    use crate::extensions::easing::Easing;

    fn parse(json: &str) -> AnimationConfig {
        AnimationConfig::from_json(json, 1000.0).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("{}");
        assert_eq!(cfg.timing_mode(), TimingMode::Progress);
        assert_eq!(cfg.get_appear_time(), TimePoint::Progress(0.0));
        assert_eq!(cfg.get_disappear_time(), TimePoint::Progress(1.0));
        assert_eq!(cfg.enter.kind, EnterType::Fade);
        assert_eq!(cfg.enter.easing, Easing::QuadOut);
        assert_eq!(cfg.exit.easing, Easing::QuadIn);
        assert!(cfg.hold.is_empty());
        assert_eq!(cfg.rendering, RenderingConfig::default());
        assert_eq!(cfg.lifecycle.max_respawns, -1);
        assert!(cfg.ephemeral.is_none());
    }

    #[test]
    fn progress_keys_select_progress_mode() {
        let cfg = parse(r#"{ "appearAt": 0.2, "delayMs": 100, "lifetimeMs": 50 }"#);
        assert_eq!(cfg.timing_mode(), TimingMode::Progress);
        assert!((cfg.appear_ms() - 300.0).abs() < 1e-3);
        assert_eq!(cfg.disappear_ms(), 1000.0);
    }

    #[test]
    fn millisecond_keys_select_ms_mode() {
        let cfg = parse(r#"{ "delayMs": 100, "lifetimeMs": 400, "stagger": 0.05 }"#);
        assert_eq!(cfg.timing_mode(), TimingMode::Milliseconds);
        assert_eq!(cfg.get_appear_time(), TimePoint::Millis(100.0));
        assert_eq!(cfg.get_disappear_time(), TimePoint::Millis(500.0));
        assert_eq!(cfg.get_stagger_offset(2), TimePoint::Millis(100.0));
    }

    #[test]
    fn lifetime_defaults_to_rest_of_gesture() {
        let cfg = parse(r#"{ "delayMs": 300 }"#);
        assert_eq!(cfg.disappear_ms(), 1000.0);
    }

    #[test]
    fn stagger_is_in_active_unit() {
        let cfg = parse(r#"{ "appearAt": 0.1, "staggerMs": 50 }"#);
        assert_eq!(cfg.get_stagger_offset(3).mode(), TimingMode::Progress);
        assert!((cfg.get_stagger_offset(3).to_millis(1000.0) - 150.0).abs() < 1e-3);
    }

    #[test]
    fn scaled_value_is_linear_in_intensity() {
        let cfg = parse(r#"{ "intensityScaling": { "scale": 2.0, "count": 1.5 } }"#);
        assert_eq!(cfg.get_scaled_value(ScaledProperty::Scale, 1.0, 0.0), 1.0);
        assert_eq!(cfg.get_scaled_value(ScaledProperty::Scale, 1.0, 1.0), 2.0);
        assert!((cfg.get_scaled_value(ScaledProperty::Scale, 1.0, 0.5) - 1.5).abs() < 1e-6);
        assert_eq!(cfg.scaled_count(10, 1.0), 15);
    }

    #[test]
    fn variance_stays_within_band() {
        let mut rng = Rng::new(99);
        for _ in 0..200 {
            let v = AnimationConfig::apply_variance(2.0, 0.25, &mut rng);
            assert!((1.5..=2.5).contains(&v));
        }
        assert_eq!(AnimationConfig::apply_variance(2.0, 0.0, &mut rng), 2.0);
    }

    #[test]
    fn element_config_bakes_targets() {
        let cfg = parse(
            r#"{ "appearAt": 0.1, "stagger": 0.1, "appearance": { "opacity": 0.8, "scale": 2 },
                 "variance": { "delay": 100 } }"#,
        );
        let el = cfg.create_element_config(2, &mut ConstantRandom(0.5));
        assert_eq!(el.index, 2);
        assert!((el.appear_offset - 200.0).abs() < 1e-3);
        assert_eq!(el.scale, 2.0);
        assert_eq!(el.opacity, 0.8);
        assert_eq!(el.lifetime_multiplier, 1.0);
        assert!((el.delay_offset - 50.0).abs() < 1e-3);
    }

    #[test]
    fn element_targets_never_negative() {
        let cfg = parse(r#"{ "appearance": { "scale": { "base": 1, "variance": 3 } } }"#);
        let mut rng = Rng::new(4);
        for i in 0..100 {
            assert!(cfg.create_element_config(i, &mut rng).scale >= 0.0);
        }
    }

    #[test]
    fn window_scales_with_lifetime() {
        let cfg = parse(r#"{ "delayMs": 0, "lifetimeMs": 400, "intensityScaling": { "lifetime": 0.5 } }"#);
        let el = ElementConfig::uniform(0);
        let calm = cfg.element_window(&el, 0.0);
        assert_eq!(calm, ElementWindow { appear: 0.0, disappear: 400.0 });
        let intense = cfg.element_window(&el, 1.0);
        assert_eq!(intense.disappear, 200.0);
    }

    #[test]
    fn inverted_window_is_preserved() {
        let cfg = parse(r#"{ "appearAt": 0.6, "disappearAt": 0.4 }"#);
        let w = cfg.element_window(&ElementConfig::uniform(0), 0.0);
        assert!(w.span() < 0.0);
    }

    #[test]
    fn bad_gesture_duration_falls_back() {
        let cfg = AnimationConfig::from_json("{}", f32::NAN).unwrap();
        assert_eq!(cfg.gesture_duration, FALLBACK_GESTURE_DURATION);
    }

    #[test]
    fn beat_flag_means_any_beat() {
        assert_eq!(parse(r#"{ "appearOnBeat": true }"#).timing.appear_on_beat, Some(0));
        assert_eq!(parse(r#"{ "appearOnBeat": 8 }"#).timing.appear_on_beat, Some(8));
        assert_eq!(parse(r#"{ "appearOnBeat": false }"#).timing.appear_on_beat, None);
    }

    #[test]
    fn parameter_curves_are_parsed() {
        let cfg = parse(r#"{ "parameterAnimation": { "glow": { "from": 0, "to": 4 } } }"#);
        assert_eq!(cfg.parameter_animation["glow"].evaluate(0.5), 2.0);
    }
}
