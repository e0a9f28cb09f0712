//! Parsed configuration sections with their documented defaults.

use glam::Vec3;
use crate::extensions::easing::Easing;
use crate::systems::hold::{
    DriftConfig, DriftDirection, EmissiveConfig, EmissiveWave, FlickerConfig, FlickerPattern,
    NonUniformScaleConfig, OpacityLinkConfig, OpacityLinkMode, PhysicsDriftConfig, PhysicsModel,
    PulseConfig, RotateConfig, RotateMode, ScaleMode,
};
use super::raw::{
    RawAppearance, RawAxis, RawColor, RawCurve, RawDrift, RawEmissive, RawFlicker, RawHold,
    RawLifecycle, RawOpacityLink, RawPhysics, RawProcedural, RawPulse, RawRendering, RawRotate,
    RawScale, RawSpread, RawTransition, RawVariance,
};

/// Parse a name with `from_name`, warning and falling back when unrecognised.
pub(crate) fn named<T: Copy + std::fmt::Debug>(
    name: Option<&str>,
    what: &str,
    lookup: impl Fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    match name {
        None => fallback,
        Some(n) => lookup(n).unwrap_or_else(|| {
            log::warn!("unknown {} '{}', using {:?}", what, n, fallback);
            fallback
        }),
    }
}

// ── Enter / exit ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnterType {
    #[default]
    Fade,
    /// Overshoot to double opacity with an emissive spike, then settle.
    Flash,
    Grow,
    /// Overshoot scale by 70% progress, settle over the rest.
    Pop,
    None,
}

impl EnterType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fade" => Some(Self::Fade),
            "flash" => Some(Self::Flash),
            "grow" | "scale" => Some(Self::Grow),
            "pop" => Some(Self::Pop),
            "none" | "instant" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitType {
    #[default]
    Fade,
    Flash,
    Shrink,
    Pop,
    None,
}

impl ExitType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fade" => Some(Self::Fade),
            "flash" => Some(Self::Flash),
            "shrink" | "scale" | "grow" => Some(Self::Shrink),
            "pop" => Some(Self::Pop),
            "none" | "instant" => Some(Self::None),
            _ => None,
        }
    }
}

/// Shared shape of the enter and exit sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<K> {
    pub kind: K,
    /// Milliseconds.
    pub duration: f32,
    pub easing: Easing,
    /// Scale multipliers at progress 0 and 1 (grow/shrink).
    pub scale_range: (f32, f32),
    pub overshoot: f32,
}

pub type EnterConfig = Transition<EnterType>;
pub type ExitConfig = Transition<ExitType>;

impl Default for EnterConfig {
    fn default() -> Self {
        Self {
            kind: EnterType::Fade,
            duration: 200.0,
            easing: Easing::QuadOut,
            scale_range: (0.0, 1.0),
            overshoot: 1.2,
        }
    }
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            kind: ExitType::Fade,
            duration: 200.0,
            easing: Easing::QuadIn,
            scale_range: (1.0, 0.0),
            overshoot: 1.2,
        }
    }
}

impl<K: Copy + std::fmt::Debug> Transition<K>
where
    Transition<K>: Default,
{
    pub(crate) fn from_raw(raw: Option<&RawTransition>, lookup: impl Fn(&str) -> Option<K>) -> Self {
        let d = Self::default();
        let Some(raw) = raw else { return d };
        Self {
            kind: named(raw.kind.as_deref(), "transition type", lookup, d.kind),
            duration: raw.duration.map(|v| v.max(0.0)).unwrap_or(d.duration),
            easing: raw
                .easing
                .as_deref()
                .map(|n| Easing::from_name_or(n, d.easing))
                .unwrap_or(d.easing),
            scale_range: raw.scale_range.map(|[a, b]| (a, b)).unwrap_or(d.scale_range),
            overshoot: raw.overshoot.unwrap_or(d.overshoot),
        }
    }

    pub fn with_kind(mut self, kind: K) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

// ── Hold ─────────────────────────────────────────────────────────────────

/// Hold-phase modifiers; absent sections are simply not applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoldConfig {
    pub pulse: Option<PulseConfig>,
    pub flicker: Option<FlickerConfig>,
    pub drift: Option<DriftConfig>,
    pub rotate: Option<RotateConfig>,
    pub emissive: Option<EmissiveConfig>,
    pub physics: Option<PhysicsDriftConfig>,
    pub scale: Option<NonUniformScaleConfig>,
    pub opacity_link: Option<OpacityLinkConfig>,
}

impl HoldConfig {
    pub(crate) fn from_raw(raw: Option<&RawHold>) -> Self {
        let Some(raw) = raw else { return Self::default() };
        Self {
            pulse: raw.pulse.as_ref().and_then(|s| s.enabled()).map(|r| pulse_from_raw(&r)),
            flicker: raw.flicker.as_ref().and_then(|s| s.enabled()).map(|r| flicker_from_raw(&r)),
            drift: raw.drift.as_ref().and_then(|s| s.enabled()).map(|r| drift_from_raw(&r)),
            rotate: raw.rotate.as_ref().and_then(|s| s.enabled()).map(|r| rotate_from_raw(&r)),
            emissive: raw.emissive.as_ref().and_then(|s| s.enabled()).map(|r| emissive_from_raw(&r)),
            physics: raw.physics.as_ref().and_then(|s| s.enabled()).map(|r| physics_from_raw(&r)),
            scale: raw.scale.as_ref().and_then(|s| s.enabled()).map(|r| scale_from_raw(&r)),
            opacity_link: raw
                .opacity_link
                .as_ref()
                .and_then(|s| s.enabled())
                .map(|r| opacity_link_from_raw(&r)),
        }
    }

    /// Whether any modifier is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn pulse_from_raw(raw: &RawPulse) -> PulseConfig {
    let d = PulseConfig::default();
    PulseConfig {
        amplitude: raw.amplitude.unwrap_or(d.amplitude),
        frequency: raw.frequency.unwrap_or(d.frequency),
        phase: raw.phase.unwrap_or(d.phase),
    }
}

fn flicker_from_raw(raw: &RawFlicker) -> FlickerConfig {
    let d = FlickerConfig::default();
    FlickerConfig {
        intensity: raw.intensity.unwrap_or(d.intensity),
        rate: raw.rate.unwrap_or(d.rate),
        pattern: named(raw.pattern.as_deref(), "flicker pattern", FlickerPattern::from_name, d.pattern),
        smoothing: raw.smoothing.unwrap_or(d.smoothing),
    }
}

fn drift_from_raw(raw: &RawDrift) -> DriftConfig {
    let d = DriftConfig::default();
    DriftConfig {
        direction: named(raw.direction.as_deref(), "drift direction", DriftDirection::from_name, d.direction),
        distance: raw.distance.unwrap_or(d.distance),
        noise: raw.noise.unwrap_or(d.noise),
        bounce: raw.bounce.unwrap_or(d.bounce),
    }
}

fn axis_from_raw(raw: Option<&RawAxis>, fallback: Vec3) -> Vec3 {
    match raw {
        None => fallback,
        Some(RawAxis::Vector(v)) => Vec3::from_array(*v),
        Some(RawAxis::Named(name)) => match name.to_ascii_lowercase().as_str() {
            "x" => Vec3::X,
            "y" => Vec3::Y,
            "z" => Vec3::Z,
            other => {
                log::warn!("unknown rotation axis '{}', using {:?}", other, fallback);
                fallback
            }
        },
    }
}

fn rotate_from_raw(raw: &RawRotate) -> RotateConfig {
    let d = RotateConfig::default();
    let implied = if raw.oscillate == Some(true) {
        RotateMode::Oscillate
    } else {
        d.mode
    };
    RotateConfig {
        axis: axis_from_raw(raw.axis.as_ref(), d.axis),
        speed: raw.speed.unwrap_or(d.speed),
        mode: named(raw.mode.as_deref(), "rotate mode", RotateMode::from_name, implied),
        range: raw.range.unwrap_or(d.range),
    }
}

fn emissive_from_raw(raw: &RawEmissive) -> EmissiveConfig {
    let d = EmissiveConfig::default();
    EmissiveConfig {
        min: raw.min.unwrap_or(d.min),
        max: raw.max.unwrap_or(d.max),
        frequency: raw.frequency.unwrap_or(d.frequency),
        pattern: named(raw.pattern.as_deref(), "emissive pattern", EmissiveWave::from_name, d.pattern),
    }
}

fn physics_from_raw(raw: &RawPhysics) -> PhysicsDriftConfig {
    let d = PhysicsDriftConfig::default();
    PhysicsDriftConfig {
        model: named(raw.model.as_deref(), "physics model", PhysicsModel::from_name, d.model),
        speed: raw.speed.unwrap_or(d.speed),
        gravity: raw.gravity.unwrap_or(d.gravity),
        adherence: raw.adherence.unwrap_or(d.adherence),
        max_duration: raw.max_duration.unwrap_or(d.max_duration),
        buoyancy: raw.buoyancy.unwrap_or(d.buoyancy),
        wobble: raw.wobble.unwrap_or(d.wobble),
        wobble_frequency: raw.wobble_frequency.unwrap_or(d.wobble_frequency),
        spread: raw.spread.unwrap_or(d.spread),
        jitter: raw.jitter.unwrap_or(d.jitter),
    }
}

fn scale_from_raw(raw: &RawScale) -> NonUniformScaleConfig {
    let d = NonUniformScaleConfig::default();
    NonUniformScaleConfig {
        mode: named(raw.mode.as_deref(), "scale mode", ScaleMode::from_name, d.mode),
        amplitude: raw.amplitude.unwrap_or(d.amplitude),
        frequency: raw.frequency.unwrap_or(d.frequency),
        axes: raw.axes.map(Vec3::from_array).unwrap_or(d.axes),
        wobble: raw.wobble.unwrap_or(d.wobble),
        velocity_link: raw.velocity_link.unwrap_or(d.velocity_link),
        stretch_factor: raw.stretch_factor.unwrap_or(d.stretch_factor),
        max_stretch: raw.max_stretch.unwrap_or(d.max_stretch),
    }
}

fn opacity_link_from_raw(raw: &RawOpacityLink) -> OpacityLinkConfig {
    let d = OpacityLinkConfig::default();
    OpacityLinkConfig {
        mode: named(raw.mode.as_deref(), "opacity link mode", OpacityLinkMode::from_name, d.mode),
        scale_range: raw.scale_range.map(|[a, b]| (a, b)).unwrap_or(d.scale_range),
        min_opacity: raw.min_opacity.unwrap_or(d.min_opacity),
        rate: raw.rate.unwrap_or(d.rate),
        duration: raw.duration.unwrap_or(d.duration),
    }
}

// ── Variance / appearance ────────────────────────────────────────────────

/// Relative variance fractions; `delay` is an absolute spread in ms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VarianceConfig {
    pub scale: f32,
    pub lifetime: f32,
    pub color: f32,
    pub delay: f32,
}

impl VarianceConfig {
    pub(crate) fn from_raw(raw: Option<&RawVariance>) -> Self {
        let Some(raw) = raw else { return Self::default() };
        Self {
            scale: raw.scale.unwrap_or(0.0).max(0.0),
            lifetime: raw.lifetime.unwrap_or(0.0).max(0.0),
            color: raw.color.unwrap_or(0.0).max(0.0),
            delay: raw.delay.unwrap_or(0.0).max(0.0),
        }
    }
}

/// A baseline value and its relative variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub base: f32,
    pub variance: f32,
}

impl Spread {
    pub fn new(base: f32, variance: f32) -> Self {
        Self { base, variance }
    }

    fn from_raw(raw: Option<&RawSpread>, fallback: Spread) -> Self {
        match raw {
            None => fallback,
            Some(RawSpread::Value(v)) => Spread::new(*v, fallback.variance),
            Some(RawSpread::Spread { base, variance }) => Spread::new(
                base.unwrap_or(fallback.base),
                variance.unwrap_or(fallback.variance),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Linear RGB in [0, 1].
    pub color: Option<Vec3>,
    pub opacity: Spread,
    pub scale: Spread,
}

impl Appearance {
    pub(crate) fn from_raw(raw: Option<&RawAppearance>, variance: &VarianceConfig) -> Self {
        let opacity_default = Spread::new(1.0, 0.0);
        let scale_default = Spread::new(1.0, variance.scale);
        let Some(raw) = raw else {
            return Self {
                color: None,
                opacity: opacity_default,
                scale: scale_default,
            };
        };
        Self {
            color: raw.color.as_ref().and_then(parse_color),
            opacity: Spread::from_raw(raw.opacity.as_ref(), opacity_default),
            scale: Spread::from_raw(raw.scale.as_ref(), scale_default),
        }
    }
}

/// `#rgb`, `#rrggbb` or `[r, g, b]`.
pub fn parse_color(raw: &RawColor) -> Option<Vec3> {
    match raw {
        RawColor::Rgb(rgb) => Some(Vec3::from_array(*rgb).clamp(Vec3::ZERO, Vec3::ONE)),
        RawColor::Hex(hex) => {
            let digits = hex.trim().trim_start_matches('#');
            let expanded: String = match digits.len() {
                3 => digits.chars().flat_map(|c| [c, c]).collect(),
                6 => digits.to_string(),
                _ => {
                    log::warn!("unrecognised colour '{}'", hex);
                    return None;
                }
            };
            let value = match u32::from_str_radix(&expanded, 16) {
                Ok(v) => v,
                Err(_) => {
                    log::warn!("unrecognised colour '{}'", hex);
                    return None;
                }
            };
            Some(Vec3::new(
                ((value >> 16) & 0xff) as f32 / 255.0,
                ((value >> 8) & 0xff) as f32 / 255.0,
                (value & 0xff) as f32 / 255.0,
            ))
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Blend mode for element materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (src-alpha, one-minus-src-alpha).
    #[default]
    Normal,
    /// Additive blending for HDR glow effects (src-alpha, one).
    Additive,
    Multiply,
    Subtractive,
}

impl BlendMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "normal" | "alpha" => Some(Self::Normal),
            "additive" => Some(Self::Additive),
            "multiply" => Some(Self::Multiply),
            "subtractive" => Some(Self::Subtractive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailConfig {
    /// Number of trailing copies.
    pub length: u32,
    /// Opacity multiplier between consecutive copies.
    pub fade: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self { length: 4, fade: 0.6 }
    }
}

/// Material flags passed through to the host renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingConfig {
    pub render_order: i32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub blending: BlendMode,
    pub trail: Option<TrailConfig>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            render_order: 0,
            depth_test: true,
            depth_write: false,
            blending: BlendMode::Normal,
            trail: None,
        }
    }
}

impl RenderingConfig {
    pub(crate) fn from_raw(raw: Option<&RawRendering>) -> Self {
        let d = Self::default();
        let Some(raw) = raw else { return d };
        Self {
            render_order: raw.render_order.unwrap_or(d.render_order),
            depth_test: raw.depth_test.unwrap_or(d.depth_test),
            depth_write: raw.depth_write.unwrap_or(d.depth_write),
            blending: named(raw.blending.as_deref(), "blending", BlendMode::from_name, d.blending),
            trail: raw.trail.as_ref().and_then(|s| s.enabled()).map(|t| {
                let td = TrailConfig::default();
                TrailConfig {
                    length: t.length.unwrap_or(td.length),
                    fade: t.fade.unwrap_or(td.fade),
                }
            }),
        }
    }
}

// ── Lifecycle policy ─────────────────────────────────────────────────────

/// Whether and how often a dead element comes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnPolicy {
    pub respawn: bool,
    /// Milliseconds between death and the next birth.
    pub respawn_delay: f32,
    /// `-1` for unlimited.
    pub max_respawns: i32,
}

impl Default for RespawnPolicy {
    fn default() -> Self {
        Self {
            respawn: false,
            respawn_delay: 0.0,
            max_respawns: -1,
        }
    }
}

impl RespawnPolicy {
    pub(crate) fn from_raw(raw: Option<&RawLifecycle>) -> Self {
        let d = Self::default();
        let Some(raw) = raw else { return d };
        Self {
            respawn: raw.respawn.unwrap_or(d.respawn),
            respawn_delay: raw.respawn_delay.unwrap_or(d.respawn_delay).max(0.0),
            max_respawns: raw.max_respawns.unwrap_or(d.max_respawns),
        }
    }

    /// Whether an element that has respawned `count` times may respawn again.
    pub fn allows(&self, count: u32) -> bool {
        self.respawn && (self.max_respawns < 0 || (count as i64) < self.max_respawns as i64)
    }
}

// ── Procedural / parameter animation ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProceduralConfig {
    /// Passed through to the host's geometry layer.
    pub geometry_stability: f32,
    /// Hold-phase scale smoothing in [0, 1); 0 disables.
    pub scale_smoothing: f32,
}

impl ProceduralConfig {
    pub(crate) fn from_raw(raw: &RawProcedural) -> Self {
        Self {
            geometry_stability: raw.geometry_stability.unwrap_or(0.0).clamp(0.0, 1.0),
            scale_smoothing: raw.scale_smoothing.unwrap_or(0.0).clamp(0.0, 0.999),
        }
    }
}

/// A named value animated across an element's life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterCurve {
    pub from: f32,
    pub to: f32,
    pub easing: Easing,
    /// Life progress at which the curve starts moving.
    pub start: f32,
    /// Life progress at which it reaches `to`.
    pub end: f32,
}

impl Default for ParameterCurve {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            easing: Easing::Linear,
            start: 0.0,
            end: 1.0,
        }
    }
}

impl ParameterCurve {
    pub(crate) fn from_raw(raw: &RawCurve) -> Self {
        let d = Self::default();
        Self {
            from: raw.from.unwrap_or(d.from),
            to: raw.to.unwrap_or(d.to),
            easing: raw
                .easing
                .as_deref()
                .map(|n| Easing::from_name_or(n, d.easing))
                .unwrap_or(d.easing),
            start: raw.start.unwrap_or(d.start),
            end: raw.end.unwrap_or(d.end),
        }
    }

    /// Value at life progress `p`.
    pub fn evaluate(&self, p: f32) -> f32 {
        let span = self.end - self.start;
        let local = if span.abs() <= f32::EPSILON {
            if p >= self.end { 1.0 } else { 0.0 }
        } else {
            ((p - self.start) / span).clamp(0.0, 1.0)
        };
        crate::extensions::easing::ease(self.from, self.to, local, self.easing)
    }
}
