// extensions/easing.rs
//
// Easing registry for enter/exit curves and parameter animation.
// Curves are looked up by the names raw configurations use ("easeOutQuad").

use std::f32::consts::PI;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    /// Stronger slow start.
    CubicIn,
    /// Stronger slow end.
    CubicOut,
    /// Stronger slow start and end.
    CubicInOut,
    /// Very strong slow start.
    QuartIn,
    /// Very strong slow end.
    QuartOut,
    /// Very strong slow start and end.
    QuartInOut,
    /// Sine wave easing (smooth).
    SineIn,
    SineOut,
    SineInOut,
    /// Exponential easing (dramatic).
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// Overshoot then settle.
    BackIn,
    BackOut,
    BackInOut,
    /// Bouncy finish.
    BounceOut,
    /// Elastic spring.
    ElasticOut,
}

impl Easing {
    /// Every curve, in declaration order.
    pub const ALL: [Easing; 21] = [
        Easing::Linear,
        Easing::QuadIn, Easing::QuadOut, Easing::QuadInOut,
        Easing::CubicIn, Easing::CubicOut, Easing::CubicInOut,
        Easing::QuartIn, Easing::QuartOut, Easing::QuartInOut,
        Easing::SineIn, Easing::SineOut, Easing::SineInOut,
        Easing::ExpoIn, Easing::ExpoOut, Easing::ExpoInOut,
        Easing::BackIn, Easing::BackOut, Easing::BackInOut,
        Easing::BounceOut,
        Easing::ElasticOut,
    ];

    /// Registry name, e.g. `"easeOutQuad"`.
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "easeInQuad",
            Easing::QuadOut => "easeOutQuad",
            Easing::QuadInOut => "easeInOutQuad",
            Easing::CubicIn => "easeInCubic",
            Easing::CubicOut => "easeOutCubic",
            Easing::CubicInOut => "easeInOutCubic",
            Easing::QuartIn => "easeInQuart",
            Easing::QuartOut => "easeOutQuart",
            Easing::QuartInOut => "easeInOutQuart",
            Easing::SineIn => "easeInSine",
            Easing::SineOut => "easeOutSine",
            Easing::SineInOut => "easeInOutSine",
            Easing::ExpoIn => "easeInExpo",
            Easing::ExpoOut => "easeOutExpo",
            Easing::ExpoInOut => "easeInOutExpo",
            Easing::BackIn => "easeInBack",
            Easing::BackOut => "easeOutBack",
            Easing::BackInOut => "easeInOutBack",
            Easing::BounceOut => "easeOutBounce",
            Easing::ElasticOut => "easeOutElastic",
        }
    }

    /// Look up a curve by registry name. Case-insensitive; `-`/`_` ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(&wanted))
    }

    /// Like [`Easing::from_name`], logging and falling back when unknown.
    pub fn from_name_or(name: &str, fallback: Easing) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("unknown easing '{}', using {}", name, fallback.name());
            fallback
        })
    }

    /// Apply the easing function to a normalized time value `t` in [0, 1].
    /// Returns the eased value, also typically in [0, 1] (but can overshoot for Back/Elastic).
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            // Quadratic
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            // Cubic
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            // Quartic
            Easing::QuartIn => t * t * t * t,
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }

            // Sine
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            // Exponential
            Easing::ExpoIn => {
                if t == 0.0 { 0.0 } else { 2.0_f32.powf(10.0 * t - 10.0) }
            }
            Easing::ExpoOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) }
            }
            Easing::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            // Back (overshoot)
            Easing::BackIn => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                C3 * t * t * t - C1 * t * t
            }
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::BackInOut => {
                const C1: f32 = 1.70158;
                const C2: f32 = C1 * 1.525;
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
                }
            }

            // Bounce
            Easing::BounceOut => bounce_out(t),

            // Elastic
            Easing::ElasticOut => {
                const C4: f32 = (2.0 * PI) / 3.0;
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
                }
            }
        }
    }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}
