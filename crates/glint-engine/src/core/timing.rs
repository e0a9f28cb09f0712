//! Time units for element scheduling.
//!
//! Gesture choreography speaks in two clocks: normalized gesture progress
//! and wall-clock milliseconds. A [`TimePoint`] carries its unit with it so
//! the two can never be mixed up silently.

/// Which clock a configuration's timing fields are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingMode {
    /// Normalized gesture progress in [0, 1].
    #[default]
    Progress,
    /// Milliseconds since spawn.
    Milliseconds,
}

/// A point (or span) in time, tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimePoint {
    /// Fraction of the gesture duration.
    Progress(f32),
    /// Milliseconds.
    Millis(f32),
}

impl TimePoint {
    pub const ZERO_PROGRESS: Self = TimePoint::Progress(0.0);

    /// Zero in the given mode.
    pub fn zero(mode: TimingMode) -> Self {
        match mode {
            TimingMode::Progress => TimePoint::Progress(0.0),
            TimingMode::Milliseconds => TimePoint::Millis(0.0),
        }
    }

    pub fn mode(self) -> TimingMode {
        match self {
            TimePoint::Progress(_) => TimingMode::Progress,
            TimePoint::Millis(_) => TimingMode::Milliseconds,
        }
    }

    /// Raw value in whichever unit this point carries.
    pub fn value(self) -> f32 {
        match self {
            TimePoint::Progress(v) | TimePoint::Millis(v) => v,
        }
    }

    /// Convert to milliseconds against a gesture of `gesture_duration` ms.
    pub fn to_millis(self, gesture_duration: f32) -> f32 {
        match self {
            TimePoint::Progress(p) => p * gesture_duration,
            TimePoint::Millis(ms) => ms,
        }
    }

    /// Convert to gesture progress. A non-positive duration maps everything to 0.
    pub fn to_progress(self, gesture_duration: f32) -> f32 {
        match self {
            TimePoint::Progress(p) => p,
            TimePoint::Millis(ms) => {
                if gesture_duration > 0.0 {
                    ms / gesture_duration
                } else {
                    0.0
                }
            }
        }
    }

    /// Multiply, keeping the unit.
    pub fn scaled(self, factor: f32) -> Self {
        match self {
            TimePoint::Progress(p) => TimePoint::Progress(p * factor),
            TimePoint::Millis(ms) => TimePoint::Millis(ms * factor),
        }
    }

    /// Add a millisecond offset, converting it into this point's unit.
    pub fn offset_millis(self, ms: f32, gesture_duration: f32) -> Self {
        match self {
            TimePoint::Progress(p) => {
                TimePoint::Progress(p + TimePoint::Millis(ms).to_progress(gesture_duration))
            }
            TimePoint::Millis(v) => TimePoint::Millis(v + ms),
        }
    }
}

/// Everything a lifecycle needs to advance by one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Absolute time in milliseconds.
    pub time: f32,
    /// Milliseconds since the previous frame.
    pub delta: f32,
    /// Position within the gesture timeline, if the gesture clock is running.
    pub gesture_progress: Option<f32>,
    /// Global intensity scalar in [0, 1].
    pub intensity: f32,
}

impl FrameTick {
    pub fn new(time: f32, delta: f32) -> Self {
        Self {
            time,
            delta,
            gesture_progress: None,
            intensity: 0.0,
        }
    }

    pub fn with_progress(mut self, progress: f32) -> Self {
        self.gesture_progress = Some(progress);
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Intensity clamped into [0, 1].
    pub fn clamped_intensity(&self) -> f32 {
        if self.intensity.is_finite() {
            self.intensity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
