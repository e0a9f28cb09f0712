//! The enter / hold / exit / respawn state machine that drives one element.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec3;

use crate::config::{
    AnimationConfig, ElementConfig, ElementWindow, EnterType, ExitType, ScaledProperty,
};
use crate::core::random::RandomSource;
use crate::core::timing::{FrameTick, TimingMode};
use crate::extensions::easing::lerp;
use crate::systems::hold::{
    drift, emissive, flicker, non_uniform_scale, opacity_link, physics_drift, physics_seed,
    physics_velocity, pulse, rotate, DriftState, FlickerMemory,
};

use super::events::{LifecycleEvent, StateSnapshot};
use super::output::ElementOutput;

/// Emissive intensity outside of flashes and emissive waves.
pub const BASE_EMISSIVE: f32 = 1.0;
/// Emissive peak of flash transitions.
pub const FLASH_EMISSIVE: f32 = 2.5;

/// Fraction of a pop enter spent growing to the overshoot.
const POP_ENTER_SPLIT: f32 = 0.7;
/// Fraction of a pop exit spent swelling before collapsing.
const POP_EXIT_SPLIT: f32 = 0.3;

/// Zero-length phases may chain within one tick; this bounds the chain.
const MAX_TRANSITIONS_PER_TICK: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Waiting,
    Entering,
    Holding,
    Exiting,
    Dead,
}

impl Phase {
    pub fn is_visible(self) -> bool {
        matches!(self, Phase::Entering | Phase::Holding | Phase::Exiting)
    }
}

/// Values captured when an exit begins; the exit animates from these.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ExitOrigin {
    opacity: f32,
    scale: f32,
    emissive: f32,
}

/// Per-element lifecycle state.
///
/// All times are milliseconds. "Local" times are on the element's own clock:
/// gesture progress × duration while a progress-mode element is on its first
/// life and a progress is supplied, otherwise time since birth.
#[derive(Debug, Clone)]
pub struct AnimationState {
    config: Arc<AnimationConfig>,
    element: ElementConfig,
    normal: Vec3,
    phase: Phase,
    progress: f32,
    birth_time: f32,
    state_start_time: f32,
    exit_start_time: f32,
    respawn_count: u32,
    is_dead: bool,
    killed: bool,
    exit_requested: bool,

    opacity: f32,
    scale: f32,
    emissive: f32,
    scale_axes: Vec3,
    align_axis: Option<Vec3>,
    drift_state: Option<DriftState>,
    physics_offset: Vec3,
    physics_seed: f32,
    rotation_offset: Vec3,
    flicker_memory: FlickerMemory,
    smoothed_scale: Option<f32>,
    hold_clock: f32,
    exit_origin: ExitOrigin,

    current_beat: Option<u32>,
    bpm: f32,
    last_beat_triggered: Option<u32>,
    waiting_for_beat: bool,
    beat_released: bool,
    release_local: Option<f32>,

    last_time: f32,
    last_local: f32,
    window: ElementWindow,
    events: VecDeque<(LifecycleEvent, StateSnapshot)>,
}

impl AnimationState {
    /// Create the state for a prepared element. Fires `Spawn`.
    pub fn new(
        config: Arc<AnimationConfig>,
        element: ElementConfig,
        normal: Vec3,
        spawn_time: f32,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let drift_state = config
            .hold
            .drift
            .as_ref()
            .map(|cfg| DriftState::new(cfg, normal, rng));
        let waiting_for_beat = config.timing.appear_on_beat.is_some();
        let window = config.element_window(&element, 0.0);
        let mut state = Self {
            physics_seed: physics_seed(element.start_delay(), element.index),
            config,
            element,
            normal,
            phase: Phase::Waiting,
            progress: 0.0,
            birth_time: spawn_time,
            state_start_time: 0.0,
            exit_start_time: 0.0,
            respawn_count: 0,
            is_dead: false,
            killed: false,
            exit_requested: false,
            opacity: 0.0,
            scale: 0.0,
            emissive: BASE_EMISSIVE,
            scale_axes: Vec3::ONE,
            align_axis: None,
            drift_state,
            physics_offset: Vec3::ZERO,
            rotation_offset: Vec3::ZERO,
            flicker_memory: FlickerMemory::default(),
            smoothed_scale: None,
            hold_clock: 0.0,
            exit_origin: ExitOrigin {
                opacity: 0.0,
                scale: 0.0,
                emissive: BASE_EMISSIVE,
            },
            current_beat: None,
            bpm: 0.0,
            last_beat_triggered: None,
            waiting_for_beat,
            beat_released: false,
            release_local: None,
            last_time: spawn_time,
            last_local: 0.0,
            window,
            events: VecDeque::new(),
        };
        state.emit(LifecycleEvent::Spawn);
        state
    }

    /// Resolve element `index` from the batch config and spawn it.
    pub fn spawn(
        config: Arc<AnimationConfig>,
        index: usize,
        normal: Vec3,
        spawn_time: f32,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let element = config.create_element_config(index, rng);
        Self::new(config, element, normal, spawn_time, rng)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn element(&self) -> &ElementConfig {
        &self.element
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Progress within the current phase, in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn birth_time(&self) -> f32 {
        self.birth_time
    }

    /// Local time at which the current phase began.
    pub fn state_start_time(&self) -> f32 {
        self.state_start_time
    }

    pub fn exit_start_time(&self) -> f32 {
        self.exit_start_time
    }

    pub fn respawn_count(&self) -> u32 {
        self.respawn_count
    }

    /// Terminal: the orchestrator may drop this element.
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn emissive(&self) -> f32 {
        self.emissive
    }

    pub fn fade_progress(&self) -> f32 {
        match self.phase {
            Phase::Exiting => self.progress,
            Phase::Dead => 1.0,
            _ => 0.0,
        }
    }

    pub fn drift_offset(&self) -> Vec3 {
        self.drift_state.map(|d| d.offset).unwrap_or(Vec3::ZERO) + self.physics_offset
    }

    pub fn rotation_offset(&self) -> Vec3 {
        self.rotation_offset
    }

    pub fn current_beat(&self) -> Option<u32> {
        self.current_beat
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn last_beat_triggered(&self) -> Option<u32> {
        self.last_beat_triggered
    }

    pub fn waiting_for_beat(&self) -> bool {
        self.waiting_for_beat
    }

    /// Appear/disappear thresholds used by the last tick.
    pub fn window(&self) -> ElementWindow {
        self.window
    }

    /// Position within the element's visible window, clamped to [0, 1].
    pub fn life_progress(&self) -> f32 {
        let span = self.window.span();
        if span <= 0.0 {
            return if self.last_local >= self.window.appear { 1.0 } else { 0.0 };
        }
        ((self.last_local - self.window.appear) / span).clamp(0.0, 1.0)
    }

    /// Current value of a named parameter curve.
    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.config
            .parameter_animation
            .get(name)
            .map(|curve| curve.evaluate(self.life_progress()))
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            index: self.element.index,
            phase: self.phase,
            progress: self.progress,
            opacity: self.opacity,
            scale: self.scale,
            emissive: self.emissive,
            respawn_count: self.respawn_count,
            time: self.last_time,
        }
    }

    pub fn drain_events(&mut self) -> Vec<(LifecycleEvent, StateSnapshot)> {
        self.events.drain(..).collect()
    }

    // ── External control ─────────────────────────────────────────────

    /// Push the latest beat. A beat-gated element is released once the beat
    /// reaches its threshold and appears on the next tick.
    pub fn set_beat(&mut self, beat: u32, bpm: f32) {
        self.current_beat = Some(beat);
        self.bpm = bpm;
        if !self.waiting_for_beat {
            return;
        }
        let threshold = self.config.timing.appear_on_beat.unwrap_or(0);
        if beat >= threshold {
            self.waiting_for_beat = false;
            self.beat_released = true;
            self.last_beat_triggered = Some(beat);
            log::debug!("element {} released on beat {}", self.element.index, beat);
        }
    }

    /// Start exiting on the next tick. Ignored unless entering or holding.
    pub fn trigger_exit(&mut self) {
        if matches!(self.phase, Phase::Entering | Phase::Holding) {
            self.exit_requested = true;
        }
    }

    /// Terminate immediately without animating out.
    pub fn kill(&mut self) {
        self.killed = true;
        self.is_dead = true;
        self.exit_requested = false;
        self.phase = Phase::Dead;
        self.opacity = 0.0;
        self.scale = 0.0;
        self.emissive = 0.0;
    }

    // ── Tick ─────────────────────────────────────────────────────────

    pub fn update(&mut self, tick: &FrameTick, rng: &mut dyn RandomSource) -> ElementOutput {
        let intensity = tick.clamped_intensity();
        self.last_time = tick.time;
        let mut local = self.local_time(tick);
        self.window = self.resolve_window(local, intensity);

        for _ in 0..MAX_TRANSITIONS_PER_TICK {
            match self.phase {
                Phase::Waiting => {
                    if self.waiting_for_beat || local < self.window.appear {
                        break;
                    }
                    self.begin_enter(self.window.appear, intensity);
                }
                Phase::Entering => {
                    if self.exit_requested {
                        self.begin_exit(local);
                        continue;
                    }
                    if local >= self.window.disappear {
                        self.begin_exit(self.window.disappear.max(self.state_start_time));
                        continue;
                    }
                    let duration = self.enter_duration(intensity);
                    let p = phase_progress(local - self.state_start_time, duration);
                    if p >= 1.0 {
                        self.complete_enter(self.state_start_time + duration.max(0.0), intensity);
                        continue;
                    }
                    self.progress = p;
                    self.apply_enter(p, intensity);
                    break;
                }
                Phase::Holding => {
                    if self.exit_requested {
                        self.begin_exit(local);
                        continue;
                    }
                    if local >= self.window.disappear {
                        self.begin_exit(self.window.disappear.max(self.state_start_time));
                        continue;
                    }
                    self.compose_hold(local, intensity, rng);
                    break;
                }
                Phase::Exiting => {
                    let duration = self.exit_duration(intensity);
                    let p = phase_progress(local - self.exit_start_time, duration);
                    if p >= 1.0 {
                        self.complete_exit();
                        continue;
                    }
                    self.progress = p;
                    self.apply_exit(p);
                    break;
                }
                Phase::Dead => {
                    if self.killed || self.is_dead {
                        break;
                    }
                    if self.config.lifecycle.allows(self.respawn_count) {
                        self.respawn(tick.time);
                        local = self.local_time(tick);
                        self.window = self.resolve_window(local, intensity);
                        continue;
                    }
                    self.is_dead = true;
                    break;
                }
            }
        }

        self.last_local = local;
        self.output()
    }

    fn local_time(&self, tick: &FrameTick) -> f32 {
        match tick.gesture_progress {
            Some(p) if self.respawn_count == 0 && self.config.timing_mode() == TimingMode::Progress => {
                p * self.config.gesture_duration
            }
            _ => tick.time - self.birth_time,
        }
    }

    fn resolve_window(&mut self, local: f32, intensity: f32) -> ElementWindow {
        let window = self.config.element_window(&self.element, intensity);
        if self.respawn_count > 0 {
            return window.shifted_to(self.element.delay_offset);
        }
        if self.beat_released {
            let release = *self.release_local.get_or_insert(local);
            return window.shifted_to(release);
        }
        window
    }

    /// Hold scale for this element at `intensity`.
    fn target_scale(&self, intensity: f32) -> f32 {
        self.config
            .get_scaled_value(ScaledProperty::Scale, self.element.scale, intensity)
    }

    /// `none` enters snap, so their duration is zero.
    fn enter_duration(&self, intensity: f32) -> f32 {
        if self.config.enter.kind == EnterType::None {
            return 0.0;
        }
        self.config
            .get_scaled_value(ScaledProperty::EnterDuration, self.config.enter.duration, intensity)
    }

    fn exit_duration(&self, intensity: f32) -> f32 {
        if self.config.exit.kind == ExitType::None {
            return 0.0;
        }
        self.config
            .get_scaled_value(ScaledProperty::ExitDuration, self.config.exit.duration, intensity)
    }

    fn output(&self) -> ElementOutput {
        let holding = self.phase == Phase::Holding;
        ElementOutput {
            visible: self.phase.is_visible(),
            opacity: self.opacity.max(0.0),
            scale: self.scale.max(0.0),
            scale_axes: if holding { self.scale_axes } else { Vec3::ONE },
            emissive: self.emissive.max(0.0),
            fade_progress: self.fade_progress(),
            drift_offset: self.drift_offset(),
            rotation_offset: self.rotation_offset,
            align_axis: if holding { self.align_axis } else { None },
            resample: false,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn set_phase(&mut self, phase: Phase, at: f32) {
        log::debug!(
            "element {}: {:?} -> {:?} at {:.1}ms",
            self.element.index,
            self.phase,
            phase,
            at
        );
        self.phase = phase;
        self.state_start_time = at;
        self.progress = 0.0;
    }

    fn begin_enter(&mut self, at: f32, intensity: f32) {
        self.set_phase(Phase::Entering, at);
        self.apply_enter(0.0, intensity);
        self.emit(LifecycleEvent::EnterStart);
    }

    fn complete_enter(&mut self, at: f32, intensity: f32) {
        self.set_phase(Phase::Holding, at);
        self.opacity = self.element.opacity;
        self.scale = self.target_scale(intensity);
        self.emissive = BASE_EMISSIVE;
        self.hold_clock = at;
        self.smoothed_scale = None;
        self.emit(LifecycleEvent::EnterComplete);
    }

    fn begin_exit(&mut self, at: f32) {
        self.exit_requested = false;
        self.exit_origin = ExitOrigin {
            opacity: self.opacity,
            scale: self.scale,
            emissive: self.emissive,
        };
        self.exit_start_time = at;
        self.set_phase(Phase::Exiting, at);
        self.emit(LifecycleEvent::ExitStart);
    }

    fn complete_exit(&mut self) {
        self.set_phase(Phase::Dead, self.exit_start_time);
        self.progress = 1.0;
        self.opacity = 0.0;
        self.scale = 0.0;
        self.emissive = 0.0;
        self.emit(LifecycleEvent::ExitComplete);
    }

    fn respawn(&mut self, now: f32) {
        self.respawn_count += 1;
        self.birth_time = now + self.config.lifecycle.respawn_delay;
        self.set_phase(Phase::Waiting, 0.0);
        self.exit_requested = false;
        self.release_local = None;
        self.beat_released = false;
        self.opacity = 0.0;
        self.scale = 0.0;
        self.emissive = BASE_EMISSIVE;
        self.scale_axes = Vec3::ONE;
        self.align_axis = None;
        self.physics_offset = Vec3::ZERO;
        self.rotation_offset = Vec3::ZERO;
        self.flicker_memory = FlickerMemory::default();
        self.smoothed_scale = None;
        if let Some(drift) = self.drift_state.as_mut() {
            drift.reset();
        }
        self.emit(LifecycleEvent::Respawn);
    }

    // ── Phase outputs ────────────────────────────────────────────────

    fn apply_enter(&mut self, p: f32, intensity: f32) {
        let target_scale = self.target_scale(intensity);
        let enter = &self.config.enter;
        let target_opacity = self.element.opacity;
        let eased = enter.easing.apply(p);
        let (range_from, range_to) = enter.scale_range;

        let (opacity, scale, emissive) = match enter.kind {
            EnterType::Fade => (eased * target_opacity, target_scale, BASE_EMISSIVE),
            EnterType::Flash => {
                if p < 0.5 {
                    let k = enter.easing.apply(p * 2.0);
                    (
                        lerp(0.0, 2.0 * target_opacity, k),
                        target_scale,
                        lerp(BASE_EMISSIVE, FLASH_EMISSIVE, k),
                    )
                } else {
                    let k = enter.easing.apply((p - 0.5) * 2.0);
                    (
                        lerp(2.0 * target_opacity, target_opacity, k),
                        target_scale,
                        lerp(FLASH_EMISSIVE, BASE_EMISSIVE, k),
                    )
                }
            }
            EnterType::Grow => (
                target_opacity,
                lerp(range_from * target_scale, range_to * target_scale, eased),
                BASE_EMISSIVE,
            ),
            EnterType::Pop => {
                let peak = enter.overshoot * target_scale;
                let scale = if p < POP_ENTER_SPLIT {
                    let k = enter.easing.apply(p / POP_ENTER_SPLIT);
                    lerp(range_from * target_scale, peak, k)
                } else {
                    // Settles on the exit curve.
                    let k = self
                        .config
                        .exit
                        .easing
                        .apply((p - POP_ENTER_SPLIT) / (1.0 - POP_ENTER_SPLIT));
                    lerp(peak, target_scale, k)
                };
                (target_opacity, scale, BASE_EMISSIVE)
            }
            EnterType::None => (target_opacity, target_scale, BASE_EMISSIVE),
        };
        self.opacity = opacity.max(0.0);
        self.scale = scale.max(0.0);
        self.emissive = emissive;
    }

    fn apply_exit(&mut self, p: f32) {
        let exit = &self.config.exit;
        let origin = self.exit_origin;
        let eased = exit.easing.apply(p);

        let (opacity, scale, emissive) = match exit.kind {
            ExitType::Fade => (origin.opacity * (1.0 - eased), origin.scale, origin.emissive),
            ExitType::Flash => {
                if p < 0.5 {
                    let k = exit.easing.apply(p * 2.0);
                    (
                        lerp(origin.opacity, 2.0 * origin.opacity, k),
                        origin.scale,
                        lerp(origin.emissive, FLASH_EMISSIVE, k),
                    )
                } else {
                    let k = exit.easing.apply((p - 0.5) * 2.0);
                    (
                        lerp(2.0 * origin.opacity, 0.0, k),
                        origin.scale,
                        lerp(FLASH_EMISSIVE, 0.0, k),
                    )
                }
            }
            ExitType::Shrink => {
                let (from, to) = exit.scale_range;
                (origin.opacity, origin.scale * lerp(from, to, eased), origin.emissive)
            }
            ExitType::Pop => {
                let peak = exit.overshoot * origin.scale;
                if p < POP_EXIT_SPLIT {
                    let k = exit.easing.apply(p / POP_EXIT_SPLIT);
                    (origin.opacity, lerp(origin.scale, peak, k), origin.emissive)
                } else {
                    let k = exit.easing.apply((p - POP_EXIT_SPLIT) / (1.0 - POP_EXIT_SPLIT));
                    (origin.opacity * (1.0 - k), lerp(peak, 0.0, k), origin.emissive)
                }
            }
            ExitType::None => (0.0, 0.0, 0.0),
        };
        self.opacity = opacity.max(0.0);
        self.scale = scale.max(0.0);
        self.emissive = emissive.max(0.0);
    }

    /// Recompute hold modifiers for local time `local`.
    fn compose_hold(&mut self, local: f32, intensity: f32, rng: &mut dyn RandomSource) {
        let config = Arc::clone(&self.config);
        let hold = &config.hold;
        let t = (local - self.state_start_time).max(0.0) / 1000.0;
        let dt_ms = (local - self.hold_clock).max(0.0);
        let dt = dt_ms / 1000.0;
        self.hold_clock = self.hold_clock.max(local);
        self.progress = self.life_window_progress(local);

        let mut scale = self.target_scale(intensity);
        let mut opacity = self.element.opacity;
        let mut emissive_level = BASE_EMISSIVE;

        if let Some(cfg) = hold.pulse {
            let mut cfg = cfg;
            cfg.amplitude = config.get_scaled_value(ScaledProperty::PulseAmplitude, cfg.amplitude, intensity);
            scale *= pulse(&cfg, t);
        }
        if let Some(cfg) = hold.flicker {
            let mut cfg = cfg;
            cfg.intensity =
                config.get_scaled_value(ScaledProperty::FlickerIntensity, cfg.intensity, intensity);
            opacity *= flicker(&cfg, t, dt, &mut self.flicker_memory, rng);
        }
        if let Some(cfg) = hold.emissive {
            let mut cfg = cfg;
            cfg.max = config.get_scaled_value(ScaledProperty::EmissiveMax, cfg.max, intensity);
            emissive_level = emissive(&cfg, t);
        }
        let drift_speed = config.get_scaled_value(ScaledProperty::DriftSpeed, 1.0, intensity);
        if let (Some(cfg), Some(state)) = (hold.drift.as_ref(), self.drift_state.as_mut()) {
            drift(cfg, state, config.gesture_duration, dt_ms, t, drift_speed);
        }
        let mut velocity = Vec3::ZERO;
        if let Some(cfg) = hold.physics.as_ref() {
            self.physics_offset = physics_drift(cfg, t, self.normal, self.physics_seed);
            velocity = physics_velocity(cfg, t, self.normal, self.physics_seed);
        }
        if let Some(cfg) = hold.rotate.as_ref() {
            let speed = config.get_scaled_value(ScaledProperty::RotateSpeed, 1.0, intensity);
            self.rotation_offset = rotate(cfg, self.element.index, self.rotation_offset, t, dt, speed);
        }

        if let Some(smoothing) = config.procedural.map(|p| p.scale_smoothing).filter(|s| *s > 0.0) {
            let smoothed = match self.smoothed_scale {
                None => scale,
                Some(prev) => {
                    let alpha = 1.0 - (-dt_ms / (smoothing * 100.0)).exp();
                    prev + (scale - prev) * alpha
                }
            };
            self.smoothed_scale = Some(smoothed);
            scale = smoothed;
        }

        self.scale_axes = Vec3::ONE;
        self.align_axis = None;
        if let Some(cfg) = hold.scale.as_ref() {
            if velocity == Vec3::ZERO {
                if let (Some(drift_cfg), Some(state)) = (hold.drift.as_ref(), self.drift_state.as_ref()) {
                    velocity = state.velocity(drift_cfg, config.gesture_duration, drift_speed);
                }
            }
            let out = non_uniform_scale(cfg, t, velocity);
            self.scale_axes = out.scale.max(Vec3::ZERO);
            self.align_axis = out.align_axis;
        }
        if let Some(cfg) = hold.opacity_link.as_ref() {
            opacity *= opacity_link(cfg, self.scale_axes * scale, t, self.element.seed);
        }

        self.scale = scale.max(0.0);
        self.opacity = opacity.max(0.0);
        self.emissive = emissive_level.max(0.0);
    }

    fn life_window_progress(&self, local: f32) -> f32 {
        let start = self.state_start_time;
        let span = self.window.disappear - start;
        if span <= 0.0 {
            1.0
        } else {
            ((local - start) / span).clamp(0.0, 1.0)
        }
    }

    fn emit(&mut self, event: LifecycleEvent) {
        let snapshot = self.snapshot();
        self.config.hooks.fire(event, &snapshot);
        self.events.push_back((event, snapshot));
    }
}

fn phase_progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::{ConstantRandom, Rng};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(json: &str) -> Arc<AnimationConfig> {
        Arc::new(AnimationConfig::from_json(json, 1000.0).unwrap())
    }

    fn spawn(config: Arc<AnimationConfig>) -> AnimationState {
        let element = ElementConfig::uniform(0);
        AnimationState::new(config, element, Vec3::Y, 0.0, &mut Rng::new(7))
    }

    fn tick(state: &mut AnimationState, time: f32, delta: f32) -> ElementOutput {
        state.update(&FrameTick::new(time, delta), &mut Rng::new(3))
    }

    #[test]
    fn fade_enter_rises_monotonically_to_target() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 2000, "enter": { "type": "fade", "duration": 200 } }"#);
        let mut state = AnimationState::new(
            cfg,
            ElementConfig::uniform(0).with_opacity(0.8),
            Vec3::Y,
            0.0,
            &mut Rng::new(1),
        );
        let first = tick(&mut state, 0.0, 0.0);
        assert_eq!(state.phase(), Phase::Entering);
        assert_eq!(first.opacity, 0.0);

        let mut last = 0.0;
        for i in 1..20 {
            let out = tick(&mut state, i as f32 * 10.0, 10.0);
            assert!(out.opacity >= last, "opacity fell at step {}", i);
            last = out.opacity;
        }
        let done = tick(&mut state, 200.0, 10.0);
        assert_eq!(state.phase(), Phase::Holding);
        assert!((done.opacity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn drift_covers_half_distance_in_half_gesture() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000,
                 "enter": { "type": "none", "duration": 0 },
                 "hold": { "drift": { "direction": "up", "distance": 0.2 } } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        assert_eq!(state.phase(), Phase::Holding);
        let mut out = ElementOutput::default();
        for i in 1..=50 {
            out = tick(&mut state, i as f32 * 10.0, 10.0);
        }
        assert!((out.drift_offset.y.abs() - 0.1).abs() < 1e-4, "y = {}", out.drift_offset.y);

        for i in 51..=400 {
            let out = tick(&mut state, i as f32 * 10.0, 10.0);
            assert!(out.drift_offset.y.abs() <= 0.2 + 1e-5);
        }
    }

    #[test]
    fn zero_delta_updates_are_idempotent() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000,
                 "hold": { "pulse": true, "flicker": { "pattern": "random" }, "drift": true,
                           "rotate": true, "emissive": true } }"#,
        );
        let mut state = spawn(cfg);
        for i in 0..40 {
            tick(&mut state, i as f32 * 16.0, 16.0);
        }
        assert_eq!(state.phase(), Phase::Holding);
        let a = tick(&mut state, 700.0, 0.0);
        let b = tick(&mut state, 700.0, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn disappear_before_enter_completes_goes_straight_to_exit() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 100, "enter": { "duration": 500 } }"#);
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        assert_eq!(state.phase(), Phase::Entering);
        tick(&mut state, 120.0, 120.0);
        assert_eq!(state.phase(), Phase::Exiting);
        assert_eq!(state.exit_start_time(), 100.0);
        let events: Vec<_> = state.drain_events().into_iter().map(|(e, _)| e).collect();
        assert!(!events.contains(&LifecycleEvent::EnterComplete));
    }

    #[test]
    fn inverted_window_exits_immediately() {
        let cfg = config(r#"{ "appearAt": 0.5, "disappearAt": 0.2 }"#);
        let mut state = spawn(cfg);
        tick(&mut state, 520.0, 16.0);
        assert!(matches!(state.phase(), Phase::Exiting | Phase::Dead));
    }

    #[test]
    fn progress_clock_follows_gesture() {
        let cfg = config(r#"{ "appearAt": 0.5, "disappearAt": 0.9 }"#);
        let mut state = spawn(cfg);
        let mut rng = Rng::new(1);
        state.update(&FrameTick::new(5000.0, 16.0).with_progress(0.4), &mut rng);
        assert_eq!(state.phase(), Phase::Waiting);
        state.update(&FrameTick::new(5016.0, 16.0).with_progress(0.55), &mut rng);
        assert_eq!(state.phase(), Phase::Entering);
    }

    #[test]
    fn exits_fade_to_dead() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 300 }"#);
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        tick(&mut state, 250.0, 16.0);
        assert_eq!(state.phase(), Phase::Holding);
        let mid = tick(&mut state, 400.0, 16.0);
        assert_eq!(state.phase(), Phase::Exiting);
        assert!(mid.opacity < 1.0 && mid.opacity > 0.0);
        assert!((mid.fade_progress - 0.5).abs() < 1e-5);
        let end = tick(&mut state, 500.0, 16.0);
        assert!(!end.visible);
        assert!(state.is_dead());
        assert_eq!(end.fade_progress, 1.0);
    }

    #[test]
    fn respawns_up_to_the_limit() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 100,
                 "enter": { "duration": 10 }, "exit": { "duration": 10 },
                 "lifecycle": { "respawn": true, "respawnDelay": 50, "maxRespawns": 2 } }"#,
        );
        let mut state = spawn(cfg);
        let mut last_count = 0;
        for i in 0..200 {
            tick(&mut state, i as f32 * 10.0, 10.0);
            assert!(state.respawn_count() >= last_count);
            assert!(state.respawn_count() <= 2);
            last_count = state.respawn_count();
        }
        assert_eq!(state.respawn_count(), 2);
        assert!(state.is_dead());
        let respawns = state
            .drain_events()
            .into_iter()
            .filter(|(e, _)| *e == LifecycleEvent::Respawn)
            .count();
        assert_eq!(respawns, 2);
    }

    #[test]
    fn respawn_waits_for_delay() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 100, "enter": { "duration": 10 }, "exit": { "duration": 10 },
                 "lifecycle": { "respawn": true, "respawnDelay": 200 } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        tick(&mut state, 50.0, 50.0);
        tick(&mut state, 120.0, 70.0);
        assert_eq!(state.phase(), Phase::Waiting);
        assert_eq!(state.respawn_count(), 1);
        assert_eq!(state.birth_time(), 320.0);
        tick(&mut state, 300.0, 180.0);
        assert_eq!(state.phase(), Phase::Waiting);
        tick(&mut state, 325.0, 25.0);
        assert_eq!(state.phase(), Phase::Entering);
    }

    #[test]
    fn beat_gate_holds_until_threshold() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 400, "appearOnBeat": 4 }"#);
        let mut state = spawn(cfg);
        tick(&mut state, 100.0, 16.0);
        assert_eq!(state.phase(), Phase::Waiting);
        state.set_beat(3, 120.0);
        tick(&mut state, 200.0, 16.0);
        assert!(state.waiting_for_beat());
        assert_eq!(state.phase(), Phase::Waiting);

        state.set_beat(4, 120.0);
        assert_eq!(state.last_beat_triggered(), Some(4));
        tick(&mut state, 300.0, 16.0);
        assert_eq!(state.phase(), Phase::Entering);
        assert_eq!(state.window().appear, 300.0);
        assert_eq!(state.window().disappear, 700.0);
    }

    #[test]
    fn trigger_exit_and_kill() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 5000 }"#);
        let mut state = spawn(cfg.clone());
        state.trigger_exit();
        tick(&mut state, 0.0, 0.0);
        assert_eq!(state.phase(), Phase::Entering);
        tick(&mut state, 300.0, 16.0);
        state.trigger_exit();
        tick(&mut state, 310.0, 10.0);
        assert_eq!(state.phase(), Phase::Exiting);
        assert_eq!(state.exit_start_time(), 310.0);

        let mut other = spawn(cfg);
        tick(&mut other, 300.0, 16.0);
        other.kill();
        let out = tick(&mut other, 320.0, 16.0);
        assert!(other.is_dead());
        assert!(!out.visible);
        assert_eq!(out.opacity, 0.0);
    }

    #[test]
    fn hooks_fire_and_failures_are_contained() {
        let entered = Arc::new(AtomicU32::new(0));
        let seen = entered.clone();
        let cfg = AnimationConfig::from_json(r#"{ "delayMs": 0, "lifetimeMs": 300 }"#, 1000.0)
            .unwrap()
            .with_hook(LifecycleEvent::EnterStart, move |snap| {
                assert_eq!(snap.phase, Phase::Entering);
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .with_hook(LifecycleEvent::EnterComplete, |_| Err("scene gone".into()))
            .with_hook(LifecycleEvent::ExitStart, |_| panic!("broken hook"));
        let mut state = spawn(Arc::new(cfg));
        for i in 0..60 {
            tick(&mut state, i as f32 * 10.0, 10.0);
        }
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        assert!(state.is_dead());
    }

    #[test]
    fn pop_enter_overshoots_then_settles() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000,
                 "enter": { "type": "pop", "duration": 100, "easing": "linear", "overshoot": 1.5 },
                 "exit": { "easing": "linear" } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        let peak = tick(&mut state, 70.0, 70.0);
        assert!((peak.scale - 1.5).abs() < 1e-5);
        let settling = tick(&mut state, 85.0, 15.0);
        assert!((settling.scale - 1.25).abs() < 1e-4);
    }

    #[test]
    fn grow_and_flash_shapes() {
        let grow = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "grow", "easing": "linear", "duration": 100 } }"#,
        );
        let mut state = spawn(grow);
        tick(&mut state, 0.0, 0.0);
        let half = tick(&mut state, 50.0, 50.0);
        assert!((half.scale - 0.5).abs() < 1e-5);
        assert_eq!(half.opacity, 1.0);

        let flash = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "flash", "easing": "linear", "duration": 100 } }"#,
        );
        let mut state = spawn(flash);
        tick(&mut state, 0.0, 0.0);
        let mid = tick(&mut state, 50.0, 50.0);
        assert!((mid.opacity - 2.0).abs() < 1e-5);
        assert!((mid.emissive - FLASH_EMISSIVE).abs() < 1e-5);
    }

    #[test]
    fn shrink_exit_scales_down() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 300, "exit": { "type": "shrink", "easing": "linear", "duration": 100 } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        tick(&mut state, 250.0, 16.0);
        let out = tick(&mut state, 350.0, 16.0);
        assert!((out.scale - 0.5).abs() < 1e-5);
        assert_eq!(out.opacity, 1.0);
    }

    #[test]
    fn intensity_stretches_pulse() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "none", "duration": 0 },
                 "hold": { "pulse": { "amplitude": 0.1, "frequency": 1 } },
                 "intensityScaling": { "pulseAmplitude": 3 } }"#,
        );
        let mut calm = spawn(cfg.clone());
        let mut wild = spawn(cfg);
        let mut rng = ConstantRandom(0.5);
        calm.update(&FrameTick::new(0.0, 0.0), &mut rng);
        wild.update(&FrameTick::new(0.0, 0.0), &mut rng);
        let a = calm.update(&FrameTick::new(250.0, 16.0), &mut rng);
        let b = wild.update(&FrameTick::new(250.0, 16.0).with_intensity(1.0), &mut rng);
        assert!((a.scale - 1.1).abs() < 1e-4);
        assert!((b.scale - 1.3).abs() < 1e-4);
    }

    #[test]
    fn parameter_curves_track_life() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 1000, "parameterAnimation": { "heat": { "from": 0, "to": 10 } } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        tick(&mut state, 500.0, 16.0);
        assert!((state.parameter("heat").unwrap() - 5.0).abs() < 1e-4);
        assert_eq!(state.parameter("missing"), None);
    }

    #[test]
    fn intensity_scales_target_size() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "none" },
                 "intensityScaling": { "scale": 2.0 } }"#,
        );
        let mut calm = spawn(cfg.clone());
        let mut hot = spawn(cfg);
        let mut rng = ConstantRandom(0.5);
        calm.update(&FrameTick::new(0.0, 0.0), &mut rng);
        hot.update(&FrameTick::new(0.0, 0.0).with_intensity(1.0), &mut rng);
        let a = calm.update(&FrameTick::new(100.0, 16.0), &mut rng);
        let b = hot.update(&FrameTick::new(100.0, 16.0).with_intensity(1.0), &mut rng);
        assert_eq!(hot.phase(), Phase::Holding);
        assert!((a.scale - 1.0).abs() < 1e-6);
        assert!((b.scale - 2.0).abs() < 1e-6, "scale = {}", b.scale);
    }

    #[test]
    fn grow_enter_targets_intensity_scale() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000,
                 "enter": { "type": "grow", "duration": 200, "easing": "linear" },
                 "intensityScaling": { "scale": 2.0 } }"#,
        );
        let mut state = spawn(cfg);
        let mut rng = ConstantRandom(0.5);
        state.update(&FrameTick::new(0.0, 0.0).with_intensity(1.0), &mut rng);
        let mid = state.update(&FrameTick::new(100.0, 16.0).with_intensity(1.0), &mut rng);
        assert_eq!(state.phase(), Phase::Entering);
        assert!((mid.scale - 1.0).abs() < 1e-5, "scale = {}", mid.scale);
        let done = state.update(&FrameTick::new(200.0, 16.0).with_intensity(1.0), &mut rng);
        assert_eq!(state.phase(), Phase::Holding);
        assert!((done.scale - 2.0).abs() < 1e-5);
    }

    #[test]
    fn none_enter_snaps_to_hold() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 1000, "enter": { "type": "none" } }"#);
        let mut state = spawn(cfg);
        state.drain_events();
        let out = tick(&mut state, 0.0, 0.0);
        assert_eq!(state.phase(), Phase::Holding);
        assert_eq!(state.state_start_time(), 0.0);
        assert_eq!(out.opacity, 1.0);
        let events: Vec<_> = state.drain_events().into_iter().map(|(e, _)| e).collect();
        assert_eq!(events, vec![LifecycleEvent::EnterStart, LifecycleEvent::EnterComplete]);
    }

    #[test]
    fn none_exit_snaps_to_dead() {
        let cfg = config(r#"{ "delayMs": 0, "lifetimeMs": 300, "exit": { "type": "none" } }"#);
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        tick(&mut state, 250.0, 16.0);
        assert_eq!(state.phase(), Phase::Holding);
        state.drain_events();

        let out = tick(&mut state, 310.0, 16.0);
        assert!(!out.visible);
        assert!(state.is_dead());
        let events: Vec<_> = state.drain_events().into_iter().map(|(e, _)| e).collect();
        assert_eq!(events, vec![LifecycleEvent::ExitStart, LifecycleEvent::ExitComplete]);
    }

    #[test]
    fn physics_offset_adds_to_drift() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "none" },
                 "hold": { "drift": { "direction": "up", "distance": 0.2 },
                           "physics": { "model": "outward", "speed": 1.0 } } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        let out = tick(&mut state, 500.0, 500.0);
        // 0.1 of drift plus 0.5 of outward travel along the +Y normal
        assert!((out.drift_offset.y - 0.6).abs() < 1e-4, "y = {}", out.drift_offset.y);
    }

    #[test]
    fn velocity_stretch_follows_physics() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "none" },
                 "hold": { "physics": { "model": "outward", "speed": 1.0 },
                           "scale": { "mode": "velocity-stretch", "stretchFactor": 1, "maxStretch": 3 } } }"#,
        );
        let mut state = spawn(cfg);
        tick(&mut state, 0.0, 0.0);
        let out = tick(&mut state, 200.0, 16.0);
        assert!((out.scale_axes.y - 2.0).abs() < 1e-3, "axes = {:?}", out.scale_axes);
        assert!((out.scale_axes.x - 1.0 / 2f32.sqrt()).abs() < 1e-3);
        let axis = out.align_axis.unwrap();
        assert!((axis - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn velocity_stretch_falls_back_to_drift() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "none" },
                 "hold": { "drift": { "direction": "up", "distance": 0.2, "bounce": true },
                           "scale": { "mode": "velocity-stretch", "stretchFactor": 1, "maxStretch": 3 } },
                 "intensityScaling": { "driftSpeed": 2.0 } }"#,
        );
        let mut rng = ConstantRandom(0.5);

        let mut calm = spawn(cfg.clone());
        let a = calm.update(&FrameTick::new(0.0, 0.0), &mut rng);
        assert!((a.scale_axes.y - 1.2).abs() < 1e-4, "axes = {:?}", a.scale_axes);

        let mut hot = spawn(cfg.clone());
        let b = hot.update(&FrameTick::new(0.0, 0.0).with_intensity(1.0), &mut rng);
        assert!((b.scale_axes.y - 1.4).abs() < 1e-4, "axes = {:?}", b.scale_axes);

        // past the far end the drift is heading back down
        let mut state = spawn(cfg);
        let mut out = ElementOutput::default();
        for i in 0..=150 {
            out = state.update(&FrameTick::new(i as f32 * 10.0, 10.0), &mut rng);
        }
        let axis = out.align_axis.unwrap();
        assert!((axis - Vec3::NEG_Y).length() < 1e-4, "axis = {:?}", axis);
    }

    #[test]
    fn opacity_link_dissipates_hold_opacity() {
        let cfg = config(
            r#"{ "delayMs": 0, "lifetimeMs": 5000, "enter": { "type": "none" },
                 "hold": { "opacityLink": { "mode": "dissipate", "duration": 1000 } } }"#,
        );
        let mut state = spawn(cfg);
        let start = tick(&mut state, 0.0, 0.0);
        assert!((start.opacity - 1.0).abs() < 1e-6);
        let mid = tick(&mut state, 500.0, 16.0);
        assert!((mid.opacity - 0.5).abs() < 1e-4, "opacity = {}", mid.opacity);
        let end = tick(&mut state, 1200.0, 16.0);
        assert_eq!(end.opacity, 0.0);
        assert!(end.visible);
    }

    #[test]
    fn scale_smoothing_lags_the_pulse() {
        let pulse = r#""hold": { "pulse": { "amplitude": 0.5, "frequency": 1 } }"#;
        let raw = config(&format!(
            r#"{{ "delayMs": 0, "lifetimeMs": 5000, "enter": {{ "type": "none" }}, {} }}"#,
            pulse
        ));
        let smooth = config(&format!(
            r#"{{ "delayMs": 0, "lifetimeMs": 5000, "enter": {{ "type": "none" }}, {},
                 "procedural": {{ "scaleSmoothing": 0.9 }} }}"#,
            pulse
        ));
        let mut plain = spawn(raw);
        let mut damped = spawn(smooth);
        tick(&mut plain, 0.0, 0.0);
        tick(&mut damped, 0.0, 0.0);
        let a = tick(&mut plain, 20.0, 20.0);
        let b = tick(&mut damped, 20.0, 20.0);
        assert!(a.scale > 1.05);
        assert!(b.scale > 1.0 && b.scale < a.scale - 0.03, "{} vs {}", b.scale, a.scale);

        let again = tick(&mut damped, 20.0, 0.0);
        assert_eq!(again.scale, b.scale);
    }
}
