//! Flash-in / hold / fade-out lifecycle for spark-like elements.

use std::collections::VecDeque;

use crate::config::raw::{RawEphemeral, RawProgression, RawRangeRamp};
use crate::config::ElementConfig;
use crate::core::random::RandomSource;
use crate::core::timing::FrameTick;
use crate::extensions::easing::lerp;

use super::events::{ElementHooks, LifecycleEvent, StateSnapshot};
use super::output::ElementOutput;
use super::state::Phase;

/// Guards against zero-length phases looping forever within one tick.
const MAX_TRANSITIONS_PER_TICK: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EphemeralPhase {
    /// Invisible until the staggered start.
    #[default]
    Stagger,
    FlashIn,
    Hold,
    FadeOut,
    /// Between cycles while `respawn_delay` runs.
    Waiting,
    Dead,
}

impl EphemeralPhase {
    /// Closest phase of the main state machine, for snapshots.
    pub fn as_phase(self) -> Phase {
        match self {
            EphemeralPhase::Stagger | EphemeralPhase::Waiting => Phase::Waiting,
            EphemeralPhase::FlashIn => Phase::Entering,
            EphemeralPhase::Hold => Phase::Holding,
            EphemeralPhase::FadeOut => Phase::Exiting,
            EphemeralPhase::Dead => Phase::Dead,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(
            self,
            EphemeralPhase::FlashIn | EphemeralPhase::Hold | EphemeralPhase::FadeOut
        )
    }
}

/// A `[min, max]` range that itself moves from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRamp {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl RangeRamp {
    pub fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self { start, end }
    }

    fn from_raw(raw: &RawRangeRamp) -> Self {
        Self::new((raw.start[0], raw.start[1]), (raw.end[0], raw.end[1]))
    }

    /// Uniform draw from the range interpolated at `progress`.
    pub fn sample(&self, progress: f32, rng: &mut dyn RandomSource) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        let min = lerp(self.start.0, self.end.0, p);
        let max = lerp(self.start.1, self.end.1, p);
        rng.range(min, max)
    }
}

/// Per-cycle timings re-drawn from ramps as the gesture advances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progression {
    /// Span (ms) over which the ramps go from start to end.
    pub duration: f32,
    pub lifetime: Option<RangeRamp>,
    pub flash_in: Option<RangeRamp>,
    pub fade_out: Option<RangeRamp>,
    pub respawn_delay: Option<RangeRamp>,
}

impl Progression {
    fn from_raw(raw: &RawProgression) -> Self {
        Self {
            duration: raw.duration.unwrap_or(1000.0),
            lifetime: raw.lifetime.as_ref().map(RangeRamp::from_raw),
            flash_in: raw.flash_in.as_ref().map(RangeRamp::from_raw),
            fade_out: raw.fade_out.as_ref().map(RangeRamp::from_raw),
            respawn_delay: raw.respawn_delay.as_ref().map(RangeRamp::from_raw),
        }
    }
}

/// All durations in ms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemeralConfig {
    pub lifetime: f32,
    pub flash_in: f32,
    pub fade_out: f32,
    pub respawn: bool,
    pub respawn_delay: f32,
    pub initial_delay: f32,
    /// Per-index stagger step.
    pub stagger: f32,
    pub base_opacity: f32,
    pub base_emissive: f32,
    /// Emissive reached at the end of the flash.
    pub flash_emissive: f32,
    /// Relative emissive jitter while holding.
    pub hold_flicker: f32,
    pub progression: Option<Progression>,
}

impl Default for EphemeralConfig {
    fn default() -> Self {
        Self {
            lifetime: 300.0,
            flash_in: 50.0,
            fade_out: 100.0,
            respawn: false,
            respawn_delay: 0.0,
            initial_delay: 0.0,
            stagger: 0.0,
            base_opacity: 1.0,
            base_emissive: 1.0,
            flash_emissive: 2.5,
            hold_flicker: 0.1,
            progression: None,
        }
    }
}

impl EphemeralConfig {
    pub(crate) fn from_raw(raw: &RawEphemeral) -> Self {
        let d = Self::default();
        Self {
            lifetime: raw.lifetime.unwrap_or(d.lifetime).max(0.0),
            flash_in: raw.flash_in.unwrap_or(d.flash_in).max(0.0),
            fade_out: raw.fade_out.unwrap_or(d.fade_out).max(0.0),
            respawn: raw.respawn.unwrap_or(d.respawn),
            respawn_delay: raw.respawn_delay.unwrap_or(d.respawn_delay).max(0.0),
            initial_delay: raw.initial_delay.unwrap_or(d.initial_delay).max(0.0),
            stagger: raw.stagger.unwrap_or(d.stagger).max(0.0),
            base_opacity: raw.base_opacity.unwrap_or(d.base_opacity),
            base_emissive: raw.base_emissive.unwrap_or(d.base_emissive),
            flash_emissive: raw.flash_emissive.unwrap_or(d.flash_emissive),
            hold_flicker: raw.hold_flicker.unwrap_or(d.hold_flicker),
            progression: raw.progression.as_ref().map(Progression::from_raw),
        }
    }

    pub fn with_timing(mut self, flash_in: f32, lifetime: f32, fade_out: f32) -> Self {
        self.flash_in = flash_in;
        self.lifetime = lifetime;
        self.fade_out = fade_out;
        self
    }

    pub fn with_respawn(mut self, respawn_delay: f32) -> Self {
        self.respawn = true;
        self.respawn_delay = respawn_delay;
        self
    }

    pub fn with_stagger(mut self, initial_delay: f32, stagger: f32) -> Self {
        self.initial_delay = initial_delay;
        self.stagger = stagger;
        self
    }

    pub fn with_progression(mut self, progression: Progression) -> Self {
        self.progression = Some(progression);
        self
    }
}

/// Timings in force for the current cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CycleTimings {
    lifetime: f32,
    flash_in: f32,
    fade_out: f32,
    respawn_delay: f32,
}

/// One spark-like element.
#[derive(Debug, Clone)]
pub struct EphemeralState {
    config: EphemeralConfig,
    index: usize,
    scale: f32,
    hooks: ElementHooks,
    phase: EphemeralPhase,
    timings: CycleTimings,
    spawn_time: f32,
    stagger_offset: f32,
    /// Start of the current cycle (absolute ms).
    birth_time: f32,
    /// Cycle age at which the fade began.
    fade_start: f32,
    /// Absolute time the waiting period ends.
    wait_until: f32,
    respawn_count: u32,
    opacity: f32,
    emissive: f32,
    killed: bool,
    last_time: f32,
    events: VecDeque<(LifecycleEvent, StateSnapshot)>,
}

impl EphemeralState {
    pub fn new(
        config: EphemeralConfig,
        element: &ElementConfig,
        spawn_time: f32,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let stagger_offset = config.initial_delay + element.index as f32 * config.stagger;
        let mut state = Self {
            config,
            index: element.index,
            scale: element.scale,
            hooks: ElementHooks::new(),
            phase: EphemeralPhase::Stagger,
            timings: CycleTimings {
                lifetime: config.lifetime,
                flash_in: config.flash_in,
                fade_out: config.fade_out,
                respawn_delay: config.respawn_delay,
            },
            spawn_time,
            stagger_offset,
            birth_time: spawn_time + stagger_offset,
            fade_start: 0.0,
            wait_until: 0.0,
            respawn_count: 0,
            opacity: 0.0,
            emissive: 0.0,
            killed: false,
            last_time: spawn_time,
            events: VecDeque::new(),
        };
        state.timings = state.draw_timings(spawn_time, rng);
        state.emit(LifecycleEvent::Spawn);
        state
    }

    pub fn with_hooks(mut self, hooks: ElementHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn phase(&self) -> EphemeralPhase {
        self.phase
    }

    pub fn respawn_count(&self) -> u32 {
        self.respawn_count
    }

    pub fn stagger_offset(&self) -> f32 {
        self.stagger_offset
    }

    /// Dead with no respawn to come.
    pub fn is_finished(&self) -> bool {
        self.phase == EphemeralPhase::Dead && (self.killed || !self.config.respawn)
    }

    /// Start fading now, if currently visible and not already fading.
    pub fn trigger_exit(&mut self, time: f32) {
        if matches!(self.phase, EphemeralPhase::FlashIn | EphemeralPhase::Hold) {
            self.fade_start = (time - self.birth_time).max(0.0);
            self.set_phase(EphemeralPhase::FadeOut);
            self.emit(LifecycleEvent::ExitStart);
        }
    }

    pub fn kill(&mut self) {
        self.killed = true;
        self.phase = EphemeralPhase::Dead;
        self.opacity = 0.0;
        self.emissive = 0.0;
    }

    pub fn drain_events(&mut self) -> Vec<(LifecycleEvent, StateSnapshot)> {
        self.events.drain(..).collect()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            index: self.index,
            phase: self.phase.as_phase(),
            progress: self.phase_progress(self.last_time),
            opacity: self.opacity,
            scale: self.scale,
            emissive: self.emissive,
            respawn_count: self.respawn_count,
            time: self.last_time,
        }
    }

    pub fn update(&mut self, tick: &FrameTick, rng: &mut dyn RandomSource) -> ElementOutput {
        self.last_time = tick.time;
        let mut resample = false;

        for _ in 0..MAX_TRANSITIONS_PER_TICK {
            let age = tick.time - self.birth_time;
            match self.phase {
                EphemeralPhase::Stagger => {
                    if tick.time - self.spawn_time < self.stagger_offset {
                        break;
                    }
                    self.begin_cycle(self.spawn_time + self.stagger_offset);
                }
                EphemeralPhase::FlashIn => {
                    let flash_in = self.timings.flash_in;
                    if age >= flash_in {
                        self.emissive = self.config.base_emissive;
                        self.opacity = self.config.base_opacity;
                        self.set_phase(EphemeralPhase::Hold);
                        self.emit(LifecycleEvent::EnterComplete);
                        continue;
                    }
                    let p = (age / flash_in).clamp(0.0, 1.0);
                    let e = p * p;
                    self.opacity = self.config.base_opacity * e;
                    self.emissive = self.config.flash_emissive * e;
                    break;
                }
                EphemeralPhase::Hold => {
                    let fade_at = self.timings.lifetime - self.timings.fade_out;
                    if age >= fade_at {
                        self.fade_start = fade_at.max(self.timings.flash_in);
                        self.set_phase(EphemeralPhase::FadeOut);
                        self.emit(LifecycleEvent::ExitStart);
                        continue;
                    }
                    self.opacity = self.config.base_opacity;
                    if tick.delta > 0.0 {
                        self.emissive =
                            self.config.base_emissive * (1.0 + rng.signed() * self.config.hold_flicker);
                    }
                    break;
                }
                EphemeralPhase::FadeOut => {
                    let fade_out = self.timings.fade_out;
                    let elapsed = age - self.fade_start;
                    if elapsed >= fade_out {
                        self.opacity = 0.0;
                        self.emissive = 0.0;
                        self.set_phase(EphemeralPhase::Dead);
                        self.emit(LifecycleEvent::ExitComplete);
                        continue;
                    }
                    let p = (elapsed / fade_out).clamp(0.0, 1.0);
                    let e = 1.0 - (1.0 - p) * (1.0 - p);
                    self.opacity = self.config.base_opacity * (1.0 - e);
                    self.emissive = self.config.base_emissive * (1.0 - e);
                    break;
                }
                EphemeralPhase::Dead => {
                    if self.killed || !self.config.respawn {
                        break;
                    }
                    let died_at = self.birth_time + self.fade_start + self.timings.fade_out;
                    self.respawn_count += 1;
                    self.timings = self.draw_timings(tick.time, rng);
                    self.emit(LifecycleEvent::Respawn);
                    if self.timings.respawn_delay > 0.0 {
                        self.wait_until = died_at + self.timings.respawn_delay;
                        self.set_phase(EphemeralPhase::Waiting);
                        resample = true;
                    } else {
                        self.begin_cycle(died_at);
                    }
                }
                EphemeralPhase::Waiting => {
                    if tick.time < self.wait_until {
                        break;
                    }
                    self.begin_cycle(self.wait_until);
                }
            }
        }

        ElementOutput {
            visible: self.phase.is_visible(),
            opacity: self.opacity.max(0.0),
            scale: self.scale,
            emissive: self.emissive.max(0.0),
            fade_progress: match self.phase {
                EphemeralPhase::FadeOut => self.phase_progress(tick.time),
                EphemeralPhase::Dead => 1.0,
                _ => 0.0,
            },
            resample,
            ..ElementOutput::default()
        }
    }

    fn begin_cycle(&mut self, at: f32) {
        self.birth_time = at;
        self.fade_start = 0.0;
        self.opacity = 0.0;
        self.emissive = 0.0;
        self.set_phase(EphemeralPhase::FlashIn);
        self.emit(LifecycleEvent::EnterStart);
    }

    fn draw_timings(&self, time: f32, rng: &mut dyn RandomSource) -> CycleTimings {
        let mut timings = CycleTimings {
            lifetime: self.config.lifetime,
            flash_in: self.config.flash_in,
            fade_out: self.config.fade_out,
            respawn_delay: self.config.respawn_delay,
        };
        let Some(progression) = &self.config.progression else {
            return timings;
        };
        let progress = if progression.duration > 0.0 {
            (time - self.spawn_time) / progression.duration
        } else {
            1.0
        };
        let draws = [
            (progression.lifetime, &mut timings.lifetime),
            (progression.flash_in, &mut timings.flash_in),
            (progression.fade_out, &mut timings.fade_out),
            (progression.respawn_delay, &mut timings.respawn_delay),
        ];
        for (ramp, slot) in draws {
            if let Some(ramp) = ramp {
                *slot = ramp.sample(progress, rng).max(0.0);
            }
        }
        timings
    }

    fn phase_progress(&self, time: f32) -> f32 {
        let age = time - self.birth_time;
        let p = match self.phase {
            EphemeralPhase::FlashIn if self.timings.flash_in > 0.0 => age / self.timings.flash_in,
            EphemeralPhase::Hold => {
                let span = self.timings.lifetime - self.timings.fade_out - self.timings.flash_in;
                if span > 0.0 {
                    (age - self.timings.flash_in) / span
                } else {
                    1.0
                }
            }
            EphemeralPhase::FadeOut if self.timings.fade_out > 0.0 => {
                (age - self.fade_start) / self.timings.fade_out
            }
            EphemeralPhase::Dead => 1.0,
            _ => 0.0,
        };
        p.clamp(0.0, 1.0)
    }

    fn set_phase(&mut self, phase: EphemeralPhase) {
        log::debug!("ephemeral {}: {:?} -> {:?}", self.index, self.phase, phase);
        self.phase = phase;
    }

    fn emit(&mut self, event: LifecycleEvent) {
        let snapshot = self.snapshot();
        self.hooks.fire(event, &snapshot);
        self.events.push_back((event, snapshot));
    }
}
