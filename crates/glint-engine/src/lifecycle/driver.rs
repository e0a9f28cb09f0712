use std::sync::Arc;

use glam::Vec3;

use crate::config::AnimationConfig;
use crate::core::random::RandomSource;
use crate::core::timing::FrameTick;

use super::ephemeral::EphemeralState;
use super::events::{LifecycleEvent, StateSnapshot};
use super::output::ElementOutput;
use super::state::AnimationState;

/// The lifecycle driving one element, chosen once at spawn.
#[derive(Debug, Clone)]
pub enum LifecycleDriver {
    Animated(AnimationState),
    Ephemeral(EphemeralState),
}

impl LifecycleDriver {
    /// Spawn element `index`: ephemeral when the config carries an
    /// `ephemeral` section, the full state machine otherwise.
    pub fn spawn(
        config: Arc<AnimationConfig>,
        index: usize,
        normal: Vec3,
        spawn_time: f32,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let ephemeral = config.ephemeral;
        match ephemeral {
            Some(ephemeral) => {
                let element = config.create_element_config(index, rng);
                let hooks = config.hooks.clone();
                LifecycleDriver::Ephemeral(
                    EphemeralState::new(ephemeral, &element, spawn_time, rng).with_hooks(hooks),
                )
            }
            None => LifecycleDriver::Animated(AnimationState::spawn(
                config, index, normal, spawn_time, rng,
            )),
        }
    }

    pub fn update(&mut self, tick: &FrameTick, rng: &mut dyn RandomSource) -> ElementOutput {
        match self {
            LifecycleDriver::Animated(state) => state.update(tick, rng),
            LifecycleDriver::Ephemeral(state) => state.update(tick, rng),
        }
    }

    /// Nothing further will happen; the element can be dropped.
    pub fn is_finished(&self) -> bool {
        match self {
            LifecycleDriver::Animated(state) => state.is_dead(),
            LifecycleDriver::Ephemeral(state) => state.is_finished(),
        }
    }

    /// Begin animating out. Ephemeral elements fade from `time`.
    pub fn trigger_exit(&mut self, time: f32) {
        match self {
            LifecycleDriver::Animated(state) => state.trigger_exit(),
            LifecycleDriver::Ephemeral(state) => state.trigger_exit(time),
        }
    }

    pub fn kill(&mut self) {
        match self {
            LifecycleDriver::Animated(state) => state.kill(),
            LifecycleDriver::Ephemeral(state) => state.kill(),
        }
    }

    /// Forward a beat. Ephemeral elements ignore beats.
    pub fn set_beat(&mut self, beat: u32, bpm: f32) {
        if let LifecycleDriver::Animated(state) = self {
            state.set_beat(beat, bpm);
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        match self {
            LifecycleDriver::Animated(state) => state.snapshot(),
            LifecycleDriver::Ephemeral(state) => state.snapshot(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<(LifecycleEvent, StateSnapshot)> {
        match self {
            LifecycleDriver::Animated(state) => state.drain_events(),
            LifecycleDriver::Ephemeral(state) => state.drain_events(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::Rng;
    use crate::lifecycle::state::Phase;

    fn drive(driver: &mut LifecycleDriver, until: f32) {
        let mut rng = Rng::new(4);
        let mut t = 0.0;
        while t <= until && !driver.is_finished() {
            driver.update(&FrameTick::new(t, 10.0), &mut rng);
            t += 10.0;
        }
    }

    #[test]
    fn selects_lifecycle_from_config() {
        let mut rng = Rng::new(1);
        let plain = Arc::new(AnimationConfig::default());
        let spark = Arc::new(
            AnimationConfig::from_json(r#"{ "ephemeral": { "lifetime": 200 } }"#, 1000.0).unwrap(),
        );
        assert!(matches!(
            LifecycleDriver::spawn(plain, 0, Vec3::Y, 0.0, &mut rng),
            LifecycleDriver::Animated(_)
        ));
        assert!(matches!(
            LifecycleDriver::spawn(spark, 0, Vec3::Y, 0.0, &mut rng),
            LifecycleDriver::Ephemeral(_)
        ));
    }

    #[test]
    fn both_lifecycles_finish() {
        let mut rng = Rng::new(1);
        let plain = Arc::new(
            AnimationConfig::from_json(r#"{ "delayMs": 0, "lifetimeMs": 300 }"#, 1000.0).unwrap(),
        );
        let mut animated = LifecycleDriver::spawn(plain, 0, Vec3::Y, 0.0, &mut rng);
        drive(&mut animated, 2000.0);
        assert!(animated.is_finished());
        assert_eq!(animated.snapshot().phase, Phase::Dead);

        let spark = Arc::new(AnimationConfig::default().with_ephemeral(Default::default()));
        let mut ephemeral = LifecycleDriver::spawn(spark, 0, Vec3::Y, 0.0, &mut rng);
        drive(&mut ephemeral, 2000.0);
        assert!(ephemeral.is_finished());
    }

    #[test]
    fn kill_finishes_either_kind() {
        let mut rng = Rng::new(1);
        let respawning = Arc::new(
            AnimationConfig::from_json(r#"{ "ephemeral": { "respawn": true } }"#, 1000.0).unwrap(),
        );
        let mut driver = LifecycleDriver::spawn(respawning, 0, Vec3::Y, 0.0, &mut rng);
        driver.update(&FrameTick::new(20.0, 16.0), &mut rng);
        driver.kill();
        assert!(driver.is_finished());
    }

    #[test]
    fn hooks_reach_ephemeral_elements() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let cfg = AnimationConfig::default()
            .with_ephemeral(Default::default())
            .with_hook(LifecycleEvent::ExitComplete, move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let mut driver = LifecycleDriver::spawn(Arc::new(cfg), 0, Vec3::Y, 0.0, &mut Rng::new(2));
        drive(&mut driver, 1000.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        driver.set_beat(1, 120.0);
        driver.trigger_exit(1000.0);
    }
}
