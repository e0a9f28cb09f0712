//! Lifecycle events, state snapshots, and user hooks.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::state::Phase;

/// Transitions an element announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Spawn,
    EnterStart,
    EnterComplete,
    ExitStart,
    ExitComplete,
    Respawn,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Spawn,
        LifecycleEvent::EnterStart,
        LifecycleEvent::EnterComplete,
        LifecycleEvent::ExitStart,
        LifecycleEvent::ExitComplete,
        LifecycleEvent::Respawn,
    ];

    /// Hook name as it appears in host configuration (`onSpawn`, ...).
    pub fn hook_name(self) -> &'static str {
        match self {
            LifecycleEvent::Spawn => "onSpawn",
            LifecycleEvent::EnterStart => "onEnterStart",
            LifecycleEvent::EnterComplete => "onEnterComplete",
            LifecycleEvent::ExitStart => "onExitStart",
            LifecycleEvent::ExitComplete => "onExitComplete",
            LifecycleEvent::Respawn => "onRespawn",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Read-only view of an element handed to hooks and queued with events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSnapshot {
    pub index: usize,
    pub phase: Phase,
    /// Progress within the current phase.
    pub progress: f32,
    pub opacity: f32,
    pub scale: f32,
    pub emissive: f32,
    pub respawn_count: u32,
    /// Absolute time (ms) of the tick that produced this snapshot.
    pub time: f32,
}

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

pub type Hook = Arc<dyn Fn(&StateSnapshot) -> Result<(), HookError> + Send + Sync>;

/// One optional callback per [`LifecycleEvent`].
#[derive(Clone, Default)]
pub struct ElementHooks {
    slots: [Option<Hook>; 6],
}

impl ElementHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<F>(&mut self, event: LifecycleEvent, hook: F)
    where
        F: Fn(&StateSnapshot) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.slots[event.slot()] = Some(Arc::new(hook));
    }

    pub fn clear(&mut self, event: LifecycleEvent) {
        self.slots[event.slot()] = None;
    }

    pub fn has(&self, event: LifecycleEvent) -> bool {
        self.slots[event.slot()].is_some()
    }

    /// Run the hook for `event`, if any. Errors and panics are logged and
    /// swallowed so a faulty callback never stalls the element.
    pub fn fire(&self, event: LifecycleEvent, snapshot: &StateSnapshot) {
        let Some(hook) = &self.slots[event.slot()] else {
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| hook(snapshot))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::warn!(
                    "{} hook failed for element {}: {}",
                    event.hook_name(),
                    snapshot.index,
                    err
                );
            }
            Err(_) => {
                log::error!(
                    "{} hook panicked for element {}",
                    event.hook_name(),
                    snapshot.index
                );
            }
        }
    }
}

impl fmt::Debug for ElementHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = LifecycleEvent::ALL
            .iter()
            .filter(|e| self.has(**e))
            .map(|e| e.hook_name())
            .collect();
        f.debug_struct("ElementHooks").field("set", &set).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn snapshot() -> StateSnapshot {
        StateSnapshot {
            index: 3,
            phase: Phase::Entering,
            progress: 0.0,
            opacity: 0.0,
            scale: 1.0,
            emissive: 1.0,
            respawn_count: 0,
            time: 0.0,
        }
    }

    #[test]
    fn fires_only_the_matching_hook() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let mut hooks = ElementHooks::new();
        hooks.set(LifecycleEvent::EnterStart, move |s| {
            assert_eq!(s.index, 3);
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        hooks.fire(LifecycleEvent::EnterStart, &snapshot());
        hooks.fire(LifecycleEvent::ExitStart, &snapshot());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn errors_and_panics_are_contained() {
        let mut hooks = ElementHooks::new();
        hooks.set(LifecycleEvent::Spawn, |_| Err("no scene".into()));
        hooks.set(LifecycleEvent::Respawn, |_| panic!("boom"));
        hooks.fire(LifecycleEvent::Spawn, &snapshot());
        hooks.fire(LifecycleEvent::Respawn, &snapshot());
    }

    #[test]
    fn debug_lists_set_hooks() {
        let mut hooks = ElementHooks::new();
        hooks.set(LifecycleEvent::ExitComplete, |_| Ok(()));
        assert!(format!("{:?}", hooks).contains("onExitComplete"));
        hooks.clear(LifecycleEvent::ExitComplete);
        assert!(!hooks.has(LifecycleEvent::ExitComplete));
    }
}
