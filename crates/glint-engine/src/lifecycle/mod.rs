//! Per-element lifecycles: the full enter/hold/exit state machine, the
//! lighter ephemeral cycle, and the driver that picks between them.

pub mod driver;
pub mod ephemeral;
pub mod events;
mod output;
pub mod state;

pub use driver::LifecycleDriver;
pub use ephemeral::{EphemeralConfig, EphemeralPhase, EphemeralState, Progression, RangeRamp};
pub use events::{ElementHooks, Hook, HookError, LifecycleEvent, StateSnapshot};
pub use output::ElementOutput;
pub use state::{AnimationState, Phase, BASE_EMISSIVE, FLASH_EMISSIVE};
