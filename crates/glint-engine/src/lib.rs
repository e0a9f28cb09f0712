pub mod config;
pub mod core;
pub mod extensions;
pub mod lifecycle;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use config::{
    AnimationConfig, ElementConfig, ElementWindow, EnterType, ExitType, HoldConfig,
    IntensityScaling, RespawnPolicy, ScaledProperty,
};
pub use config::raw::RawAnimationConfig;
pub use crate::core::random::{RandomSource, Rng, SystemRandom};
pub use crate::core::timing::{FrameTick, TimePoint, TimingMode};
pub use lifecycle::{
    AnimationState, ElementHooks, ElementOutput, EphemeralConfig, EphemeralPhase, EphemeralState,
    HookError, LifecycleDriver, LifecycleEvent, Phase, StateSnapshot,
};
pub use renderer::instance::{ElementInstance, InstanceBuffer};
pub use systems::surface::{SampleOptions, SampleSet, SurfacePattern, SurfaceSample, SurfaceSampler};

// Extensions
pub use extensions::{Easing, lerp, ease};
