//! Hold-phase animation kernels.
//!
//! Each kernel computes one tick of a continuous modifier from its config and
//! the time spent holding. Most are pure; drift, continuous rotation and the
//! random flicker carry a small per-element state the caller owns.

mod drift;
mod emissive;
mod flicker;
mod opacity;
mod physics;
mod pulse;
mod rotate;
mod scale;

pub use drift::{drift, DriftConfig, DriftDirection, DriftState};
pub use emissive::{emissive, EmissiveConfig, EmissiveWave};
pub use flicker::{flicker, FlickerConfig, FlickerMemory, FlickerPattern};
pub use opacity::{opacity_link, OpacityLinkConfig, OpacityLinkMode};
pub use physics::{physics_drift, physics_seed, physics_velocity, PhysicsDriftConfig, PhysicsModel};
pub use pulse::{pulse, PulseConfig};
pub use rotate::{rotate, RotateConfig, RotateMode};
pub use scale::{non_uniform_scale, NonUniformScaleConfig, ScaleMode, ScaleOutput};
