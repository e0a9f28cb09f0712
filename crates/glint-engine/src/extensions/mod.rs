// extensions/mod.rs
//
// Leaf utilities shared by configuration and lifecycles.
// No dependencies on element state, just math.

pub mod easing;

pub use easing::{Easing, lerp, ease};
