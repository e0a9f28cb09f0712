pub mod instance;

pub use instance::{ElementInstance, InstanceBuffer};
