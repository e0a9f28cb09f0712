pub mod hold;
pub mod surface;
