pub mod shield;
pub mod vibe;

pub use shield::*;
pub use vibe::*;
