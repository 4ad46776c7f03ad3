//! Passive page scanner

pub mod dom;
pub mod scanner;
#[cfg(not(target_arch = "wasm32"))]
pub mod schedule;

pub use dom::*;
pub use scanner::*;
#[cfg(not(target_arch = "wasm32"))]
pub use schedule::*;
