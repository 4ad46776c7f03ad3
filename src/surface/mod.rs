//! Isolated surface exposure

pub mod capability;
pub mod sigil_api;
pub mod wasm;

pub use capability::*;
pub use sigil_api::*;
pub use wasm::*;
