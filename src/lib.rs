//! WeweCore: Sigil Scan Bridge + VibeSync Page Scanner
//!
//! A Rust/WASM implementation of the WE-WE-WE launcher and browser extension.
//!
//! # Architecture
//!
//! ## Scan Pipeline
//! - `bridge/` - Evaluator seam, host-side IPC router, PrivilegedBridge (`scan-text`)
//! - `surface/` - Frozen capability table and the `sigil.scan()` capability
//! - `window/` - WindowHost lifecycle (ready / activate / closed)
//!
//! ## Evaluator
//! - `sigil/vibe.rs` - VibeSensor: offline text metrics (glitch score, comfort index)
//! - `sigil/shield.rs` - SecuritySigil: the default Evaluator implementation
//! - `adapters.rs` - JSON skill wrappers around both
//!
//! ## Extension
//! - `page/` - Passive page scanner, repeating scan tasks, DOM class list
//! - `background.rs` - Background worker with a last-writer-wins connection slot
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { SigilHost, VibeSync } from 'wewecore';
//!
//! await init();
//!
//! // Content script: scan now, then every 5s until dropped
//! const sync = VibeSync.start();
//!
//! // Surface: installs a frozen `sigil` object, the only capability
//! const host = new SigilHost();
//! host.openSurface();
//! const verdict = await sigil.scan("lok lok lok lok lok lok lok");
//! console.log(verdict.status); // "locked"
//! ```

pub mod adapters;
pub mod background;
pub mod bridge;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod logging;
pub mod page;
pub mod sigil;
pub mod surface;
pub mod window;

pub use adapters::*;
pub use background::*;
pub use bridge::*;
pub use config::*;
pub use page::*;
pub use sigil::*;
pub use surface::*;
pub use window::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    logging::init();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("wewecore v{}", env!("CARGO_PKG_VERSION"))
}
