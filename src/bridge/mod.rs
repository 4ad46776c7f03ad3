//! Scan bridge: evaluator seam, IPC router and the privileged `scan-text` handler

pub mod evaluator;
pub mod ipc;
pub mod privileged;

pub use evaluator::*;
pub use ipc::*;
pub use privileged::*;
