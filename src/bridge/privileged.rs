//! PrivilegedBridge: the only caller of the Evaluator
//!
//! Registered on `scan-text`. Forwards the payload as-is and hands back
//! whatever the evaluator returns, failures included.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::bridge::{Evaluator, IpcHandler, IpcMain, IpcReply};

/// Channel the scan capability talks to
pub const SCAN_TEXT_CHANNEL: &str = "scan-text";

pub struct PrivilegedBridge {
    evaluator: Arc<dyn Evaluator>,
    invocations: AtomicU64,
}

impl PrivilegedBridge {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            evaluator,
            invocations: AtomicU64::new(0),
        }
    }

    /// Register on `scan-text`
    pub fn install(self: Arc<Self>, ipc: &mut IpcMain) {
        ipc.handle(SCAN_TEXT_CHANNEL, self);
    }

    /// Evaluator calls made so far
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl IpcHandler for PrivilegedBridge {
    async fn handle(&self, payload: String) -> IpcReply {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        Ok(self.evaluator.evaluate(&payload).await?)
    }
}
