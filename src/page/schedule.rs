//! Repeating scan task for native hosts
//!
//! Scans once immediately, then every `period`. The task belongs to its
//! `ScanTask` handle and stops when the handle is dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::page::{Page, PageScanner};

#[derive(Debug)]
pub struct ScanTask {
    handle: JoinHandle<()>,
}

impl ScanTask {
    /// Spawn on the current tokio runtime
    pub fn spawn<P>(scanner: Arc<PageScanner>, mut page: P, period: Duration) -> Self
    where
        P: Page + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let report = scanner.scan_and_apply(&mut page);
                if !report.added.is_empty() {
                    log::debug!("vibe pass added {:?}", report.added);
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the task now
    pub fn cancel(self) {}
}

impl Drop for ScanTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
