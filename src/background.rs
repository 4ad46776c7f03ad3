//! Extension background worker
//!
//! Logs the install notice and keeps the most recent connection port in a
//! single slot. A new connection replaces the old one; nothing is queued.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub const INSTALL_NOTICE: &str = "[VibeSync] installed – MU→YO→O ready";

/// Last writer wins
#[derive(Debug, Clone)]
pub struct LatestConnection<P> {
    slot: Option<P>,
}

impl<P> Default for LatestConnection<P> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<P> LatestConnection<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `port`, returning the one it replaced
    pub fn replace(&mut self, port: P) -> Option<P> {
        self.slot.replace(port)
    }

    pub fn get(&self) -> Option<&P> {
        self.slot.as_ref()
    }

    pub fn take(&mut self) -> Option<P> {
        self.slot.take()
    }

    pub fn is_connected(&self) -> bool {
        self.slot.is_some()
    }
}

#[derive(Debug, Default)]
pub struct BackgroundWorker<P> {
    connection: LatestConnection<P>,
}

impl<P> BackgroundWorker<P> {
    pub fn new() -> Self {
        Self {
            connection: LatestConnection::new(),
        }
    }

    pub fn on_installed(&self) {
        log::info!("{}", INSTALL_NOTICE);
    }

    pub fn on_connect(&mut self, port: P) -> Option<P> {
        self.connection.replace(port)
    }

    pub fn latest(&self) -> Option<&P> {
        self.connection.get()
    }
}

// =============================================================================
// chrome.runtime glue
// =============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onInstalled"], js_name = addListener)]
    fn add_installed_listener(callback: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onInstalled"], js_name = removeListener)]
    fn remove_installed_listener(callback: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onConnect"], js_name = addListener)]
    fn add_connect_listener(callback: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onConnect"], js_name = removeListener)]
    fn remove_connect_listener(callback: &js_sys::Function);
}

/// Service worker registration. Keep it alive for the worker's lifetime;
/// dropping it unregisters both listeners.
#[wasm_bindgen]
pub struct VibeSyncBackground {
    worker: Rc<RefCell<BackgroundWorker<JsValue>>>,
    installed: Closure<dyn FnMut()>,
    connected: Closure<dyn FnMut(JsValue)>,
}

#[wasm_bindgen]
impl VibeSyncBackground {
    pub fn register() -> VibeSyncBackground {
        let worker = Rc::new(RefCell::new(BackgroundWorker::new()));

        let on_installed = worker.clone();
        let installed = Closure::<dyn FnMut()>::new(move || {
            on_installed.borrow().on_installed();
        });
        let on_connect = worker.clone();
        let connected = Closure::<dyn FnMut(JsValue)>::new(move |port: JsValue| {
            on_connect.borrow_mut().on_connect(port);
        });

        add_installed_listener(installed.as_ref().unchecked_ref());
        add_connect_listener(connected.as_ref().unchecked_ref());

        VibeSyncBackground {
            worker,
            installed,
            connected,
        }
    }

    /// Most recent connection port, or undefined
    #[wasm_bindgen(getter)]
    pub fn port(&self) -> JsValue {
        self.worker
            .borrow()
            .latest()
            .cloned()
            .unwrap_or(JsValue::UNDEFINED)
    }
}

impl Drop for VibeSyncBackground {
    fn drop(&mut self) {
        remove_installed_listener(self.installed.as_ref().unchecked_ref());
        remove_connect_listener(self.connected.as_ref().unchecked_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_until_first_connect() {
        let worker: BackgroundWorker<u32> = BackgroundWorker::new();
        assert!(worker.latest().is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let mut worker = BackgroundWorker::new();

        assert_eq!(worker.on_connect("tab-1"), None);
        assert_eq!(worker.on_connect("tab-2"), Some("tab-1"));
        assert_eq!(worker.on_connect("tab-3"), Some("tab-2"));
        assert_eq!(worker.latest(), Some(&"tab-3"));
    }

    #[test]
    fn test_install_changes_nothing() {
        let mut worker = BackgroundWorker::new();
        worker.on_connect(7u8);
        worker.on_installed();
        assert_eq!(worker.latest(), Some(&7));
    }

    #[test]
    fn test_slot_take() {
        let mut slot = LatestConnection::new();
        slot.replace(1);
        assert!(slot.is_connected());
        assert_eq!(slot.take(), Some(1));
        assert!(!slot.is_connected());
    }
}
