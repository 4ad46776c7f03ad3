//! Browser content script: DOM page + `setInterval` scan loop
//!
//! ```javascript,ignore
//! const sync = VibeSync.start();   // scans now, then every 5s
//! sync.free();                     // clears the interval
//! ```

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use crate::config::{ScannerConfig, WeweConfig};
use crate::page::{Page, PageScanner};

/// The live document: reads `body.innerText`, tags `documentElement`
#[derive(Debug, Clone)]
pub struct DomPage {
    document: Document,
}

impl DomPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }
}

impl Page for DomPage {
    fn visible_text(&self) -> String {
        self.document
            .body()
            .map(|body| body.inner_text())
            .unwrap_or_default()
    }

    fn add_class(&mut self, class: &str) -> bool {
        let Some(root) = self.document.document_element() else {
            return false;
        };
        let classes = root.class_list();
        if classes.contains(class) {
            return false;
        }
        classes.add_1(class).is_ok()
    }
}

/// Owns the interval; clearing happens on drop
struct IntervalHandle {
    window: Window,
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.id);
    }
}

#[wasm_bindgen]
pub struct VibeSync {
    scanner: Rc<PageScanner>,
    page: DomPage,
    interval: Option<IntervalHandle>,
}

#[wasm_bindgen]
impl VibeSync {
    /// Start with the default patterns and period
    pub fn start() -> Result<VibeSync, JsValue> {
        Self::start_with(&ScannerConfig::default())
    }

    /// Start from a `{ scanner: { interval_ms, patterns } }` config object
    #[wasm_bindgen(js_name = startWithConfig)]
    pub fn start_with_config(config: JsValue) -> Result<VibeSync, JsValue> {
        let config = WeweConfig::from_js(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::start_with(&config.scanner)
    }

    /// Run one pass right now; returns the classes it added
    #[wasm_bindgen(js_name = scanNow)]
    pub fn scan_now(&mut self) -> Vec<String> {
        self.scanner.scan_and_apply(&mut self.page).added
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Clear the interval without waiting for `free()`
    pub fn stop(&mut self) {
        self.interval = None;
    }
}

impl VibeSync {
    pub fn start_with(config: &ScannerConfig) -> Result<VibeSync, JsValue> {
        let timeout = config
            .timer_timeout()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let scanner = PageScanner::from_config(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let scanner = Rc::new(scanner);
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let page = DomPage::current().ok_or_else(|| JsValue::from_str("No document"))?;

        let mut sync = VibeSync {
            scanner: scanner.clone(),
            page: page.clone(),
            interval: None,
        };
        sync.scan_now();

        let mut tick_page = page;
        let callback = Closure::<dyn FnMut()>::new(move || {
            scanner.scan_and_apply(&mut tick_page);
        });
        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            timeout,
        )?;
        sync.interval = Some(IntervalHandle {
            window,
            id,
            _callback: callback,
        });
        Ok(sync)
    }
}
