//! WindowHost: surface lifecycle
//!
//! ```text
//! NonExistent --ready / activate(0 open)--> Created --user close--> Closed
//! ```
//!
//! Every new window gets the fixed entry document and a freshly built
//! capability world. When the last window closes the host quits, except on
//! macOS where apps stay alive until explicitly quit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::bridge::IpcRenderer;
use crate::config::WindowConfig;
use crate::surface::{ExposedWorld, SigilApi};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn quits_on_last_close(self) -> bool {
        self != Platform::MacOs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    Created,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Ready,
    Activate,
    Closed(WindowId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Opened(WindowId),
    Quit,
    None,
}

/// Whatever actually draws windows
pub trait WindowBackend {
    /// Open a window loading `options.entry` with `world` as its only host API
    fn open(&mut self, id: WindowId, options: &WindowConfig, world: ExposedWorld);

    /// Terminate the host process
    fn quit(&mut self);
}

// =============================================================================
// WindowHost
// =============================================================================

pub struct WindowHost<B: WindowBackend> {
    backend: B,
    options: WindowConfig,
    platform: Platform,
    renderer: IpcRenderer,
    /// Open windows only; closed ids are dropped
    open: BTreeSet<WindowId>,
    next_id: u64,
    running: bool,
}

impl<B: WindowBackend> WindowHost<B> {
    pub fn new(backend: B, options: WindowConfig, platform: Platform, renderer: IpcRenderer) -> Self {
        Self {
            backend,
            options,
            platform,
            renderer,
            open: BTreeSet::new(),
            next_id: 1,
            running: true,
        }
    }

    pub fn handle(&mut self, event: HostEvent) -> HostAction {
        if !self.running {
            return HostAction::None;
        }
        match event {
            HostEvent::Ready => HostAction::Opened(self.on_ready()),
            HostEvent::Activate => self
                .on_activate()
                .map_or(HostAction::None, HostAction::Opened),
            HostEvent::Closed(id) => {
                self.on_closed(id);
                if self.running {
                    HostAction::None
                } else {
                    HostAction::Quit
                }
            }
        }
    }

    /// Process ready: always opens one window
    pub fn on_ready(&mut self) -> WindowId {
        self.create_window()
    }

    /// Reopen only when nothing is open
    pub fn on_activate(&mut self) -> Option<WindowId> {
        (self.open_count() == 0).then(|| self.create_window())
    }

    /// Mark `id` closed. Returns false for unknown or already-closed windows.
    pub fn on_closed(&mut self, id: WindowId) -> bool {
        if !self.open.remove(&id) {
            return false;
        }
        log::debug!("{} closed", id);

        if self.open_count() == 0 && self.platform.quits_on_last_close() {
            self.running = false;
            self.backend.quit();
        }
        true
    }

    fn create_window(&mut self) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;

        let world = SigilApi::expose(self.renderer.clone());
        self.backend.open(id, &self.options, world);
        self.open.insert(id);
        log::debug!("{} created ({})", id, self.options.entry);
        id
    }

    /// Ids below `next_id` that are not open have been closed
    pub fn state(&self, id: WindowId) -> Option<WindowState> {
        if self.open.contains(&id) {
            Some(WindowState::Created)
        } else if id.0 >= 1 && id.0 < self.next_id {
            Some(WindowState::Closed)
        } else {
            None
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
