//! PageScanner: passive vibe tagging
//!
//! Tests every tag pattern against the page's visible text and adds
//! `vibe-<tag>` to the root element for each match. Patterns are independent
//! (several tags can land in one pass) and adding is idempotent, so passes
//! may repeat or overlap freely.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::config::{ConfigError, ScannerConfig};

pub const VIBE_CLASS_PREFIX: &str = "vibe-";

// =============================================================================
// Page seam
// =============================================================================

/// A document the scanner can read from and tag
pub trait Page {
    /// Current visible text of the document body
    fn visible_text(&self) -> String;

    /// Add `class` to the root element. Returns true if it was not there yet.
    fn add_class(&mut self, class: &str) -> bool;
}

impl<P: Page> Page for Arc<Mutex<P>> {
    fn visible_text(&self) -> String {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .visible_text()
    }

    fn add_class(&mut self, class: &str) -> bool {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .add_class(class)
    }
}

/// Root element class set. Grows only; reset by dropping it with the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeState {
    classes: BTreeSet<String>,
}

impl VibeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: &str) -> bool {
        self.classes.insert(class.to_string())
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// In-memory page for native hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    pub text: String,
    pub state: VibeState,
}

impl MemoryPage {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            state: VibeState::new(),
        }
    }
}

impl Page for MemoryPage {
    fn visible_text(&self) -> String {
        self.text.clone()
    }

    fn add_class(&mut self, class: &str) -> bool {
        self.state.insert(class)
    }
}

// =============================================================================
// VibeMap
// =============================================================================

/// Fixed, ordered class -> pattern table
#[derive(Debug, Clone)]
pub struct VibeMap {
    entries: Vec<(String, Regex)>,
}

impl VibeMap {
    pub fn from_config(config: &ScannerConfig) -> Result<Self, ConfigError> {
        let entries = config
            .patterns
            .iter()
            .map(|p| {
                let regex = Regex::new(&p.pattern).map_err(|source| ConfigError::Pattern {
                    tag: p.tag.clone(),
                    source,
                })?;
                Ok((format!("{}{}", VIBE_CLASS_PREFIX, p.tag), regex))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { entries })
    }

    /// Classes whose pattern matches `text`, in table order
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(_, re)| re.is_match(text))
            .map(|(class, _)| class.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VibeMap {
    fn default() -> Self {
        // Default patterns are literals known to compile
        Self::from_config(&ScannerConfig::default()).unwrap_or(Self {
            entries: Vec::new(),
        })
    }
}

// =============================================================================
// PageScanner
// =============================================================================

/// Outcome of one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Classes this pass added for the first time
    pub added: Vec<String>,
    /// Patterns that matched, new or not
    pub matched: usize,
    pub elapsed_us: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PageScanner {
    map: VibeMap,
}

impl PageScanner {
    pub fn new(map: VibeMap) -> Self {
        Self { map }
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(VibeMap::from_config(config)?))
    }

    pub fn map(&self) -> &VibeMap {
        &self.map
    }

    /// One pass: read, match, tag
    pub fn scan_and_apply<P: Page + ?Sized>(&self, page: &mut P) -> PassReport {
        let start = instant::Instant::now();
        let text = page.visible_text();

        let mut report = PassReport::default();
        for class in self.map.matches(&text) {
            report.matched += 1;
            if page.add_class(class) {
                report.added.push(class.to_string());
            }
        }
        report.elapsed_us = start.elapsed().as_micros() as u64;
        report
    }
}
