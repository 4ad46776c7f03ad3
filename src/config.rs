//! Configuration types and defaults
//!
//! One serde tree for the whole crate. Defaults reproduce the shipped
//! launcher and extension; hosts can override any field from JSON or from a
//! plain JS object.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config object: {0}")]
    Object(String),
    #[error("Invalid pattern for vibe '{tag}': {source}")]
    Pattern {
        tag: String,
        #[source]
        source: regex::Error,
    },
    #[error("Scan interval {0}ms does not fit a browser timer")]
    Interval(u32),
}

// =============================================================================
// Window
// =============================================================================

/// Options applied to every window the host creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed entry document loaded into each window
    pub entry: String,
    /// Script run in the isolated world before the entry document
    pub preload: String,
    pub node_integration: bool,
    pub context_isolation: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            entry: "index.html".to_string(),
            preload: "preload.js".to_string(),
            node_integration: false,
            context_isolation: true,
        }
    }
}

// =============================================================================
// Page scanner
// =============================================================================

/// A single tag -> pattern pair. The applied class is `vibe-<tag>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibePattern {
    pub tag: String,
    pub pattern: String,
}

impl VibePattern {
    pub fn new(tag: &str, pattern: &str) -> Self {
        Self {
            tag: tag.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Period between passes. Default: 5000
    pub interval_ms: u32,
    /// Evaluated in order, independently of each other
    pub patterns: Vec<VibePattern>,
}

impl ScannerConfig {
    /// Period as a `setInterval` timeout, which is an `i32`
    pub fn timer_timeout(&self) -> Result<i32, ConfigError> {
        i32::try_from(self.interval_ms).map_err(|_| ConfigError::Interval(self.interval_ms))
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            patterns: vec![
                VibePattern::new("joy", "(?i)jajaja"),
                VibePattern::new("hum", "(?i)mmm+"),
                VibePattern::new("paranoia", "(?i)lok kkkk"),
            ],
        }
    }
}

// =============================================================================
// Sigil
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigilConfig {
    /// Lock when the glitch score reaches this value. Default: 0.6
    pub threshold_glitch: f64,
    /// Lock when this many `lok` tokens appear. Default: 7
    pub lok_repeat: usize,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            threshold_glitch: 0.6,
            lok_repeat: 7,
        }
    }
}

// =============================================================================
// Root
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeweConfig {
    pub window: WindowConfig,
    pub scanner: ScannerConfig,
    pub sigil: SigilConfig,
}

impl WeweConfig {
    /// Parse from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a plain JS object
    pub fn from_js(value: JsValue) -> Result<Self, ConfigError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value).map_err(|e| ConfigError::Object(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
