//! SecuritySigil: vibe-locked shield
//!
//! Seals on suspicious input:
//! - token `lok` repeated at least `lok_repeat` times, or
//! - glitch score at or above `threshold_glitch`.
//!
//! A lock produces a `∞LOCK-<hex>` sigil and records a `security_event`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use md5::Md5;
use sha1::{Digest, Sha1};
use std::sync::{Arc, Mutex};

use crate::bridge::{Evaluator, EvaluatorError, ScanVerdict};
use crate::config::SigilConfig;
use crate::sigil::vibe::{analyze_text, VibeReport};

pub const SIGIL_PREFIX: &str = "∞LOCK";
pub const SECURITY_EVENT_TAG: &str = "security_event";

const LOCKED_MESSAGE: &str = "System sealed with WE-WE-WE power!";
const SECURE_MESSAGE: &str = "Nothing suspicious detected.";

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sigil {
    pub symbol: String,
    pub vibe_signature: String,
    /// Unix timestamp, seconds
    pub ts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigilStatus {
    Locked,
    Secure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigilVerdict {
    pub status: SigilStatus,
    pub sigil: Option<String>,
    pub message: String,
}

impl SigilVerdict {
    fn locked(sigil: &Sigil) -> Self {
        Self {
            status: SigilStatus::Locked,
            sigil: Some(sigil.symbol.clone()),
            message: LOCKED_MESSAGE.to_string(),
        }
    }

    fn secure() -> Self {
        Self {
            status: SigilStatus::Secure,
            sigil: None,
            message: SECURE_MESSAGE.to_string(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.status == SigilStatus::Locked
    }
}

impl From<SigilVerdict> for ScanVerdict {
    fn from(verdict: SigilVerdict) -> Self {
        ScanVerdict::new(serde_json::to_value(verdict).unwrap_or_default())
    }
}

/// Artefact stored for every lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub text: String,
    pub tag: String,
    pub sigil: String,
    pub ts: f64,
}

/// Shared, append-only record of security events
#[derive(Debug, Clone, Default)]
pub struct SecurityJournal {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
}

impl SecurityJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: SecurityEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// SecuritySigil
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct SecuritySigil {
    config: SigilConfig,
    journal: SecurityJournal,
}

impl SecuritySigil {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SigilConfig) -> Self {
        Self {
            config,
            journal: SecurityJournal::new(),
        }
    }

    /// Share an existing journal instead of a private one
    pub fn with_journal(mut self, journal: SecurityJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn journal(&self) -> &SecurityJournal {
        &self.journal
    }

    /// Evaluate `text`; lock and record when it looks hostile
    pub fn check(&self, text: &str) -> SigilVerdict {
        let report = analyze_text(text);
        if !self.is_threat(text, &report) {
            return SigilVerdict::secure();
        }

        let sigil = create_sigil(text);
        log::debug!("sigil lock {}", sigil.symbol);
        self.journal.record(SecurityEvent {
            text: text.to_string(),
            tag: SECURITY_EVENT_TAG.to_string(),
            sigil: sigil.symbol.clone(),
            ts: sigil.ts,
        });
        SigilVerdict::locked(&sigil)
    }

    fn is_threat(&self, text: &str, report: &VibeReport) -> bool {
        let lok_count = text
            .to_lowercase()
            .split_whitespace()
            .filter(|t| *t == "lok")
            .count();
        report.glitch_score() >= self.config.threshold_glitch || lok_count >= self.config.lok_repeat
    }
}

#[async_trait]
impl Evaluator for SecuritySigil {
    async fn evaluate(&self, text: &str) -> Result<ScanVerdict, EvaluatorError> {
        Ok(self.check(text).into())
    }
}

/// `∞LOCK-` + first 6 hex of SHA-1; signature is the first 8 hex of MD5
pub fn create_sigil(text: &str) -> Sigil {
    let symbol_digest = hex::encode(Sha1::digest(text.as_bytes()));
    let signature_digest = hex::encode(Md5::digest(text.as_bytes()));
    Sigil {
        symbol: format!("{}-{}", SIGIL_PREFIX, &symbol_digest[..6]),
        vibe_signature: signature_digest[..8].to_string(),
        ts: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEVEN_LOKS: &str = "lok lok lok lok lok lok lok";

    // -------------------------------------------------------------------------
    // Requirement 1: seven `lok` tokens lock
    // -------------------------------------------------------------------------
    #[test]
    fn test_lok_repeat_locks() {
        let shield = SecuritySigil::new();
        let verdict = shield.check(SEVEN_LOKS);

        assert!(verdict.is_locked());
        assert!(verdict.sigil.as_deref().unwrap().starts_with("∞LOCK-"));
        assert_eq!(verdict.message, LOCKED_MESSAGE);
    }

    #[test]
    fn test_lok_is_case_insensitive() {
        let shield = SecuritySigil::new();
        assert!(shield.check("LOK Lok lok lOk lok lok LOK").is_locked());
    }

    #[test]
    fn test_six_loks_are_secure() {
        let shield = SecuritySigil::new();
        // "lok" repeats but six tokens stay under the glitch threshold
        let verdict = shield.check("lok lok lok lok lok lok");
        assert!(!verdict.is_locked());
        assert!(verdict.sigil.is_none());
    }

    // -------------------------------------------------------------------------
    // Requirement 2: ordinary text is secure and leaves no trace
    // -------------------------------------------------------------------------
    #[test]
    fn test_plain_text_is_secure() {
        let shield = SecuritySigil::new();
        let verdict = shield.check("The weather is nice today.");

        assert_eq!(verdict.status, SigilStatus::Secure);
        assert_eq!(verdict.message, SECURE_MESSAGE);
        assert!(shield.journal().is_empty());
    }

    // -------------------------------------------------------------------------
    // Requirement 3: glitchy text locks on score alone
    // -------------------------------------------------------------------------
    #[test]
    fn test_glitch_threshold_locks() {
        let shield = SecuritySigil::with_config(SigilConfig {
            threshold_glitch: 0.2,
            lok_repeat: 100,
        });
        assert!(shield.check("dushi bon bini we ta kla!!! ???").is_locked());
    }

    // -------------------------------------------------------------------------
    // Requirement 4: locks are journaled
    // -------------------------------------------------------------------------
    #[test]
    fn test_lock_records_event() {
        let journal = SecurityJournal::new();
        let shield = SecuritySigil::new().with_journal(journal.clone());

        let verdict = shield.check(SEVEN_LOKS);
        let events = journal.events();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag, SECURITY_EVENT_TAG);
        assert_eq!(events[0].text, SEVEN_LOKS);
        assert_eq!(Some(events[0].sigil.clone()), verdict.sigil);
    }

    // -------------------------------------------------------------------------
    // Requirement 5: sigil symbol is deterministic per text
    // -------------------------------------------------------------------------
    #[test]
    fn test_sigil_deterministic() {
        let a = create_sigil("same input");
        let b = create_sigil("same input");
        let c = create_sigil("other input");

        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.vibe_signature, b.vibe_signature);
        assert_ne!(a.symbol, c.symbol);
        assert_eq!(a.symbol.chars().count(), "∞LOCK-".chars().count() + 6);
        assert_eq!(a.vibe_signature.len(), 8);
    }

    #[test]
    fn test_sigil_digest_values() {
        let sigil = create_sigil(SEVEN_LOKS);
        assert_eq!(sigil.symbol, "∞LOCK-2aee1b");
        assert_eq!(sigil.vibe_signature, "bfd0796d");
    }

    #[test]
    fn test_verdict_serialization() {
        let verdict: ScanVerdict = SigilVerdict::secure().into();
        let value = verdict.into_value();

        assert_eq!(value["status"], "secure");
        assert!(value["sigil"].is_null());
    }

    #[tokio::test]
    async fn test_evaluator_impl() {
        let shield = SecuritySigil::new();
        let verdict = shield.evaluate(SEVEN_LOKS).await.unwrap();
        assert_eq!(verdict.as_value()["status"], "locked");
    }
}
