//! VibeSensor: offline text metrics
//!
//! Counts repetition, keysmashes, punctuation overload, Papiamentu "sugar"
//! words and palindromes, and folds them into a 0-1 glitch score.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Soft words that push the glitch score up. Matched against lowercased
/// tokens; "ayó" is not in the set and scores as a plain word.
pub const SUGAR_WORDS: &[&str] = &[
    "dushi", "bon", "bini", "kon", "bo", "ta", "kla", "plase", "sinti", "jajajaja", "mmm",
    "mmmm", "we",
];

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}_']+").expect("word pattern is valid"))
}

fn letters_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z]{3,}").expect("letter pattern is valid"))
}

fn keysmash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"sksk|asdf|dfgh|ghjk").expect("keysmash pattern is valid"))
}

fn is_sugar(word: &str) -> bool {
    SUGAR_WORDS.contains(&word)
}

// =============================================================================
// VibeReport
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeReport {
    /// Length in characters
    pub length: usize,
    pub word_count: usize,
    pub repetition_rate: f64,
    pub keysmash_hits: usize,
    pub punct_overload: usize,
    pub sugar_hits: usize,
    pub palindrome_hits: usize,
}

impl VibeReport {
    /// Composite glitch indicator in [0, 1], rounded to 3 decimals
    pub fn glitch_score(&self) -> f64 {
        let mut score = 0.0;
        score += self.repetition_rate.min(1.0) * 0.25;
        score += (self.keysmash_hits as f64 / 5.0).min(1.0) * 0.25;
        score += (self.punct_overload as f64 / 5.0).min(1.0) * 0.25;
        score += (self.sugar_hits as f64 / 5.0).min(1.0) * 0.25;
        (score * 1000.0).round() / 1000.0
    }

    /// Palindromic tokens read as soothing loops
    pub fn comfort_index(&self) -> f64 {
        (self.palindrome_hits as f64 / 3.0).min(1.0)
    }

    /// Report fields plus the derived scores
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("glitch_score".into(), self.glitch_score().into());
            map.insert("comfort_index".into(), self.comfort_index().into());
        }
        value
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Analyze `text` and return its metrics
pub fn analyze_text(text: &str) -> VibeReport {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = word_re().find_iter(&lowered).map(|m| m.as_str()).collect();

    let keysmash_hits = count_runs(text, |c| c != '\n') + detect_keysmash(&lowered).len();
    let punct_overload = count_runs(text, |c| matches!(c, '!' | '?' | '.'));
    let sugar_hits = words.iter().filter(|w| is_sugar(w)).count();
    let palindrome_hits = words
        .iter()
        .filter(|w| w.chars().count() > 2 && w.chars().eq(w.chars().rev()))
        .count();

    VibeReport {
        length: text.chars().count(),
        word_count: words.len(),
        repetition_rate: repetition_rate(&words),
        keysmash_hits,
        punct_overload,
        sugar_hits,
        palindrome_hits,
    }
}

/// Share of tokens that belong to a repeated word
fn repetition_rate(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for w in words {
        *counts.entry(w).or_insert(0) += 1;
    }
    let repeated: usize = counts.values().filter(|&&c| c > 1).sum();
    repeated as f64 / words.len() as f64
}

/// Count maximal runs of >= 3 identical characters accepted by `eligible`
fn count_runs(text: &str, eligible: impl Fn(char) -> bool) -> usize {
    let mut runs = 0;
    let mut current: Option<char> = None;
    let mut len = 0;

    for c in text.chars() {
        if Some(c) == current {
            len += 1;
        } else {
            if len >= 3 {
                runs += 1;
            }
            current = eligible(c).then_some(c);
            len = 1;
        }
    }
    if current.is_some() && len >= 3 {
        runs += 1;
    }
    runs
}

/// Letter sequences of length >= 6 that look like random typing
fn detect_keysmash(lowered: &str) -> Vec<&str> {
    letters_re()
        .find_iter(lowered)
        .map(|m| m.as_str())
        .filter(|c| c.len() >= 6 && !is_sugar(c))
        .filter(|c| keysmash_re().is_match(c) || c.chars().collect::<HashSet<_>>().len() > 4)
        .collect()
}
