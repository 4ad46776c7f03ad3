//! Evaluator seam
//!
//! The bridge only knows this trait. Whatever classifies text lives behind
//! it and is injected at construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque structured verdict. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanVerdict(serde_json::Value);

impl ScanVerdict {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for ScanVerdict {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Failure raised by an evaluator. Carried to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvaluatorError {
    message: String,
}

impl EvaluatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Classifies text into a verdict
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, text: &str) -> Result<ScanVerdict, EvaluatorError>;
}
