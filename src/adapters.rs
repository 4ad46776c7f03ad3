//! Skill adapters: `{ "text": ... }` in, JSON out
//!
//! Loose skill entry points accept a missing payload or missing text as
//! empty text. Tool inputs are strict: unknown fields and empty text are
//! rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::sigil::{analyze_text, SecuritySigil};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("text must not be empty")]
    EmptyText,
}

fn payload_text(payload: Option<&Value>) -> &str {
    payload
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Vibe analysis skill
pub fn vibe_skill(payload: Option<&Value>) -> Value {
    analyze_text(payload_text(payload)).to_json()
}

/// Sigil evaluation skill
pub fn sigil_skill(shield: &SecuritySigil, payload: Option<&Value>) -> Value {
    serde_json::to_value(shield.check(payload_text(payload))).unwrap_or_default()
}

// =============================================================================
// Strict tool inputs
// =============================================================================

/// Input for the vibe scan tool
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VibeScanInput {
    pub text: String,
}

/// Input for the security lock tool
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityInput {
    pub text: String,
}

fn require_text(text: &str) -> Result<(), InputError> {
    if text.is_empty() {
        return Err(InputError::EmptyText);
    }
    Ok(())
}

impl VibeScanInput {
    pub fn parse(value: Value) -> Result<Self, InputError> {
        let input: Self = serde_json::from_value(value)?;
        require_text(&input.text)?;
        Ok(input)
    }
}

impl SecurityInput {
    pub fn parse(value: Value) -> Result<Self, InputError> {
        let input: Self = serde_json::from_value(value)?;
        require_text(&input.text)?;
        Ok(input)
    }
}

/// Vibe scan tool: strict input, same report as `vibe_skill`
pub fn vibe_tool(input: Value) -> Result<Value, InputError> {
    let input = VibeScanInput::parse(input)?;
    Ok(analyze_text(&input.text).to_json())
}

/// Security lock tool: strict input, same verdict as `sigil_skill`
pub fn sigil_tool(shield: &SecuritySigil, input: Value) -> Result<Value, InputError> {
    let input = SecurityInput::parse(input)?;
    Ok(serde_json::to_value(shield.check(&input.text))?)
}
