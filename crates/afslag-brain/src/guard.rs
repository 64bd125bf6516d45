//! LLM output validation
//!
//! Every reply coming back from a decision backend is untrusted text.
//! The guard turns it into a `Decision` or rejects it; nothing else in
//! the crate ever reads raw LLM output.

use crate::decision::{BidAction, Decision};
use serde::Deserialize;
use thiserror::Error;

/// Longest reason carried into logs and records
pub const MAX_REASON_LEN: usize = 240;

/// Errors that can occur while validating LLM output
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Empty response")]
    Empty,

    #[error("Invalid JSON structure: {message}")]
    InvalidJson { message: String },

    #[error("Unknown action: {action}")]
    UnknownAction { action: String },
}

#[derive(Deserialize)]
struct RawDecision {
    action: String,
    #[serde(default)]
    reason: String,
}

/// Parses and validates decision JSON from LLM output
#[derive(Debug, Default, Clone, Copy)]
pub struct DecisionGuard;

impl DecisionGuard {
    pub fn new() -> Self {
        Self
    }

    /// Accepts exactly `{"action": "BUY"|"WAIT", "reason": "..."}`
    ///
    /// Markdown code fences are stripped, the action is matched without
    /// regard to case, a missing reason becomes the empty string, and an
    /// overlong reason is truncated. Anything else is rejected.
    pub fn parse(&self, raw: &str) -> Result<Decision, GuardError> {
        let cleaned = strip_fences(raw);
        if cleaned.is_empty() {
            return Err(GuardError::Empty);
        }

        let parsed: RawDecision =
            serde_json::from_str(cleaned).map_err(|e| GuardError::InvalidJson {
                message: e.to_string(),
            })?;

        let token = parsed.action.trim();
        let action = if token.eq_ignore_ascii_case("BUY") {
            BidAction::Buy
        } else if token.eq_ignore_ascii_case("WAIT") {
            BidAction::Wait
        } else {
            return Err(GuardError::UnknownAction {
                action: token.to_string(),
            });
        };

        let reason: String = parsed.reason.chars().take(MAX_REASON_LEN).collect();
        Ok(Decision { action, reason })
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}
