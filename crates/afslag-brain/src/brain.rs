//! Merchant brain - rule tables with optional LLM mode
//!
//! One brain serves one buyer. The deterministic path is the default and
//! is always total; the LLM path runs under a deadline and any failure
//! on it, from the network up to the guard, reads as WAIT for that offer.
//! A flaky backend must degrade to inaction, never to a different policy.

use crate::decision::{Decision, DecisionContext};
use crate::guard::{DecisionGuard, GuardError};
use crate::personality::Personality;
use afslag_llm::{ChatRequest, LlmError, LlmRouter, ProviderKind};
use std::time::Duration;
use thiserror::Error;

/// Brain mode - determines how the buyer makes decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrainMode {
    /// Always use the personality rule table
    Deterministic,
    /// Ask the LLM, treat any failure as WAIT
    LLM,
}

impl Default for BrainMode {
    fn default() -> Self {
        Self::Deterministic
    }
}

#[derive(Error, Debug)]
pub enum BrainError {
    #[error("LLM backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("Rejected LLM output: {0}")]
    Guard(#[from] GuardError),
}

pub type Result<T> = std::result::Result<T, BrainError>;

/// Default deadline for one LLM decision
pub const DEFAULT_DECISION_TIMEOUT: Duration = Duration::from_secs(2);

/// The buyer's brain - turns offers into buy/wait decisions
pub struct MerchantBrain {
    llm: Option<LlmRouter>,
    guard: DecisionGuard,
    mode: BrainMode,
    deadline: Duration,
}

impl MerchantBrain {
    /// Create a deterministic brain (no LLM)
    pub fn deterministic() -> Self {
        Self {
            llm: None,
            guard: DecisionGuard::new(),
            mode: BrainMode::Deterministic,
            deadline: DEFAULT_DECISION_TIMEOUT,
        }
    }

    /// Create a brain with LLM support
    pub fn with_llm(llm: LlmRouter) -> Self {
        Self {
            llm: Some(llm),
            guard: DecisionGuard::new(),
            mode: BrainMode::LLM,
            deadline: DEFAULT_DECISION_TIMEOUT,
        }
    }

    /// Create from environment; no configured provider means deterministic
    pub fn from_env() -> Self {
        match LlmRouter::from_env() {
            Some(llm) => Self::with_llm(llm),
            None => Self::deterministic(),
        }
    }

    /// Replace the per-decision deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Get the current mode
    pub fn mode(&self) -> BrainMode {
        self.mode
    }

    /// Get which provider is configured, if any
    pub fn provider_kind(&self) -> Option<ProviderKind> {
        self.llm.as_ref().map(|l| l.kind())
    }

    /// Check if the LLM backend is reachable
    pub async fn is_llm_available(&self) -> bool {
        match &self.llm {
            Some(llm) => llm.is_available().await,
            None => false,
        }
    }

    /// Decide whether to bid on one offer
    ///
    /// `Custom` personalities run their own closure and skip the LLM no
    /// matter the mode. This never fails: a broken LLM path surfaces as
    /// WAIT with a warn log, and the rule tables are total.
    pub async fn decide(&self, personality: &Personality, context: &DecisionContext) -> Decision {
        if let Personality::Custom(policy) = personality {
            return policy(context);
        }

        if self.mode == BrainMode::LLM {
            if let Some(llm) = &self.llm {
                let attempt = tokio::time::timeout(
                    self.deadline,
                    self.llm_decide(llm, personality, context),
                );
                return match attempt.await {
                    Ok(Ok(decision)) => decision,
                    Ok(Err(e)) => {
                        tracing::warn!(
                            buyer_kind = personality.label(),
                            error = %e,
                            "LLM decision failed, holding back this round"
                        );
                        Decision::wait("decision backend failed")
                    }
                    Err(_) => {
                        tracing::warn!(
                            buyer_kind = personality.label(),
                            deadline_ms = self.deadline.as_millis() as u64,
                            "LLM decision timed out, holding back this round"
                        );
                        Decision::wait("decision deadline passed")
                    }
                };
            }
        }

        personality.evaluate(context)
    }

    async fn llm_decide(
        &self,
        llm: &LlmRouter,
        personality: &Personality,
        context: &DecisionContext,
    ) -> Result<Decision> {
        let request = ChatRequest::new(describe_offer(context))
            .with_system(personality.prompt())
            .with_json_mode()
            .with_max_tokens(256);

        let response = llm.complete(request).await?;
        let decision = self.guard.parse(&response.content)?;
        Ok(decision)
    }
}

fn describe_offer(context: &DecisionContext) -> String {
    let missing = context.missing_kinds();
    let missing = if missing.is_empty() {
        "none".to_string()
    } else {
        missing
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Offer: {} at {} credits (round {}).\n\
         Available budget: {} credits.\n\
         Favourite kind: {}.\n\
         Kinds still missing: {}.\n\n\
         Decide whether to bid at this price.",
        context.offer.kind,
        context.offer.price,
        context.offer.round,
        context.available_budget,
        context.preference,
        missing,
    )
}
