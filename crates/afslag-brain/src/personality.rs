//! Buyer personalities
//!
//! Each personality is one deterministic rule table plus the system
//! prompt used when the same policy runs through an LLM. `Custom` wraps
//! an arbitrary closure and never touches an LLM.

use crate::decision::{Decision, DecisionContext};
use afslag_types::Credits;
use std::fmt;
use std::sync::Arc;

/// Price at or below which every built-in policy takes the lot as a bargain
pub const BARGAIN_PRICE: Credits = Credits(15);

/// Credits held back per still-missing kind when planning for diversity
pub const KIND_RESERVE: Credits = Credits(15);

/// An arbitrary decision policy supplied by the caller
pub type CustomPolicy = dyn Fn(&DecisionContext) -> Decision + Send + Sync;

/// The closed set of buyer policies
#[derive(Clone)]
pub enum Personality {
    /// Diversity first, then preference, then bargains
    Balanced,
    /// Low prices only, small stretch for missing kinds
    Cautious,
    /// Anything missing or preferred, whenever affordable
    Greedy,
    /// The preferred kind above all else
    PreferenceDriven,
    /// Caller-supplied policy, dispatched like any other
    Custom(Arc<CustomPolicy>),
}

impl Personality {
    /// The built-in policies sessions cycle through when assigning buyers
    pub const BUILTIN: [Personality; 4] = [
        Personality::Balanced,
        Personality::Cautious,
        Personality::Greedy,
        Personality::PreferenceDriven,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Cautious => "cautious",
            Self::Greedy => "greedy",
            Self::PreferenceDriven => "preference_driven",
            Self::Custom(_) => "custom",
        }
    }

    /// Parse a built-in personality by label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Some(Self::Balanced),
            "cautious" => Some(Self::Cautious),
            "greedy" => Some(Self::Greedy),
            "preference_driven" | "preference-driven" | "preference" => {
                Some(Self::PreferenceDriven)
            }
            _ => None,
        }
    }

    /// System prompt for LLM mode
    pub fn prompt(&self) -> String {
        let policy = match self {
            Self::Balanced => {
                "You want one of every kind before anything else, then your favourite, \
                 and you never spend credits you will still need for missing kinds."
            }
            Self::Cautious => {
                "You hate overpaying. Wait for low prices, and stretch only a little \
                 for a kind you still lack."
            }
            Self::Greedy => {
                "You grab every kind you lack and your favourite above all, and you \
                 never let a bargain pass."
            }
            Self::PreferenceDriven => {
                "You care about your favourite kind almost exclusively; anything else \
                 only at a very low price, and only if you lack it."
            }
            Self::Custom(_) => "You decide case by case.",
        };

        format!(
            r#"You are a buyer at a descending-price fish auction. {policy} Output valid JSON only.

Schema:
{{
  "action": "BUY" | "WAIT",
  "reason": "one short sentence"
}}

Rules:
- BUY only if the price fits the available budget
- WAIT is always safe; the price falls every round
- a discarded lot never comes back, so do not wait forever on a kind you need"#
        )
    }

    /// Answer the rule table for one offer
    pub fn evaluate(&self, context: &DecisionContext) -> Decision {
        let price = context.offer.price;
        let kind = context.offer.kind;
        let available = context.available_budget;
        let missing = context.is_missing(kind);
        let preferred = context.is_preferred(kind);

        match self {
            Self::Balanced => {
                if missing {
                    // Keep enough back to chase the other missing kinds later
                    let other_missing = context.missing_kinds().len() as u64 - 1;
                    let spendable = available.saturating_sub(KIND_RESERVE.times(other_missing));
                    if price <= spendable {
                        return Decision::buy("missing kind within the diversity plan");
                    }
                    if price <= available.percent(40) {
                        return Decision::buy("missing kind at a low price");
                    }
                }
                if preferred && price <= available.percent(60) {
                    return Decision::buy("preferred kind at a fair price");
                }
                if price <= BARGAIN_PRICE {
                    return Decision::buy("bargain");
                }
                Decision::wait("holding out for a better price")
            }
            Self::Cautious => {
                if price <= available.percent(30) {
                    return Decision::buy("cheap enough to risk");
                }
                if missing && price < Credits::new(20) {
                    return Decision::buy("small stretch for a missing kind");
                }
                Decision::wait("too dear for comfort")
            }
            Self::Greedy => {
                if (missing || preferred) && price <= available {
                    return Decision::buy("wanted and affordable");
                }
                if price <= BARGAIN_PRICE {
                    return Decision::buy("bargain");
                }
                Decision::wait("nothing here worth grabbing")
            }
            Self::PreferenceDriven => {
                if preferred && price <= available.percent(80) {
                    return Decision::buy("the favourite, within reach");
                }
                if missing && price <= BARGAIN_PRICE {
                    return Decision::buy("cheap gap filler");
                }
                Decision::wait("not the favourite")
            }
            Self::Custom(policy) => policy(context),
        }
    }
}

impl fmt::Debug for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => write!(f, "Custom"),
            other => write!(f, "{}", other.label()),
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
