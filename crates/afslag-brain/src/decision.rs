//! Decision inputs and outputs

use afslag_types::{Credits, ItemKind, Offer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a decision function answers for one offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BidAction {
    Buy,
    Wait,
}

/// A buy/wait answer with a short justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: BidAction,
    pub reason: String,
}

impl Decision {
    pub fn buy(reason: impl Into<String>) -> Self {
        Self {
            action: BidAction::Buy,
            reason: reason.into(),
        }
    }

    pub fn wait(reason: impl Into<String>) -> Self {
        Self {
            action: BidAction::Wait,
            reason: reason.into(),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.action == BidAction::Buy
    }
}

/// Everything a decision function may look at for one offer
///
/// `available_budget` is the buyer's budget minus its pending-bid
/// reservations, so a decision never sees credits already promised to
/// another seller's round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    pub offer: Offer,
    pub available_budget: Credits,
    pub preference: ItemKind,
    pub holdings: BTreeSet<ItemKind>,
}

impl DecisionContext {
    /// Kinds the buyer does not hold yet
    pub fn missing_kinds(&self) -> Vec<ItemKind> {
        ItemKind::ALL
            .into_iter()
            .filter(|kind| !self.holdings.contains(kind))
            .collect()
    }

    /// Whether the offered kind is still missing from the holdings
    pub fn is_missing(&self, kind: ItemKind) -> bool {
        !self.holdings.contains(&kind)
    }

    /// Whether the offered kind is the buyer's preference
    pub fn is_preferred(&self, kind: ItemKind) -> bool {
        self.preference == kind
    }
}
