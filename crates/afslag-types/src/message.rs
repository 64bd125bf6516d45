//! Wire messages
//!
//! Everything agents exchange goes through these immutable messages.
//! Offers and confirmations fan out to every subscriber; bid requests
//! travel point-to-point to the seller they answer.

use crate::credits::Credits;
use crate::identity::{BuyerId, LotId, SellerId};
use crate::item::ItemKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One price-broadcast/bid-resolution cycle for a lot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Round(pub u32);

impl Round {
    pub fn first() -> Self {
        Self(0)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A seller's price broadcast for the current round of a lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub seller_id: SellerId,
    pub lot_id: LotId,
    pub kind: ItemKind,
    pub price: Credits,
    pub round: Round,
}

/// A buyer's answer to an offer it decided to take
///
/// `declared_budget` is the budget the buyer can still commit at bid
/// time; the arbiter's affordability check reads it, since there is no
/// shared memory to consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRequest {
    pub buyer_id: BuyerId,
    pub seller_id: SellerId,
    pub lot_id: LotId,
    pub round: Round,
    pub declared_budget: Credits,
}

/// Close of a round. A winner closes the lot; `winner: None` closes only
/// the round and releases the bids that answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfirmation {
    pub seller_id: SellerId,
    pub lot_id: LotId,
    pub round: Round,
    pub price: Credits,
    pub winner: Option<BuyerId>,
}

impl SaleConfirmation {
    pub fn is_sale(&self) -> bool {
        self.winner.is_some()
    }
}

/// Everything that flows over the market's broadcast channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    Offer(Offer),
    Confirmation(SaleConfirmation),
    SessionClosed,
}
