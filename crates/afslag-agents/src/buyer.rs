//! Buyer agent - bids on the market feed through its brain
//!
//! A buyer is a loop over the shared event feed. Offers go through the
//! decision function; a BUY that survives the affordability pre-check
//! becomes a bid and a reservation against the budget. Confirmations
//! settle: a win pays and stores the item, anything else releases the
//! reservation. Every offered round is closed by exactly one
//! confirmation, so a reservation always finds its release.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use afslag_brain::{DecisionContext, MerchantBrain, Personality};
use afslag_market::MarketBus;
use afslag_types::{
    BidRequest, BuyerId, Credits, ItemKind, LotId, MarketEvent, Offer, Round, SaleConfirmation,
    SellerId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Errors that can occur in buyer operations
#[derive(Error, Debug)]
pub enum BuyerError {
    #[error("Buyer invariant violated: {details}")]
    Invariant { details: String },

    #[error("Market feed closed before the session ended")]
    FeedClosed,
}

pub type Result<T> = std::result::Result<T, BuyerError>;

/// Credits promised to one seller while a bid awaits its round's outcome
#[derive(Debug, Clone)]
struct PendingBid {
    lot_id: LotId,
    round: Round,
    kind: ItemKind,
    price: Credits,
}

/// One won lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub lot_id: LotId,
    pub kind: ItemKind,
    pub price: Credits,
}

/// What is left of a buyer when the session closes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerState {
    pub buyer_id: BuyerId,
    pub personality: String,
    pub preference: ItemKind,
    pub starting_budget: Credits,
    pub budget: Credits,
    pub purchases: Vec<Purchase>,
}

/// The buyer side of the market
pub struct BuyerAgent {
    id: BuyerId,
    personality: Personality,
    preference: ItemKind,
    starting_budget: Credits,
    budget: Credits,
    purchases: Vec<Purchase>,
    pending: HashMap<SellerId, PendingBid>,
    closed_lots: HashSet<LotId>,
    brain: MerchantBrain,
    bus: Arc<MarketBus>,
    events: broadcast::Receiver<MarketEvent>,
}

impl BuyerAgent {
    /// Create a buyer and subscribe it to the market feed
    ///
    /// Construct every buyer before the first seller starts calling
    /// prices; the subscription only sees events published after it.
    pub fn new(
        personality: Personality,
        preference: ItemKind,
        budget: Credits,
        brain: MerchantBrain,
        bus: Arc<MarketBus>,
    ) -> Self {
        let events = bus.subscribe();
        Self {
            id: BuyerId::new(),
            personality,
            preference,
            starting_budget: budget,
            budget,
            purchases: Vec::new(),
            pending: HashMap::new(),
            closed_lots: HashSet::new(),
            brain,
            bus,
            events,
        }
    }

    /// Get the agent's ID
    pub fn id(&self) -> &BuyerId {
        &self.id
    }

    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    pub fn preference(&self) -> ItemKind {
        self.preference
    }

    /// Budget minus every pending-bid reservation
    pub fn available_budget(&self) -> Credits {
        let reserved: Credits = self.pending.values().map(|p| p.price).sum();
        self.budget.saturating_sub(reserved)
    }

    fn holdings(&self) -> BTreeSet<ItemKind> {
        self.purchases.iter().map(|p| p.kind).collect()
    }

    /// Follow the feed until the market announces the session close
    pub async fn run(mut self) -> Result<BuyerState> {
        tracing::info!(
            buyer_id = %self.id,
            personality = %self.personality,
            preference = %self.preference,
            budget = %self.budget,
            "Buyer entering the market"
        );

        loop {
            match self.events.recv().await {
                Ok(MarketEvent::Offer(offer)) => self.handle_offer(offer).await,
                Ok(MarketEvent::Confirmation(confirmation)) => {
                    self.handle_confirmation(confirmation)?
                }
                Ok(MarketEvent::SessionClosed) => break,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(buyer_id = %self.id, missed, "Buyer lagged behind the feed");
                    continue;
                }
                Err(RecvError::Closed) => return Err(BuyerError::FeedClosed),
            }
        }

        tracing::info!(
            buyer_id = %self.id,
            remaining = %self.budget,
            purchases = self.purchases.len(),
            "Buyer leaving the market"
        );
        Ok(BuyerState {
            buyer_id: self.id,
            personality: self.personality.label().to_string(),
            preference: self.preference,
            starting_budget: self.starting_budget,
            budget: self.budget,
            purchases: self.purchases,
        })
    }

    async fn handle_offer(&mut self, offer: Offer) {
        if self.closed_lots.contains(&offer.lot_id) {
            return;
        }
        // One pending bid per seller: while a round awaits its outcome,
        // later offers from that seller are not even considered.
        if self.pending.contains_key(&offer.seller_id) {
            return;
        }

        let context = DecisionContext {
            offer: offer.clone(),
            available_budget: self.available_budget(),
            preference: self.preference,
            holdings: self.holdings(),
        };
        let decision = self.brain.decide(&self.personality, &context).await;
        if !decision.is_buy() {
            tracing::trace!(
                buyer_id = %self.id,
                lot_id = %offer.lot_id,
                price = %offer.price,
                reason = %decision.reason,
                "Waiting"
            );
            return;
        }

        // Mandatory affordability pre-check, whatever the decision said
        let available = self.available_budget();
        if offer.price > available {
            tracing::debug!(
                buyer_id = %self.id,
                lot_id = %offer.lot_id,
                price = %offer.price,
                available = %available,
                "Cannot cover own bid, staying out"
            );
            return;
        }

        let bid = BidRequest {
            buyer_id: self.id.clone(),
            seller_id: offer.seller_id.clone(),
            lot_id: offer.lot_id.clone(),
            round: offer.round,
            declared_budget: available,
        };
        match self.bus.submit_bid(bid) {
            Ok(()) => {
                tracing::info!(
                    buyer_id = %self.id,
                    lot_id = %offer.lot_id,
                    price = %offer.price,
                    round = %offer.round,
                    reason = %decision.reason,
                    "Bidding"
                );
                self.pending.insert(
                    offer.seller_id,
                    PendingBid {
                        lot_id: offer.lot_id,
                        round: offer.round,
                        kind: offer.kind,
                        price: offer.price,
                    },
                );
            }
            Err(e) => {
                // A bid that never reached the booth reserves nothing
                tracing::debug!(buyer_id = %self.id, error = %e, "Bid did not reach the booth");
            }
        }
    }

    fn handle_confirmation(&mut self, confirmation: SaleConfirmation) -> Result<()> {
        if confirmation.is_sale() {
            self.closed_lots.insert(confirmation.lot_id.clone());
        }

        // A reservation releases only when its own round closes
        let pending = match self.pending.get(&confirmation.seller_id) {
            Some(p) if p.lot_id == confirmation.lot_id && p.round == confirmation.round => {
                self.pending.remove(&confirmation.seller_id)
            }
            _ => None,
        };

        let won = confirmation.winner.as_ref() == Some(&self.id);
        match (won, pending) {
            (true, Some(p)) => {
                self.budget = self.budget.checked_sub(confirmation.price).ok_or_else(|| {
                    BuyerError::Invariant {
                        details: format!(
                            "winning price {} exceeds budget {} on lot {}",
                            confirmation.price, self.budget, confirmation.lot_id
                        ),
                    }
                })?;
                tracing::info!(
                    buyer_id = %self.id,
                    lot_id = %confirmation.lot_id,
                    kind = %p.kind,
                    price = %confirmation.price,
                    remaining = %self.budget,
                    "Won the lot"
                );
                self.purchases.push(Purchase {
                    lot_id: confirmation.lot_id,
                    kind: p.kind,
                    price: confirmation.price,
                });
            }
            (true, None) => {
                // A repeated win notice settles nothing further
                tracing::debug!(
                    buyer_id = %self.id,
                    lot_id = %confirmation.lot_id,
                    "Win notice without a matching reservation, ignoring"
                );
            }
            (false, Some(p)) => {
                tracing::debug!(
                    buyer_id = %self.id,
                    lot_id = %confirmation.lot_id,
                    released = %p.price,
                    "Round closed without us, reservation released"
                );
            }
            (false, None) => {}
        }
        Ok(())
    }
}
