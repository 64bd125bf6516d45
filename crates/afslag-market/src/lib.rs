//! Afslag Market - The in-process market bus
//!
//! All agent traffic runs over this one structure:
//! - Offers and confirmations fan out to every subscriber over a
//!   broadcast channel
//! - Bids travel point-to-point into the addressed seller's booth, a
//!   bounded mpsc queue
//!
//! # Architecture
//!
//! ```text
//! Sellers ──publish──→ broadcast ──→ every buyer's event loop
//! Buyers ──submit_bid──→ booth (mpsc) ──→ one seller's window
//! ```
//!
//! The bus holds no auction state. Lots live inside their sellers,
//! budgets inside their buyers; the bus only moves messages.

use afslag_types::{BidRequest, MarketEvent, SellerId};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Broadcast ring capacity; slow subscribers observe `Lagged`, the
/// market never waits for them.
pub const EVENT_CAPACITY: usize = 1024;

/// Bids one booth can hold unread before further bids are dropped
pub const BOOTH_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("No booth open for seller {seller_id}")]
    UnknownBooth { seller_id: SellerId },

    #[error("Booth for seller {seller_id} is not accepting bids")]
    BoothUnavailable { seller_id: SellerId },
}

pub type Result<T> = std::result::Result<T, MarketError>;

/// The market's single shared structure
pub struct MarketBus {
    events: broadcast::Sender<MarketEvent>,
    booths: DashMap<SellerId, mpsc::Sender<BidRequest>>,
}

impl MarketBus {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            events,
            booths: DashMap::new(),
        }
    }

    /// Broadcast a market event to every subscriber
    pub fn publish(&self, event: MarketEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.events.send(event);
    }

    /// Subscribe to all market events
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.events.subscribe()
    }

    /// Open a point-to-point bid queue for a seller
    ///
    /// A second open under the same id replaces the first; bids already
    /// queued in the replaced booth stay with its receiver.
    pub fn open_booth(&self, seller_id: SellerId) -> mpsc::Receiver<BidRequest> {
        let (tx, rx) = mpsc::channel(BOOTH_CAPACITY);
        self.booths.insert(seller_id, tx);
        rx
    }

    /// Remove a seller's booth; later bids for it are rejected
    pub fn close_booth(&self, seller_id: &SellerId) {
        self.booths.remove(seller_id);
    }

    /// Send a bid to the addressed seller's booth without waiting
    ///
    /// Best effort: a missing, closed, or full booth rejects the bid.
    /// Submission never blocks the caller's event loop.
    pub fn submit_bid(&self, bid: BidRequest) -> Result<()> {
        let seller_id = bid.seller_id.clone();
        // Clone the sender out so the map shard is not held across the send
        let sender = match self.booths.get(&seller_id) {
            Some(entry) => entry.value().clone(),
            None => return Err(MarketError::UnknownBooth { seller_id }),
        };
        sender
            .try_send(bid)
            .map_err(|_| MarketError::BoothUnavailable { seller_id })
    }

    /// Number of booths currently open
    pub fn booth_count(&self) -> usize {
        self.booths.len()
    }
}

impl Default for MarketBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afslag_types::{BuyerId, Credits, ItemKind, LotId, Offer, Round};

    fn offer(seller_id: &SellerId) -> Offer {
        Offer {
            seller_id: seller_id.clone(),
            lot_id: LotId::new(),
            kind: ItemKind::Hake,
            price: Credits::new(40),
            round: Round::first(),
        }
    }

    fn bid(seller_id: &SellerId) -> BidRequest {
        BidRequest {
            buyer_id: BuyerId::new(),
            seller_id: seller_id.clone(),
            lot_id: LotId::new(),
            round: Round::first(),
            declared_budget: Credits::new(100),
        }
    }

    #[tokio::test]
    async fn test_events_fan_out_to_all_subscribers() {
        let bus = MarketBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let seller = SellerId::new();
        bus.publish(MarketEvent::Offer(offer(&seller)));

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert_eq!(a, b);
        assert!(matches!(a, MarketEvent::Offer(_)));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let bus = MarketBus::new();
        bus.publish(MarketEvent::SessionClosed);
    }

    #[tokio::test]
    async fn test_bid_reaches_the_addressed_booth() {
        let bus = MarketBus::new();
        let seller = SellerId::new();
        let mut booth = bus.open_booth(seller.clone());
        assert_eq!(bus.booth_count(), 1);

        let sent = bid(&seller);
        bus.submit_bid(sent.clone()).unwrap();

        let received = booth.recv().await.unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_bid_for_unknown_booth_rejected() {
        let bus = MarketBus::new();
        let seller = SellerId::new();

        let result = bus.submit_bid(bid(&seller));
        assert!(matches!(result, Err(MarketError::UnknownBooth { .. })));
    }

    #[tokio::test]
    async fn test_bid_after_close_rejected() {
        let bus = MarketBus::new();
        let seller = SellerId::new();
        let _booth = bus.open_booth(seller.clone());
        bus.close_booth(&seller);
        assert_eq!(bus.booth_count(), 0);

        let result = bus.submit_bid(bid(&seller));
        assert!(matches!(result, Err(MarketError::UnknownBooth { .. })));
    }

    #[tokio::test]
    async fn test_full_booth_drops_further_bids() {
        let bus = MarketBus::new();
        let seller = SellerId::new();
        let _booth = bus.open_booth(seller.clone());

        for _ in 0..BOOTH_CAPACITY {
            bus.submit_bid(bid(&seller)).unwrap();
        }
        let overflow = bus.submit_bid(bid(&seller));
        assert!(matches!(overflow, Err(MarketError::BoothUnavailable { .. })));
    }
}
