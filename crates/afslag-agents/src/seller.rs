//! Seller agent - auctions lots by descending price
//!
//! One seller auctions its lots strictly in sequence. Per lot, per round:
//! broadcast the price, hold the booth open for the collection window,
//! arbitrate whatever arrived, broadcast the round's confirmation, then
//! lower the price or discard. Every round ends in exactly one
//! confirmation; buyers rely on that to release their reservations.

use std::sync::Arc;
use std::time::Duration;

use afslag_core::{BidArbiter, PriceClock, TickOutcome};
use afslag_market::MarketBus;
use afslag_types::{
    BidRequest, Credits, Lot, LotId, LotState, MarketEvent, Offer, Round, SaleConfirmation,
    SellerId, TransactionRecord,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Errors that can occur in seller operations
#[derive(Error, Debug)]
pub enum SellerError {
    #[error("Auction invariant violated: {details}")]
    Invariant { details: String },

    #[error("Results channel closed before lot {lot_id} could report")]
    ResultsClosed { lot_id: LotId },
}

pub type Result<T> = std::result::Result<T, SellerError>;

/// Tunables for one seller
#[derive(Debug, Clone)]
pub struct SellerConfig {
    /// How long every round stays open for bids
    pub collection_window: Duration,
}

impl Default for SellerConfig {
    fn default() -> Self {
        Self {
            collection_window: Duration::from_millis(200),
        }
    }
}

/// The seller side of the market
pub struct SellerAgent {
    id: SellerId,
    lots: Vec<Lot>,
    clock: PriceClock,
    arbiter: BidArbiter,
    config: SellerConfig,
    bus: Arc<MarketBus>,
    bids: mpsc::Receiver<BidRequest>,
    results: mpsc::UnboundedSender<TransactionRecord>,
}

impl SellerAgent {
    /// Create a seller and open its booth on the bus
    ///
    /// Every lot must already carry this seller's id.
    pub fn new(
        id: SellerId,
        lots: Vec<Lot>,
        clock: PriceClock,
        config: SellerConfig,
        bus: Arc<MarketBus>,
        results: mpsc::UnboundedSender<TransactionRecord>,
    ) -> Result<Self> {
        for lot in &lots {
            if lot.seller_id != id {
                return Err(SellerError::Invariant {
                    details: format!("lot {} does not belong to seller {}", lot.lot_id, id),
                });
            }
        }
        let bids = bus.open_booth(id.clone());
        Ok(Self {
            id,
            lots,
            clock,
            arbiter: BidArbiter::new(),
            config,
            bus,
            bids,
            results,
        })
    }

    /// Get the agent's ID
    pub fn id(&self) -> &SellerId {
        &self.id
    }

    /// Auction every lot in order, then close the booth
    ///
    /// Each closed lot is reported over the results channel as it
    /// closes; the full list is also returned at the end.
    pub async fn run(mut self) -> Result<Vec<TransactionRecord>> {
        tracing::info!(seller_id = %self.id, lots = self.lots.len(), "Seller opening");

        let lots = std::mem::take(&mut self.lots);
        let mut records = Vec::with_capacity(lots.len());
        for lot in lots {
            let record = self.auction_lot(lot).await?;
            if self.results.send(record.clone()).is_err() {
                return Err(SellerError::ResultsClosed {
                    lot_id: record.lot_id,
                });
            }
            records.push(record);
        }

        self.bus.close_booth(&self.id);
        tracing::info!(
            seller_id = %self.id,
            sold = records.iter().filter(|r| r.is_sale()).count(),
            discarded = records.iter().filter(|r| !r.is_sale()).count(),
            "Seller closing"
        );
        Ok(records)
    }

    async fn auction_lot(&mut self, mut lot: Lot) -> Result<TransactionRecord> {
        tracing::info!(
            seller_id = %self.id,
            lot_id = %lot.lot_id,
            kind = %lot.kind,
            start = %lot.start_price,
            reserve = %lot.reserve_price,
            "Opening lot"
        );

        let mut round = Round::first();
        let mut last_offer: Option<Credits> = None;

        loop {
            // Invariant sweep before every broadcast
            if !lot.is_open() {
                return Err(SellerError::Invariant {
                    details: format!("lot {} re-offered in state {:?}", lot.lot_id, lot.state),
                });
            }
            if let Some(previous) = last_offer {
                if lot.current_price >= previous {
                    return Err(SellerError::Invariant {
                        details: format!(
                            "price did not descend on lot {}: {} then {}",
                            lot.lot_id, previous, lot.current_price
                        ),
                    });
                }
            }
            if lot.current_price < lot.reserve_price {
                return Err(SellerError::Invariant {
                    details: format!(
                        "lot {} offered below reserve: {} < {}",
                        lot.lot_id, lot.current_price, lot.reserve_price
                    ),
                });
            }

            tracing::debug!(
                seller_id = %self.id,
                lot_id = %lot.lot_id,
                price = %lot.current_price,
                round = %round,
                "Calling price"
            );
            last_offer = Some(lot.current_price);
            self.bus.publish(MarketEvent::Offer(Offer {
                seller_id: self.id.clone(),
                lot_id: lot.lot_id.clone(),
                kind: lot.kind,
                price: lot.current_price,
                round,
            }));

            let bids = self.collect_bids().await;

            if let Some(winning) = self.arbiter.resolve(&lot, round, &bids).cloned() {
                lot.state = LotState::Sold;
                self.bus
                    .publish(MarketEvent::Confirmation(SaleConfirmation {
                        seller_id: self.id.clone(),
                        lot_id: lot.lot_id.clone(),
                        round,
                        price: lot.current_price,
                        winner: Some(winning.buyer_id.clone()),
                    }));
                tracing::info!(
                    seller_id = %self.id,
                    lot_id = %lot.lot_id,
                    buyer_id = %winning.buyer_id,
                    price = %lot.current_price,
                    round = %round,
                    "Sold"
                );
                return Ok(TransactionRecord::sold(
                    self.id.clone(),
                    lot.lot_id.clone(),
                    lot.kind,
                    lot.current_price,
                    winning.buyer_id,
                ));
            }

            // No winner: the null confirmation closes the round, not the
            // lot, and releases every reservation that answered it.
            self.bus
                .publish(MarketEvent::Confirmation(SaleConfirmation {
                    seller_id: self.id.clone(),
                    lot_id: lot.lot_id.clone(),
                    round,
                    price: lot.current_price,
                    winner: None,
                }));

            match self.clock.tick(&mut lot) {
                TickOutcome::Lowered(_) => round = round.next(),
                TickOutcome::Exhausted => {
                    tracing::info!(
                        seller_id = %self.id,
                        lot_id = %lot.lot_id,
                        reserve = %lot.reserve_price,
                        "Discarded at reserve"
                    );
                    return Ok(TransactionRecord::discarded(
                        self.id.clone(),
                        lot.lot_id.clone(),
                        lot.kind,
                    ));
                }
            }
        }
    }

    /// Gather every bid that arrives inside one collection window
    async fn collect_bids(&mut self) -> Vec<BidRequest> {
        let deadline = Instant::now() + self.config.collection_window;
        let timeout = sleep_until(deadline);
        tokio::pin!(timeout);

        let mut bids = Vec::new();
        loop {
            tokio::select! {
                _ = &mut timeout => break,
                maybe = self.bids.recv() => match maybe {
                    Some(bid) => bids.push(bid),
                    None => {
                        // Booth handle replaced under us; nothing more can
                        // arrive, but hold the round open for its full
                        // window so pacing stays uniform.
                        (&mut timeout).await;
                        break;
                    }
                },
            }
        }
        bids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afslag_core::StepPolicy;
    use afslag_types::ItemKind;

    fn lot_for(seller_id: &SellerId, start: u64, reserve: u64) -> Lot {
        Lot::new(
            seller_id.clone(),
            ItemKind::Tuna,
            Credits::new(start),
            Credits::new(reserve),
        )
        .unwrap()
    }

    #[test]
    fn test_foreign_lot_rejected() {
        let bus = Arc::new(MarketBus::new());
        let (results, _keep) = mpsc::unbounded_channel();
        let seller_id = SellerId::new();
        let foreign = lot_for(&SellerId::new(), 40, 10);

        let result = SellerAgent::new(
            seller_id,
            vec![foreign],
            PriceClock::new(StepPolicy::Fixed(Credits::new(5))).unwrap(),
            SellerConfig::default(),
            bus,
            results,
        );
        assert!(matches!(result, Err(SellerError::Invariant { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsold_lot_descends_and_discards() {
        let bus = Arc::new(MarketBus::new());
        let (results, mut results_rx) = mpsc::unbounded_channel();
        let seller_id = SellerId::new();
        let lot = lot_for(&seller_id, 30, 10);
        let lot_id = lot.lot_id.clone();

        let seller = SellerAgent::new(
            seller_id.clone(),
            vec![lot],
            PriceClock::new(StepPolicy::Fixed(Credits::new(10))).unwrap(),
            SellerConfig::default(),
            bus.clone(),
            results,
        )
        .unwrap();

        let mut events = bus.subscribe();
        let records = seller.run().await.unwrap();

        // Prices called: 30, 20, 10, then the next tick would undercut
        // the reserve and the lot is discarded.
        let mut offers = Vec::new();
        let mut confirmations = Vec::new();
        while let Ok(event) = events.try_recv() {
            match event {
                MarketEvent::Offer(o) => offers.push(o.price.0),
                MarketEvent::Confirmation(c) => confirmations.push(c.winner.clone()),
                MarketEvent::SessionClosed => {}
            }
        }

        assert_eq!(offers, vec![30, 20, 10]);
        assert_eq!(confirmations, vec![None, None, None]);

        let record = results_rx.recv().await.unwrap();
        assert_eq!(record.lot_id, lot_id);
        assert!(!record.is_sale());
        assert_eq!(record.sale_price, None);

        assert_eq!(records.len(), 1);
        assert_eq!(bus.booth_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bid_wins_at_current_price() {
        let bus = Arc::new(MarketBus::new());
        let (results, _results_rx) = mpsc::unbounded_channel();
        let seller_id = SellerId::new();
        let lot = lot_for(&seller_id, 50, 10);

        let seller = SellerAgent::new(
            seller_id.clone(),
            vec![lot],
            PriceClock::new(StepPolicy::Fixed(Credits::new(5))).unwrap(),
            SellerConfig::default(),
            bus.clone(),
            results,
        )
        .unwrap();

        let mut events = bus.subscribe();
        let buyer_id = afslag_types::BuyerId::new();
        let bidder_bus = bus.clone();
        let bidder_id = buyer_id.clone();
        let bidder = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(MarketEvent::Offer(offer)) if offer.price <= Credits::new(40) => {
                        bidder_bus
                            .submit_bid(BidRequest {
                                buyer_id: bidder_id.clone(),
                                seller_id: offer.seller_id.clone(),
                                lot_id: offer.lot_id.clone(),
                                round: offer.round,
                                declared_budget: Credits::new(100),
                            })
                            .unwrap();
                    }
                    Ok(MarketEvent::Confirmation(c)) if c.is_sale() => return c,
                    Ok(_) => {}
                    Err(_) => panic!("feed closed before a sale"),
                }
            }
        });

        let records = seller.run().await.unwrap();
        let confirmation = bidder.await.unwrap();

        assert_eq!(confirmation.winner, Some(buyer_id.clone()));
        assert_eq!(confirmation.price, Credits::new(40));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sale_price, Some(Credits::new(40)));
        assert_eq!(records[0].winner, Some(buyer_id));
    }
}
