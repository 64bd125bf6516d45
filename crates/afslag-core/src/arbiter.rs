//! Bid arbitration
//!
//! Resolves the bids a seller collected during one round's window into at
//! most one winner. Arrival order is the only tie-break: the earliest bid
//! whose declared budget covers the asking price wins the round.

use afslag_types::{BidRequest, Lot, Round};
use std::collections::HashSet;

/// Stateless first-come arbitration over a round's collected bids
#[derive(Debug, Default, Clone, Copy)]
pub struct BidArbiter;

impl BidArbiter {
    pub fn new() -> Self {
        Self
    }

    /// Pick the winning bid for `lot` at `round`, if any
    ///
    /// Bids addressed to another lot or carrying a stale round are
    /// skipped. Repeat bids from one buyer count once, at their first
    /// arrival. A bid whose declared budget is below the asking price
    /// never wins, whatever its position in the queue.
    pub fn resolve<'a>(
        &self,
        lot: &Lot,
        round: Round,
        bids: &'a [BidRequest],
    ) -> Option<&'a BidRequest> {
        let mut seen = HashSet::new();
        for bid in bids {
            if bid.lot_id != lot.lot_id || bid.seller_id != lot.seller_id {
                tracing::debug!(
                    buyer_id = %bid.buyer_id,
                    lot_id = %bid.lot_id,
                    "Skipping bid addressed to another lot"
                );
                continue;
            }
            if bid.round != round {
                tracing::debug!(
                    buyer_id = %bid.buyer_id,
                    bid_round = %bid.round,
                    round = %round,
                    "Skipping bid from a stale round"
                );
                continue;
            }
            if !seen.insert(&bid.buyer_id) {
                tracing::debug!(buyer_id = %bid.buyer_id, "Skipping repeat bid");
                continue;
            }
            if bid.declared_budget < lot.current_price {
                tracing::debug!(
                    buyer_id = %bid.buyer_id,
                    declared = %bid.declared_budget,
                    price = %lot.current_price,
                    "Skipping bid below the asking price"
                );
                continue;
            }
            return Some(bid);
        }
        None
    }
}
