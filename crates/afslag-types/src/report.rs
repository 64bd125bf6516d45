//! Report records
//!
//! Rows for the two tables every run produces: the buyer setup table and
//! the transaction log, one row per closed lot in closure order.

use crate::credits::Credits;
use crate::identity::{BuyerId, LotId, SellerId};
use crate::item::ItemKind;
use serde::{Deserialize, Serialize};

/// One row of the setup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRecord {
    pub buyer_id: BuyerId,
    pub personality: String,
    pub preference: ItemKind,
    pub starting_budget: Credits,
}

/// One row of the transaction log
///
/// Unsold lots keep both the price and the winner empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub seller_id: SellerId,
    pub lot_id: LotId,
    pub kind: ItemKind,
    pub sale_price: Option<Credits>,
    pub winner: Option<BuyerId>,
}

impl TransactionRecord {
    pub fn sold(
        seller_id: SellerId,
        lot_id: LotId,
        kind: ItemKind,
        sale_price: Credits,
        winner: BuyerId,
    ) -> Self {
        Self {
            seller_id,
            lot_id,
            kind,
            sale_price: Some(sale_price),
            winner: Some(winner),
        }
    }

    pub fn discarded(seller_id: SellerId, lot_id: LotId, kind: ItemKind) -> Self {
        Self {
            seller_id,
            lot_id,
            kind,
            sale_price: None,
            winner: None,
        }
    }

    pub fn is_sale(&self) -> bool {
        self.winner.is_some()
    }
}
