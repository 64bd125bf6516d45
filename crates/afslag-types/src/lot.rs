//! Lots
//!
//! A lot is one item moving through the descending-price rounds. It is
//! owned exclusively by its seller; nothing outside the seller's task
//! ever holds a mutable reference to it.

use crate::credits::Credits;
use crate::error::TypeError;
use crate::identity::{LotId, SellerId};
use crate::item::ItemKind;
use serde::{Deserialize, Serialize};

/// Lifecycle of a lot. `Sold` and `Discarded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotState {
    Open,
    Sold,
    Discarded,
}

impl LotState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// An item offered for sale through descending price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub lot_id: LotId,
    pub seller_id: SellerId,
    pub kind: ItemKind,
    pub start_price: Credits,
    pub reserve_price: Credits,
    pub current_price: Credits,
    pub state: LotState,
}

impl Lot {
    /// Create an open lot. The reserve price must not exceed the start price.
    pub fn new(
        seller_id: SellerId,
        kind: ItemKind,
        start_price: Credits,
        reserve_price: Credits,
    ) -> Result<Self, TypeError> {
        if reserve_price > start_price {
            return Err(TypeError::ReserveAboveStart {
                start: start_price,
                reserve: reserve_price,
            });
        }
        Ok(Self {
            lot_id: LotId::new(),
            seller_id,
            kind,
            start_price,
            reserve_price,
            current_price: start_price,
            state: LotState::Open,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state == LotState::Open
    }
}
