//! Afslag Agents - The two sides of the fish market
//!
//! - **SellerAgent**: auctions its lots one at a time; calls a price,
//!   holds the round open for a bounded window, arbitrates what arrived,
//!   confirms, lowers the price
//! - **BuyerAgent**: watches the shared feed, answers offers through its
//!   brain, reserves credits while a bid is in flight
//!
//! # Key Principle
//!
//! **Budgets only move on confirmations.** A bid reserves credits on the
//! buyer's side; nothing is paid until the seller's confirmation names
//! that buyer as the winner of that round.

pub mod buyer;
pub mod seller;

pub use buyer::{BuyerAgent, BuyerError, BuyerState, Purchase};
pub use seller::{SellerAgent, SellerConfig, SellerError};
