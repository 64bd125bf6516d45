//! Afslag Types - Canonical domain types for the descending-price auction
//!
//! This crate contains all foundational types for afslag with zero dependencies
//! on other afslag crates. It defines the complete type system for:
//!
//! - Identity types (SellerId, BuyerId, LotId, SessionId)
//! - Credit amounts and round counters
//! - The item catalogue and lots
//! - Wire messages (Offer, BidRequest, SaleConfirmation)
//! - Report records for the result sink
//!
//! # Protocol Invariants
//!
//! These types support the core auction invariants:
//!
//! 1. A lot's price never increases and never drops below its reserve while open
//! 2. At most one sale confirmation with a winner is issued per lot
//! 3. A buyer's budget never goes negative

pub mod credits;
pub mod error;
pub mod identity;
pub mod item;
pub mod lot;
pub mod message;
pub mod report;

pub use credits::*;
pub use error::*;
pub use identity::*;
pub use item::*;
pub use lot::*;
pub use message::*;
pub use report::*;
