//! Afslag Core - Price movement and bid arbitration
//!
//! This crate implements the two rules of the descending-price protocol
//! that everything else hangs off:
//! - PriceClock: lowers a lot's asking price between rounds and discards
//!   the lot once the reserve cannot be held
//! - BidArbiter: resolves the bids collected in one round's window into
//!   at most one winner, in arrival order
//!
//! # Protocol Invariants
//!
//! 1. Prices strictly descend round over round
//! 2. No lot is ever offered below its reserve
//! 3. At most one bid wins a round; the earliest affordable bid wins

pub mod arbiter;
pub mod clock;
pub mod error;

pub use arbiter::*;
pub use clock::*;
pub use error::*;
