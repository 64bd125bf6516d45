//! Afslag Brain - Buyer decision functions
//!
//! Every buyer answers one question per offer: bid now or let the price
//! fall further. This crate hosts both ways of answering it:
//! - Personality rule tables: deterministic, instant, the default
//! - LLM mode: the personality's system prompt, one offer per request,
//!   every reply validated before a bid can come out of it
//!
//! # Key Principle
//!
//! **A decision function may SUGGEST a bid, never place one.** The buyer
//! still runs the affordability pre-check on every BUY, and a decision
//! backend that fails or stalls reads as WAIT for that offer.

pub mod brain;
pub mod decision;
pub mod guard;
pub mod personality;

pub use brain::*;
pub use decision::*;
pub use guard::*;
pub use personality::*;
