//! Afslag Session - One full market day from open to settled
//!
//! This crate wires the agents together and runs them to completion:
//!
//! - **Config**: how many sellers and buyers, lot generation ranges,
//!   pacing, and the optional LLM decision backend
//! - **Session**: builds the bus, spawns every agent, drains the
//!   transaction feed, closes the market, and audits the outcome
//! - **Report**: writes the setup and transaction CSV files
//!
//! # Key Principle
//!
//! **The session trusts nothing it did not audit.** After the agents
//! finish, every settled lot, every winner, and every credit moved is
//! checked against the buyers' own accounts before the outcome is
//! returned.

pub mod config;
pub mod error;
pub mod report;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use report::{write_reports, ReportPaths};
pub use session::{AuctionSession, SessionOutcome};
