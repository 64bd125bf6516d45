//! Session errors

use afslag_agents::{BuyerError, SellerError};
use afslag_core::CoreError;
use afslag_types::TypeError;
use thiserror::Error;

/// Errors that can occur while running a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session configuration: {details}")]
    Config { details: String },

    #[error("Lot generation failed: {0}")]
    Types(#[from] TypeError),

    #[error("Price clock rejected: {0}")]
    Clock(#[from] CoreError),

    #[error("Seller failed: {0}")]
    Seller(#[from] SellerError),

    #[error("Buyer failed: {0}")]
    Buyer(#[from] BuyerError),

    #[error("Agent task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Session invariant violated: {details}")]
    Invariant { details: String },

    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
