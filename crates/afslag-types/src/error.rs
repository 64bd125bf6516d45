//! Foundation error types

use crate::credits::Credits;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeError {
    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("Unknown item kind: {value}")]
    UnknownItemKind { value: String },

    #[error("Reserve price {reserve} is above start price {start}")]
    ReserveAboveStart { start: Credits, reserve: Credits },
}

pub type Result<T> = std::result::Result<T, TypeError>;
