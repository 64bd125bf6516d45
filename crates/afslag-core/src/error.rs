//! Core protocol errors

use afslag_types::Credits;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Price step must be at least one credit")]
    ZeroStep,

    #[error("Jitter range is empty: min {min} exceeds max {max}")]
    EmptyJitterRange { min: Credits, max: Credits },
}

pub type Result<T> = std::result::Result<T, CoreError>;
