//! Session parameters and their validation

use std::time::Duration;

use afslag_types::Credits;

use crate::error::{Result, SessionError};

/// Everything a market day needs to be set up
///
/// Lot prices are drawn uniformly from the configured ranges. When a
/// drawn start price lands below the drawn reserve, the start is
/// lifted above the reserve so the lot still descends.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sellers: usize,
    pub buyers: usize,
    pub lots_per_seller: usize,
    pub starting_budget: Credits,
    pub start_price_min: Credits,
    pub start_price_max: Credits,
    pub reserve_price_min: Credits,
    pub reserve_price_max: Credits,
    pub price_step: Credits,
    pub collection_window: Duration,
    pub decision_timeout: Duration,
    /// Seeds lot generation and preference draws, not task scheduling
    pub seed: Option<u64>,
    /// Route buyer decisions through the configured LLM backend
    pub llm: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sellers: 2,
            buyers: 3,
            lots_per_seller: 4,
            starting_budget: Credits::new(100),
            start_price_min: Credits::new(40),
            start_price_max: Credits::new(60),
            reserve_price_min: Credits::new(5),
            reserve_price_max: Credits::new(15),
            price_step: Credits::new(5),
            collection_window: Duration::from_millis(200),
            decision_timeout: Duration::from_secs(2),
            seed: None,
            llm: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sellers == 0 {
            return Err(SessionError::Config {
                details: "at least one seller is required".to_string(),
            });
        }
        if self.buyers == 0 {
            return Err(SessionError::Config {
                details: "at least one buyer is required".to_string(),
            });
        }
        if self.lots_per_seller == 0 {
            return Err(SessionError::Config {
                details: "each seller needs at least one lot".to_string(),
            });
        }
        if self.price_step.is_zero() {
            return Err(SessionError::Config {
                details: "price step must be at least one credit".to_string(),
            });
        }
        if self.start_price_min > self.start_price_max {
            return Err(SessionError::Config {
                details: format!(
                    "start price range {}..{} is empty",
                    self.start_price_min, self.start_price_max
                ),
            });
        }
        if self.reserve_price_min > self.reserve_price_max {
            return Err(SessionError::Config {
                details: format!(
                    "reserve price range {}..{} is empty",
                    self.reserve_price_min, self.reserve_price_max
                ),
            });
        }
        if self.collection_window.is_zero() {
            return Err(SessionError::Config {
                details: "collection window must be longer than zero".to_string(),
            });
        }
        Ok(())
    }
}
