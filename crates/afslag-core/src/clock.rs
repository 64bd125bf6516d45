//! Descending price clock
//!
//! Between rounds the clock lowers a lot's asking price by one step. When
//! the lowered price would undercut the reserve, the lot is discarded
//! instead: no lot is ever offered below its reserve.

use crate::error::{CoreError, Result};
use afslag_types::{Credits, Lot, LotState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How far the asking price drops between rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// The same decrement every round
    Fixed(Credits),
    /// A decrement drawn uniformly from `min..=max` each round
    Jittered { min: Credits, max: Credits },
}

/// What one clock tick did to a lot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The price was lowered to this value and a new round may open
    Lowered(Credits),
    /// The lot can no longer be priced at or above its reserve
    Exhausted,
}

/// Lowers lot prices between rounds
///
/// One clock serves all of a seller's lots; the only state it carries is
/// the RNG behind jittered steps.
#[derive(Debug)]
pub struct PriceClock {
    policy: StepPolicy,
    rng: StdRng,
}

impl PriceClock {
    pub fn new(policy: StepPolicy) -> Result<Self> {
        Self::validate(policy)?;
        Ok(Self {
            policy,
            rng: StdRng::from_entropy(),
        })
    }

    /// A clock with a seeded RNG, for reproducible jittered runs
    pub fn seeded(policy: StepPolicy, seed: u64) -> Result<Self> {
        Self::validate(policy)?;
        Ok(Self {
            policy,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    fn validate(policy: StepPolicy) -> Result<()> {
        match policy {
            StepPolicy::Fixed(step) if step.is_zero() => Err(CoreError::ZeroStep),
            StepPolicy::Jittered { min, .. } if min.is_zero() => Err(CoreError::ZeroStep),
            StepPolicy::Jittered { min, max } if min > max => {
                Err(CoreError::EmptyJitterRange { min, max })
            }
            _ => Ok(()),
        }
    }

    fn next_step(&mut self) -> Credits {
        match self.policy {
            StepPolicy::Fixed(step) => step,
            StepPolicy::Jittered { min, max } => Credits::new(self.rng.gen_range(min.0..=max.0)),
        }
    }

    /// Whether the next tick is certain to discard the lot
    ///
    /// True once the lot is terminal, or when even the smallest step the
    /// policy can draw would undercut the reserve. The current price may
    /// still be offered one last time before that tick.
    pub fn is_exhausted(&self, lot: &Lot) -> bool {
        if !lot.is_open() {
            return true;
        }
        let min_step = match self.policy {
            StepPolicy::Fixed(step) => step,
            StepPolicy::Jittered { min, .. } => min,
        };
        let lowered = lot.current_price.saturating_sub(min_step);
        lowered < lot.reserve_price || lowered == lot.current_price
    }

    /// Lower the lot's asking price by one step, or exhaust the lot
    ///
    /// A lot in a terminal state is never touched. An open lot whose
    /// lowered price would fall below the reserve is marked `Discarded`
    /// in place and `Exhausted` is returned.
    pub fn tick(&mut self, lot: &mut Lot) -> TickOutcome {
        if !lot.is_open() {
            return TickOutcome::Exhausted;
        }
        let step = self.next_step();
        let lowered = lot.current_price.saturating_sub(step);
        if lowered >= lot.reserve_price && lowered < lot.current_price {
            lot.current_price = lowered;
            TickOutcome::Lowered(lowered)
        } else {
            lot.state = LotState::Discarded;
            tracing::debug!(
                lot_id = %lot.lot_id,
                reserve = %lot.reserve_price,
                "Price clock exhausted, lot discarded"
            );
            TickOutcome::Exhausted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afslag_types::{ItemKind, SellerId};

    fn lot(start: u64, reserve: u64) -> Lot {
        Lot::new(
            SellerId::new(),
            ItemKind::Hake,
            Credits::new(start),
            Credits::new(reserve),
        )
        .unwrap()
    }

    #[test]
    fn test_fixed_descent_to_reserve() {
        let mut clock = PriceClock::new(StepPolicy::Fixed(Credits::new(10))).unwrap();
        let mut lot = lot(50, 20);

        assert_eq!(clock.tick(&mut lot), TickOutcome::Lowered(Credits::new(40)));
        assert_eq!(clock.tick(&mut lot), TickOutcome::Lowered(Credits::new(30)));
        assert_eq!(clock.tick(&mut lot), TickOutcome::Lowered(Credits::new(20)));
        assert_eq!(lot.current_price, Credits::new(20));

        // 20 - 10 = 10 would undercut the reserve of 20
        assert_eq!(clock.tick(&mut lot), TickOutcome::Exhausted);
        assert_eq!(lot.state, LotState::Discarded);
        assert_eq!(lot.current_price, Credits::new(20));
    }

    #[test]
    fn test_price_never_below_reserve() {
        let mut clock = PriceClock::new(StepPolicy::Fixed(Credits::new(7))).unwrap();
        let mut lot = lot(30, 10);

        loop {
            match clock.tick(&mut lot) {
                TickOutcome::Lowered(price) => assert!(price >= lot.reserve_price),
                TickOutcome::Exhausted => break,
            }
        }
        assert_eq!(lot.state, LotState::Discarded);
    }

    #[test]
    fn test_jittered_steps_within_bounds() {
        let policy = StepPolicy::Jittered {
            min: Credits::new(2),
            max: Credits::new(6),
        };
        let mut clock = PriceClock::seeded(policy, 42).unwrap();
        let mut lot = lot(100, 10);
        let mut previous = lot.current_price;

        while let TickOutcome::Lowered(price) = clock.tick(&mut lot) {
            let drop = previous.0 - price.0;
            assert!((2..=6).contains(&drop));
            previous = price;
        }
    }

    #[test]
    fn test_zero_step_rejected() {
        assert!(matches!(
            PriceClock::new(StepPolicy::Fixed(Credits::zero())),
            Err(CoreError::ZeroStep)
        ));
        assert!(matches!(
            PriceClock::new(StepPolicy::Jittered {
                min: Credits::zero(),
                max: Credits::new(5),
            }),
            Err(CoreError::ZeroStep)
        ));
    }

    #[test]
    fn test_empty_jitter_range_rejected() {
        let policy = StepPolicy::Jittered {
            min: Credits::new(8),
            max: Credits::new(3),
        };
        assert!(matches!(
            PriceClock::new(policy),
            Err(CoreError::EmptyJitterRange { .. })
        ));
    }

    #[test]
    fn test_closed_lot_never_mutated() {
        let mut clock = PriceClock::new(StepPolicy::Fixed(Credits::new(5))).unwrap();
        let mut lot = lot(40, 10);
        lot.state = LotState::Sold;

        assert_eq!(clock.tick(&mut lot), TickOutcome::Exhausted);
        assert_eq!(lot.state, LotState::Sold);
        assert_eq!(lot.current_price, Credits::new(40));
    }

    #[test]
    fn test_exhaustion_is_visible_before_the_final_tick() {
        let mut clock = PriceClock::new(StepPolicy::Fixed(Credits::new(10))).unwrap();

        // Start at the reserve: one offer goes out, but the clock is already done.
        let floor = lot(20, 20);
        assert!(clock.is_exhausted(&floor));

        let mut fresh = lot(30, 10);
        assert!(!clock.is_exhausted(&fresh));

        assert_eq!(
            clock.tick(&mut fresh),
            TickOutcome::Lowered(Credits::new(20))
        );
        assert!(!clock.is_exhausted(&fresh));
        assert_eq!(
            clock.tick(&mut fresh),
            TickOutcome::Lowered(Credits::new(10))
        );
        assert!(clock.is_exhausted(&fresh));

        let mut sold = lot(50, 10);
        sold.state = LotState::Sold;
        assert!(clock.is_exhausted(&sold));
    }
}
