//! Runs a market day end to end and audits the outcome

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use afslag_agents::{BuyerAgent, BuyerState, SellerAgent, SellerConfig};
use afslag_brain::{MerchantBrain, Personality};
use afslag_core::{PriceClock, StepPolicy};
use afslag_market::MarketBus;
use afslag_types::{
    BuyerId, Credits, ItemKind, Lot, LotId, MarketEvent, SellerId, SessionId, SetupRecord,
    TransactionRecord,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// Everything a finished session leaves behind
#[derive(Debug)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub setup: Vec<SetupRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub buyers: Vec<BuyerState>,
    pub sold: usize,
    pub discarded: usize,
}

/// One market day: agents spawned, run, joined, and audited
pub struct AuctionSession {
    config: SessionConfig,
}

impl AuctionSession {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the whole day to completion
    ///
    /// Buyers are built first so their feed subscriptions predate the
    /// first offer. Sellers stream settled lots into the results
    /// channel; when the last seller hangs up, the market closes and
    /// the buyers are joined for their final accounts.
    pub async fn run(self) -> Result<SessionOutcome> {
        self.config.validate()?;
        let session_id = SessionId::new();
        tracing::info!(
            session_id = %session_id,
            sellers = self.config.sellers,
            buyers = self.config.buyers,
            lots_per_seller = self.config.lots_per_seller,
            llm = self.config.llm,
            "Opening the market"
        );

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bus = Arc::new(MarketBus::new());
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();

        let mut setup = Vec::with_capacity(self.config.buyers);
        let mut buyer_agents = Vec::with_capacity(self.config.buyers);
        for slot in 0..self.config.buyers {
            let personality = Personality::BUILTIN[slot % Personality::BUILTIN.len()].clone();
            let preference = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
            let brain = if self.config.llm {
                MerchantBrain::from_env().with_deadline(self.config.decision_timeout)
            } else {
                MerchantBrain::deterministic()
            };
            let agent = BuyerAgent::new(
                personality,
                preference,
                self.config.starting_budget,
                brain,
                bus.clone(),
            );
            setup.push(SetupRecord {
                buyer_id: agent.id().clone(),
                personality: agent.personality().label().to_string(),
                preference,
                starting_budget: self.config.starting_budget,
            });
            buyer_agents.push(agent);
        }

        let mut seller_agents = Vec::with_capacity(self.config.sellers);
        for _ in 0..self.config.sellers {
            let seller_id = SellerId::new();
            let mut lots = Vec::with_capacity(self.config.lots_per_seller);
            for _ in 0..self.config.lots_per_seller {
                lots.push(self.draw_lot(&mut rng, &seller_id)?);
            }
            let clock = PriceClock::seeded(StepPolicy::Fixed(self.config.price_step), rng.gen())?;
            let agent = SellerAgent::new(
                seller_id,
                lots,
                clock,
                SellerConfig {
                    collection_window: self.config.collection_window,
                },
                bus.clone(),
                results_tx.clone(),
            )?;
            seller_agents.push(agent);
        }
        // The drain below ends when the last seller hangs up
        drop(results_tx);

        let buyer_handles: Vec<_> = buyer_agents
            .into_iter()
            .map(|buyer| tokio::spawn(buyer.run()))
            .collect();
        let seller_handles: Vec<_> = seller_agents
            .into_iter()
            .map(|seller| tokio::spawn(seller.run()))
            .collect();

        let mut transactions = Vec::new();
        while let Some(record) = results_rx.recv().await {
            transactions.push(record);
        }
        for handle in seller_handles {
            handle.await??;
        }

        bus.publish(MarketEvent::SessionClosed);
        let mut buyers = Vec::with_capacity(buyer_handles.len());
        for joined in futures::future::join_all(buyer_handles).await {
            buyers.push(joined??);
        }

        verify(&setup, &transactions, &buyers)?;

        let sold = transactions.iter().filter(|t| t.is_sale()).count();
        let discarded = transactions.len() - sold;
        let revenue: Credits = transactions.iter().filter_map(|t| t.sale_price).sum();
        tracing::info!(
            session_id = %session_id,
            sold,
            discarded,
            revenue = %revenue,
            "Market closed"
        );

        Ok(SessionOutcome {
            session_id,
            setup,
            transactions,
            buyers,
            sold,
            discarded,
        })
    }

    fn draw_lot(&self, rng: &mut StdRng, seller_id: &SellerId) -> Result<Lot> {
        let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
        let reserve = Credits::new(rng.gen_range(
            self.config.reserve_price_min.0..=self.config.reserve_price_max.0,
        ));
        let mut start = Credits::new(rng.gen_range(
            self.config.start_price_min.0..=self.config.start_price_max.0,
        ));
        if start < reserve {
            // Lift the start so the lot has a descent to walk
            start = reserve
                .checked_add(self.config.price_step.times(2))
                .unwrap_or(reserve);
        }
        Ok(Lot::new(seller_id.clone(), kind, start, reserve)?)
    }
}

/// Audit the finished day against the buyers' own accounts
fn verify(
    setup: &[SetupRecord],
    transactions: &[TransactionRecord],
    buyers: &[BuyerState],
) -> Result<()> {
    let known: HashSet<&BuyerId> = setup.iter().map(|record| &record.buyer_id).collect();
    let mut seen_lots: HashSet<&LotId> = HashSet::new();
    let mut spent_by_winner: HashMap<&BuyerId, Credits> = HashMap::new();

    for record in transactions {
        if !seen_lots.insert(&record.lot_id) {
            return Err(SessionError::Invariant {
                details: format!("lot {} settled more than once", record.lot_id),
            });
        }
        if let Some(winner) = &record.winner {
            if !known.contains(winner) {
                return Err(SessionError::Invariant {
                    details: format!("winner {} is not a registered buyer", winner),
                });
            }
            let price = match record.sale_price {
                Some(price) => price,
                None => {
                    return Err(SessionError::Invariant {
                        details: format!("lot {} has a winner but no sale price", record.lot_id),
                    })
                }
            };
            let entry = spent_by_winner.entry(winner).or_default();
            *entry = entry
                .checked_add(price)
                .ok_or_else(|| SessionError::Invariant {
                    details: format!("credits overflow adding up wins for {}", winner),
                })?;
        }
    }

    for state in buyers {
        let spent = spent_by_winner
            .get(&state.buyer_id)
            .copied()
            .unwrap_or_default();
        let drawn = state
            .starting_budget
            .checked_sub(state.budget)
            .ok_or_else(|| SessionError::Invariant {
                details: format!("buyer {} ended above its starting budget", state.buyer_id),
            })?;
        if drawn != spent {
            return Err(SessionError::Invariant {
                details: format!(
                    "buyer {} drew {} from its budget but the ledger shows {}",
                    state.buyer_id, drawn, spent
                ),
            });
        }
        let held: Credits = state.purchases.iter().map(|p| p.price).sum();
        if held != spent {
            return Err(SessionError::Invariant {
                details: format!(
                    "buyer {} holds {} in purchases but paid {}",
                    state.buyer_id, held, spent
                ),
            });
        }
    }
    Ok(())
}
