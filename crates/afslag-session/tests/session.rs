//! Whole market days run end to end
//!
//! Scheduling decides who wins a given lot, so these tests hold the
//! session to its structural guarantees instead of naming winners.

use std::collections::HashSet;

use afslag_session::{write_reports, AuctionSession, SessionConfig, SessionError};

#[tokio::test(start_paused = true)]
async fn test_every_lot_settles_exactly_once() {
    let config = SessionConfig {
        sellers: 2,
        buyers: 3,
        lots_per_seller: 2,
        seed: Some(42),
        ..SessionConfig::default()
    };
    let outcome = AuctionSession::new(config).run().await.unwrap();

    assert_eq!(outcome.setup.len(), 3);
    assert_eq!(outcome.transactions.len(), 4);
    let lots: HashSet<_> = outcome
        .transactions
        .iter()
        .map(|t| t.lot_id.clone())
        .collect();
    assert_eq!(lots.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_credits_are_conserved() {
    let config = SessionConfig {
        sellers: 2,
        buyers: 4,
        lots_per_seller: 3,
        seed: Some(7),
        ..SessionConfig::default()
    };
    let outcome = AuctionSession::new(config).run().await.unwrap();

    let spent: u64 = outcome
        .buyers
        .iter()
        .map(|b| b.starting_budget.0 - b.budget.0)
        .sum();
    let revenue: u64 = outcome
        .transactions
        .iter()
        .filter_map(|t| t.sale_price)
        .map(|p| p.0)
        .sum();
    assert_eq!(spent, revenue);
}

#[tokio::test(start_paused = true)]
async fn test_winners_come_from_the_register() {
    let config = SessionConfig {
        sellers: 2,
        buyers: 3,
        lots_per_seller: 2,
        seed: Some(3),
        ..SessionConfig::default()
    };
    let outcome = AuctionSession::new(config.clone()).run().await.unwrap();

    let registered: HashSet<_> = outcome
        .setup
        .iter()
        .map(|s| s.buyer_id.clone())
        .collect();
    for record in &outcome.transactions {
        if let Some(winner) = &record.winner {
            assert!(registered.contains(winner));
        }
        if let Some(price) = record.sale_price {
            assert!(price >= config.reserve_price_min);
            assert!(price <= config.start_price_max);
        }
    }
}

#[tokio::test]
async fn test_invalid_config_rejected_before_spawning() {
    let config = SessionConfig {
        buyers: 0,
        ..SessionConfig::default()
    };
    let err = AuctionSession::new(config).run().await.unwrap_err();
    assert!(matches!(err, SessionError::Config { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_reports_follow_a_finished_session() {
    let config = SessionConfig {
        sellers: 1,
        buyers: 2,
        lots_per_seller: 2,
        seed: Some(11),
        ..SessionConfig::default()
    };
    let outcome = AuctionSession::new(config).run().await.unwrap();

    let dir = std::env::temp_dir().join(format!("afslag-session-{}", outcome.session_id));
    let paths = write_reports(&dir, &outcome.setup, &outcome.transactions).unwrap();

    let log = std::fs::read_to_string(&paths.log).unwrap();
    assert_eq!(log.lines().count(), 1 + outcome.transactions.len());
    let setup = std::fs::read_to_string(&paths.setup).unwrap();
    assert_eq!(setup.lines().count(), 1 + outcome.setup.len());
    std::fs::remove_dir_all(&dir).ok();
}
