//! End-to-end auction rounds between real seller and buyer tasks
//!
//! Paused time makes the collection windows deterministic: the clock
//! only advances once every task has gone idle, so a buyer that bids
//! on an offer always lands inside that offer's window.

use std::sync::Arc;

use afslag_agents::{BuyerAgent, SellerAgent, SellerConfig};
use afslag_brain::{Decision, DecisionContext, MerchantBrain, Personality};
use afslag_core::{PriceClock, StepPolicy};
use afslag_market::MarketBus;
use afslag_types::{Credits, ItemKind, Lot, MarketEvent, SellerId, TransactionRecord};
use tokio::sync::mpsc;

fn always_buy() -> Personality {
    Personality::Custom(Arc::new(|_: &DecisionContext| Decision::buy("take it")))
}

fn always_wait() -> Personality {
    Personality::Custom(Arc::new(|_: &DecisionContext| Decision::wait("never")))
}

fn buyer(bus: &Arc<MarketBus>, personality: Personality, budget: u64) -> BuyerAgent {
    BuyerAgent::new(
        personality,
        ItemKind::Hake,
        Credits::new(budget),
        MerchantBrain::deterministic(),
        bus.clone(),
    )
}

fn seller(
    bus: &Arc<MarketBus>,
    lots: Vec<Lot>,
) -> (SellerAgent, mpsc::UnboundedReceiver<TransactionRecord>) {
    let seller_id = lots[0].seller_id.clone();
    let (results, results_rx) = mpsc::unbounded_channel();
    let clock = PriceClock::new(StepPolicy::Fixed(Credits::new(10))).unwrap();
    let agent = SellerAgent::new(
        seller_id,
        lots,
        clock,
        SellerConfig::default(),
        bus.clone(),
        results,
    )
    .unwrap();
    (agent, results_rx)
}

fn lot(seller_id: &SellerId, start: u64, reserve: u64) -> Lot {
    Lot::new(
        seller_id.clone(),
        ItemKind::Hake,
        Credits::new(start),
        Credits::new(reserve),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_price_descends_until_the_buyer_can_pay() {
    let bus = Arc::new(MarketBus::new());
    let bidder = buyer(&bus, always_buy(), 50);
    let buyer_id = bidder.id().clone();
    let seller_id = SellerId::new();
    let (auctioneer, _results_rx) = seller(&bus, vec![lot(&seller_id, 100, 20)]);

    let buyer_handle = tokio::spawn(bidder.run());
    let records = auctioneer.run().await.unwrap();
    bus.publish(MarketEvent::SessionClosed);
    let state = buyer_handle.await.unwrap().unwrap();

    // 100, 90, 80, 70, 60 are all beyond the budget; 50 is not
    assert_eq!(records.len(), 1);
    assert!(records[0].is_sale());
    assert_eq!(records[0].sale_price, Some(Credits::new(50)));
    assert_eq!(records[0].winner, Some(buyer_id));
    assert_eq!(state.budget, Credits::zero());
    assert_eq!(state.purchases.len(), 1);
    assert_eq!(state.purchases[0].price, Credits::new(50));
}

#[tokio::test(start_paused = true)]
async fn test_silent_market_discards_at_the_reserve() {
    let bus = Arc::new(MarketBus::new());
    let bystander = buyer(&bus, always_wait(), 100);
    let seller_id = SellerId::new();
    let (auctioneer, _results_rx) = seller(&bus, vec![lot(&seller_id, 30, 20)]);
    let mut events = bus.subscribe();

    let buyer_handle = tokio::spawn(bystander.run());
    let records = auctioneer.run().await.unwrap();
    bus.publish(MarketEvent::SessionClosed);
    let state = buyer_handle.await.unwrap().unwrap();

    assert_eq!(records.len(), 1);
    assert!(!records[0].is_sale());
    assert_eq!(records[0].sale_price, None);
    assert_eq!(state.budget, Credits::new(100));
    assert!(state.purchases.is_empty());

    let mut offers = Vec::new();
    let mut confirmations = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            MarketEvent::Offer(offer) => offers.push(offer.price),
            MarketEvent::Confirmation(c) => confirmations.push(c.winner),
            MarketEvent::SessionClosed => {}
        }
    }
    // 10 would undercut the reserve of 20, so the last offer is 20
    assert_eq!(offers, vec![Credits::new(30), Credits::new(20)]);
    // Every silent round still gets its closing word
    assert_eq!(confirmations, vec![None, None]);
}

#[tokio::test(start_paused = true)]
async fn test_rival_bids_settle_on_exactly_one_winner() {
    let bus = Arc::new(MarketBus::new());
    let first = buyer(&bus, always_buy(), 100);
    let second = buyer(&bus, always_buy(), 100);
    let seller_id = SellerId::new();
    let (auctioneer, _results_rx) = seller(&bus, vec![lot(&seller_id, 40, 10)]);

    let first_handle = tokio::spawn(first.run());
    let second_handle = tokio::spawn(second.run());
    let records = auctioneer.run().await.unwrap();
    bus.publish(MarketEvent::SessionClosed);
    let first_state = first_handle.await.unwrap().unwrap();
    let second_state = second_handle.await.unwrap().unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].is_sale());
    assert_eq!(records[0].sale_price, Some(Credits::new(40)));

    let winners = [&first_state, &second_state]
        .iter()
        .filter(|s| !s.purchases.is_empty())
        .count();
    assert_eq!(winners, 1);
    let spent: u64 = first_state.starting_budget.0 - first_state.budget.0
        + second_state.starting_budget.0
        - second_state.budget.0;
    assert_eq!(spent, 40);
}

#[tokio::test(start_paused = true)]
async fn test_reserve_above_every_wallet_never_sells() {
    let bus = Arc::new(MarketBus::new());
    let broke = buyer(&bus, always_buy(), 15);
    let seller_id = SellerId::new();
    // One round at 20, then the step would cross the reserve
    let (auctioneer, _results_rx) = seller(&bus, vec![lot(&seller_id, 20, 20)]);

    let buyer_handle = tokio::spawn(broke.run());
    let records = auctioneer.run().await.unwrap();
    bus.publish(MarketEvent::SessionClosed);
    let state = buyer_handle.await.unwrap().unwrap();

    assert_eq!(records.len(), 1);
    assert!(!records[0].is_sale());
    assert_eq!(state.budget, Credits::new(15));
    assert!(state.purchases.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reservation_keeps_one_wallet_out_of_two_auctions() {
    let bus = Arc::new(MarketBus::new());
    // Enough for either lot alone, nowhere near both
    let bidder = buyer(&bus, always_buy(), 60);
    let first_seller = SellerId::new();
    let second_seller = SellerId::new();
    // Both lots offer a single round at 50, then discard
    let (first, _first_rx) = seller(&bus, vec![lot(&first_seller, 50, 45)]);
    let (second, _second_rx) = seller(&bus, vec![lot(&second_seller, 50, 45)]);

    let buyer_handle = tokio::spawn(bidder.run());
    let first_handle = tokio::spawn(first.run());
    let second_handle = tokio::spawn(second.run());
    let first_records = first_handle.await.unwrap().unwrap();
    let second_records = second_handle.await.unwrap().unwrap();
    bus.publish(MarketEvent::SessionClosed);
    let state = buyer_handle.await.unwrap().unwrap();

    // Whichever offer arrived first took the whole available budget
    let sales = first_records[0].is_sale() as usize + second_records[0].is_sale() as usize;
    assert_eq!(sales, 1);
    assert_eq!(state.purchases.len(), 1);
    assert_eq!(state.purchases[0].price, Credits::new(50));
    assert_eq!(state.budget, Credits::new(10));
}

#[tokio::test(start_paused = true)]
async fn test_seller_works_through_its_whole_catalogue() {
    let bus = Arc::new(MarketBus::new());
    let bidder = buyer(&bus, always_buy(), 100);
    let seller_id = SellerId::new();
    let (auctioneer, _results_rx) = seller(
        &bus,
        vec![
            lot(&seller_id, 40, 10),
            lot(&seller_id, 30, 25),
            lot(&seller_id, 20, 10),
        ],
    );

    let buyer_handle = tokio::spawn(bidder.run());
    let records = auctioneer.run().await.unwrap();
    bus.publish(MarketEvent::SessionClosed);
    let state = buyer_handle.await.unwrap().unwrap();

    // Lots go one at a time, in order, each to its own record
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].sale_price, Some(Credits::new(40)));
    assert_eq!(records[1].sale_price, Some(Credits::new(30)));
    assert_eq!(records[2].sale_price, Some(Credits::new(20)));
    assert_eq!(state.budget, Credits::new(10));
    assert_eq!(state.purchases.len(), 3);
}
