use chrono::Utc;
use uuid::Uuid;
use vehicle_auctions::domain::{Auction, AuctionStatus, BidEntry};
use vehicle_auctions::money::AmountValue;
use vehicle_auctions::payment::{BidPayment, PaymentKind, PaymentStatus};
use vehicle_auctions::persistence::Database;
use vehicle_auctions::stats;
#[path = "utils/mod.rs"]
mod utils;
use utils::*;

fn bid(bidder: &str, amount: AmountValue) -> BidEntry {
    BidEntry {
        bidder: bidder.to_string(),
        amount: usd(amount),
        at: sample_bid_time(),
        buy_now: false,
    }
}

fn commission_payment(auction_id: i64, bidder: &str, total: AmountValue, status: PaymentStatus) -> BidPayment {
    let now = Utc::now();
    BidPayment {
        payment_id: Uuid::new_v4(),
        auction_id,
        bidder: bidder.to_string(),
        bid_amount: usd(total * 20),
        commission_amount: usd(total),
        total_amount: usd(total),
        intent_ref: format!("hold_{}", Uuid::new_v4().simple()),
        status,
        kind: PaymentKind::FinalCommission,
        created_at: now,
        updated_at: now,
    }
}

fn seeded_database() -> Database {
    let db = Database::new();

    // Resolved sale in "cars"
    db.create_auction(Auction {
        status: AuctionStatus::Sold,
        bids: vec![bid("buyer_1", 1050), bid("buyer_2", 1100), bid("buyer_1", 1150)],
        bid_count: 3,
        current_price: usd(1150),
        current_bidder: Some("buyer_1".to_string()),
        winner: Some("buyer_1".to_string()),
        final_price: Some(usd(1150)),
        ..sample_auction()
    });

    // Still running in "cars"
    db.create_auction(Auction {
        bids: vec![bid("buyer_2", 1050)],
        bid_count: 1,
        current_price: usd(1050),
        current_bidder: Some("buyer_2".to_string()),
        ..sample_auction()
    });

    // Unsold motorcycle with an unmet reserve
    db.create_auction(Auction {
        category: "motorcycles".to_string(),
        status: AuctionStatus::ReserveNotMet,
        reserve_price: usd(2000),
        bids: vec![bid("buyer_1", 1500)],
        bid_count: 1,
        current_price: usd(1500),
        current_bidder: Some("buyer_1".to_string()),
        ..sample_auction()
    });

    // 5% of 1150; the failed charge must not count as revenue
    db.insert_payment(commission_payment(1, "buyer_1", 57, PaymentStatus::Succeeded));
    db.insert_payment(commission_payment(3, "buyer_1", 10, PaymentStatus::ProcessingFailed));

    db
}

#[test]
fn test_marketplace_totals() {
    let db = seeded_database();
    let stats = stats::marketplace_stats(&db);

    assert_eq!(stats.total_auctions, 3);
    assert_eq!(stats.active_auctions, 1);
    assert_eq!(stats.sold_auctions, 1);
    assert_eq!(stats.total_bids, 5);
}

#[test]
fn test_revenue_counts_only_succeeded_commissions() {
    let db = seeded_database();
    let stats = stats::marketplace_stats(&db);

    assert_eq!(stats.revenue.get("USD"), Some(&57));
    assert_eq!(stats.revenue.len(), 1);
}

#[test]
fn test_average_sale_price_per_currency() {
    let db = seeded_database();
    let stats = stats::marketplace_stats(&db);

    assert_eq!(stats.average_sale_price.get("USD"), Some(&1150.0));
}

#[test]
fn test_category_breakdown() {
    let db = seeded_database();
    let stats = stats::marketplace_stats(&db);

    assert_eq!(stats.categories.len(), 2);
    let cars = stats
        .categories
        .iter()
        .find(|c| c.category == "cars")
        .unwrap();
    assert_eq!(cars.auctions, 2);
    assert_eq!(cars.sold, 1);
    assert_eq!(cars.total_bids, 4);

    let motorcycles = stats
        .categories
        .iter()
        .find(|c| c.category == "motorcycles")
        .unwrap();
    assert_eq!(motorcycles.auctions, 1);
    assert_eq!(motorcycles.sold, 0);
    assert_eq!(motorcycles.total_bids, 1);
}

#[test]
fn test_user_win_rate_over_resolved_auctions() {
    let db = seeded_database();

    // buyer_1 bid in two resolved auctions and won one; the running auction
    // does not count against them
    let stats = stats::user_stats(&db, &"buyer_1".to_string());
    assert_eq!(stats.bids_placed, 3);
    assert_eq!(stats.auctions_won, 1);
    assert!((stats.win_rate - 0.5).abs() < f64::EPSILON);
    assert_eq!(stats.auctions_listed, 0);

    let seller_stats = stats::user_stats(&db, &sample_seller().user_id);
    assert_eq!(seller_stats.auctions_listed, 3);
    assert_eq!(seller_stats.bids_placed, 0);
    assert_eq!(seller_stats.win_rate, 0.0);
}

#[test]
fn test_stats_are_side_effect_free() {
    let db = seeded_database();
    let before = db.list_auctions();

    stats::marketplace_stats(&db);
    stats::user_stats(&db, &"buyer_1".to_string());

    assert_eq!(db.list_auctions(), before);
}
