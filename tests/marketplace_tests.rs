use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use vehicle_auctions::domain::{
    Auction, AuctionStatus, Category, CommissionPolicy, Errors,
};
use vehicle_auctions::marketplace::Marketplace;
use vehicle_auctions::payment::{PaymentKind, PaymentOrchestrator, PaymentStatus, SandboxProvider};
use vehicle_auctions::persistence::Database;
#[path = "utils/mod.rs"]
mod utils;
use utils::*;

fn setup() -> Marketplace {
    let db = Arc::new(Database::new());
    for user in [
        sample_seller(),
        buyer_1(),
        buyer_2(),
        unverified_buyer(),
        admin(),
    ] {
        db.insert_user(user).unwrap();
    }
    db.insert_category(Category {
        id: "cars".to_string(),
        name: "Cars".to_string(),
        created_by: admin().user_id,
    })
    .unwrap();
    db.set_commission_policy(CommissionPolicy {
        category: "cars".to_string(),
        rate_bps: 500,
        cap: None,
    });

    let provider = Arc::new(SandboxProvider::new());
    let payments = PaymentOrchestrator::new(provider, Arc::clone(&db), 500);
    Marketplace::new(db, payments)
}

/// Draft listing as it arrives from a seller; the store assigns id/version.
fn listing() -> Auction {
    Auction {
        auction_id: 0,
        version: 0,
        status: AuctionStatus::Draft,
        ..sample_auction()
    }
}

#[tokio::test]
async fn test_full_auction_flow() {
    let marketplace = setup();
    let seller = sample_seller();

    let auction = marketplace.create_listing(&seller, listing()).unwrap();
    assert_eq!(auction.status, AuctionStatus::Draft);
    let auction_id = auction.auction_id;

    let approved = marketplace.approve(auction_id).unwrap();
    assert_eq!(approved.status, AuctionStatus::Active);

    let t = sample_bid_time();
    marketplace
        .place_bid(auction_id, &buyer_1().user_id, 1050, t)
        .await
        .unwrap();
    let outbid = marketplace
        .place_bid(auction_id, &buyer_2().user_id, 1100, t + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(outbid.current_price, usd(1100));
    assert_eq!(outbid.current_bidder, Some(buyer_2().user_id));
    assert_eq!(outbid.bid_count, 2);

    // Below the increment: 1100 + 50 is required
    let rejected = marketplace
        .place_bid(auction_id, &buyer_1().user_id, 1140, t + Duration::seconds(2))
        .await;
    match rejected {
        Err(Errors::MustPlaceBidAtLeast(minimum)) => assert_eq!(minimum, 1150),
        other => panic!("Expected MustPlaceBidAtLeast error, got {:?}", other),
    }

    let closed = marketplace.end_auction(auction_id).await.unwrap();
    assert_eq!(closed.status, AuctionStatus::Sold);
    assert_eq!(closed.winner, Some(buyer_2().user_id));
    assert_eq!(closed.final_price, Some(usd(1100)));

    // Winner's hold captured and commission collected (5% of 1100)
    let winner_payments = marketplace.db.payments_for_user(&buyer_2().user_id);
    assert!(winner_payments.iter().any(|p| {
        p.kind == PaymentKind::BidAuthorization && p.status == PaymentStatus::Succeeded
    }));
    let commission = winner_payments
        .iter()
        .find(|p| p.kind == PaymentKind::FinalCommission)
        .unwrap();
    assert_eq!(commission.status, PaymentStatus::Succeeded);
    assert_eq!(commission.commission_amount, usd(55));

    // Loser's hold released
    let loser_payments = marketplace.db.payments_for_user(&buyer_1().user_id);
    assert!(loser_payments.iter().all(|p| {
        p.kind != PaymentKind::BidAuthorization || p.status == PaymentStatus::Canceled
    }));
}

#[tokio::test]
async fn test_unverified_bidder_never_reaches_the_ladder() {
    let marketplace = setup();
    let auction = marketplace
        .create_listing(&sample_seller(), listing())
        .unwrap();
    marketplace.approve(auction.auction_id).unwrap();

    let result = marketplace
        .place_bid(
            auction.auction_id,
            &unverified_buyer().user_id,
            1050,
            sample_bid_time(),
        )
        .await;
    assert!(matches!(result, Err(Errors::PaymentMethodNotVerified(_))));

    let unchanged = marketplace.db.get_auction(auction.auction_id).unwrap();
    assert_eq!(unchanged.bid_count, 0);
    assert_eq!(unchanged.current_price, usd(1000));
    assert!(marketplace
        .db
        .payments_for_user(&unverified_buyer().user_id)
        .is_empty());
}

#[tokio::test]
async fn test_close_due_resolves_only_expired_auctions() {
    let marketplace = setup();

    let expiring = marketplace
        .create_listing(&sample_seller(), listing())
        .unwrap();
    let ongoing = marketplace
        .create_listing(
            &sample_seller(),
            Auction {
                ends_at: Utc.with_ymd_and_hms(2026, 12, 1, 8, 0, 0).unwrap(),
                ..listing()
            },
        )
        .unwrap();
    marketplace.approve(expiring.auction_id).unwrap();
    marketplace.approve(ongoing.auction_id).unwrap();

    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let closed = marketplace.close_due(now).await;
    assert_eq!(closed, 1);

    assert_eq!(
        marketplace.db.get_auction(expiring.auction_id).unwrap().status,
        AuctionStatus::Ended
    );
    assert_eq!(
        marketplace.db.get_auction(ongoing.auction_id).unwrap().status,
        AuctionStatus::Active
    );

    // A second pass finds nothing left to do
    assert_eq!(marketplace.close_due(now).await, 0);
}

#[tokio::test]
async fn test_reserve_not_met_releases_holds_and_charges_nothing() {
    let marketplace = setup();
    let auction = marketplace
        .create_listing(
            &sample_seller(),
            Auction {
                reserve_price: usd(2000),
                ..listing()
            },
        )
        .unwrap();
    marketplace.approve(auction.auction_id).unwrap();

    marketplace
        .place_bid(auction.auction_id, &buyer_1().user_id, 1500, sample_bid_time())
        .await
        .unwrap();

    let closed = marketplace.end_auction(auction.auction_id).await.unwrap();
    assert_eq!(closed.status, AuctionStatus::ReserveNotMet);
    assert_eq!(closed.winner, None);

    let payments = marketplace.db.payments_for_user(&buyer_1().user_id);
    assert!(payments
        .iter()
        .all(|p| p.kind != PaymentKind::FinalCommission));
    assert!(payments.iter().any(|p| {
        p.kind == PaymentKind::BidAuthorization && p.status == PaymentStatus::Canceled
    }));
}

#[tokio::test]
async fn test_buy_now_collects_commission_immediately() {
    let marketplace = setup();
    let auction = marketplace
        .create_listing(&sample_seller(), listing())
        .unwrap();
    marketplace.approve(auction.auction_id).unwrap();

    let sold = marketplace
        .buy_now(auction.auction_id, &buyer_1().user_id, sample_bid_time())
        .await
        .unwrap();
    assert_eq!(sold.status, AuctionStatus::SoldBuyNow);
    assert_eq!(sold.final_price, Some(usd(5000)));

    // 5% of the buy-now price
    let payments = marketplace.db.payments_for_user(&buyer_1().user_id);
    let commission = payments
        .iter()
        .find(|p| p.kind == PaymentKind::FinalCommission)
        .unwrap();
    assert_eq!(commission.status, PaymentStatus::Succeeded);
    assert_eq!(commission.commission_amount, usd(250));
}

#[tokio::test]
async fn test_accepted_offer_ends_the_auction_and_charges() {
    let marketplace = setup();
    let auction = marketplace
        .create_listing(&sample_seller(), listing())
        .unwrap();
    marketplace.approve(auction.auction_id).unwrap();

    let (_, offer_id) = marketplace
        .make_offer(auction.auction_id, &buyer_1().user_id, 4000, sample_bid_time())
        .unwrap();
    let sold = marketplace
        .respond_to_offer(auction.auction_id, &sample_seller().user_id, offer_id, true)
        .await
        .unwrap();

    assert_eq!(sold.status, AuctionStatus::Sold);
    assert_eq!(sold.winner, Some(buyer_1().user_id));
    assert_eq!(sold.final_price, Some(usd(4000)));

    let payments = marketplace.db.payments_for_user(&buyer_1().user_id);
    let commission = payments
        .iter()
        .find(|p| p.kind == PaymentKind::FinalCommission)
        .unwrap();
    assert_eq!(commission.commission_amount, usd(200));
}

#[tokio::test]
async fn test_cancel_is_limited_to_the_seller_and_admins() {
    let marketplace = setup();
    let auction = marketplace
        .create_listing(&sample_seller(), listing())
        .unwrap();
    marketplace.approve(auction.auction_id).unwrap();

    let denied = marketplace.cancel(auction.auction_id, &buyer_1()).await;
    assert!(matches!(denied, Err(Errors::NotAuctionSeller(_))));

    let cancelled = marketplace
        .cancel(auction.auction_id, &sample_seller())
        .await
        .unwrap();
    assert_eq!(cancelled.status, AuctionStatus::Cancelled);

    // Admins can cancel listings they do not own
    let second = marketplace
        .create_listing(&sample_seller(), listing())
        .unwrap();
    let cancelled = marketplace.cancel(second.auction_id, &admin()).await.unwrap();
    assert_eq!(cancelled.status, AuctionStatus::Cancelled);
}

#[tokio::test]
async fn test_create_listing_validations() {
    let marketplace = setup();

    let unknown_category = marketplace.create_listing(
        &sample_seller(),
        Auction {
            category: "yachts".to_string(),
            ..listing()
        },
    );
    assert!(matches!(unknown_category, Err(Errors::UnknownCategory(_))));

    let wrong_role = marketplace.create_listing(&buyer_1(), listing());
    assert!(matches!(wrong_role, Err(Errors::SellerRoleRequired(_))));

    let backwards_window = marketplace.create_listing(
        &sample_seller(),
        Auction {
            ends_at: sample_starts_at() - Duration::days(1),
            ..listing()
        },
    );
    assert!(matches!(backwards_window, Err(Errors::InvalidRequest(_))));
}
