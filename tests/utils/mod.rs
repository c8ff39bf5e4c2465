use chrono::{DateTime, Duration, TimeZone, Utc};
use vehicle_auctions::domain::{Auction, AuctionStatus, Role, User};
use vehicle_auctions::money::{Amount, AmountValue, Currency};
// See https://users.rust-lang.org/t/sharing-code-and-macros-in-tests-directory/3098/7

// Sample data for tests
pub fn sample_auction_id() -> i64 {
    1
}

pub fn sample_starts_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
}

pub fn sample_ends_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()
}

pub fn sample_bid_time() -> DateTime<Utc> {
    sample_starts_at() + Duration::seconds(10)
}

pub fn usd(value: AmountValue) -> Amount {
    Amount::new(Currency::USD, value)
}

pub fn user(user_id: &str, name: &str, role: Role, payment_verified: bool) -> User {
    User {
        user_id: user_id.to_string(),
        name: name.to_string(),
        role,
        password_hash: String::new(),
        payment_verified,
        customer_ref: payment_verified.then(|| format!("cus_{}", user_id)),
        payment_method_ref: payment_verified.then(|| format!("pm_{}", user_id)),
        reset_token: None,
    }
}

pub fn sample_seller() -> User {
    user("sample_seller", "Seller", Role::Seller, true)
}

pub fn buyer_1() -> User {
    user("buyer_1", "Buyer 1", Role::Bidder, true)
}

pub fn buyer_2() -> User {
    user("buyer_2", "Buyer 2", Role::Bidder, true)
}

pub fn unverified_buyer() -> User {
    user("no_card_buyer", "Cardless Buyer", Role::Bidder, false)
}

pub fn admin() -> User {
    user("admin", "Administrator", Role::Admin, false)
}

/// An active listing: start price 1000, minimum raise 50, no reserve,
/// buy-now at 5000.
pub fn sample_auction() -> Auction {
    Auction {
        auction_id: sample_auction_id(),
        seller: sample_seller().user_id,
        title: "1967 Mustang Fastback".to_string(),
        category: "cars".to_string(),
        currency: Currency::USD,
        start_price: usd(1000),
        reserve_price: usd(0),
        min_raise: usd(50),
        buy_now_price: Some(usd(5000)),
        current_price: usd(1000),
        status: AuctionStatus::Active,
        starts_at: sample_starts_at(),
        ends_at: sample_ends_at(),
        bids: Vec::new(),
        offers: Vec::new(),
        current_bidder: None,
        winner: None,
        final_price: None,
        bid_count: 0,
        watch_count: 0,
        version: 1,
    }
}

pub fn draft_auction() -> Auction {
    Auction {
        status: AuctionStatus::Draft,
        ..sample_auction()
    }
}

pub fn auction_with_reserve(reserve: AmountValue) -> Auction {
    Auction {
        reserve_price: usd(reserve),
        ..sample_auction()
    }
}
