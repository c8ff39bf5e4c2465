// src/domain/auctions.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Amount, AmountValue, Currency};
use super::core::{AuctionId, CategoryId, Errors, OfferId, User, UserId};
use super::lifecycle::AuctionStatus;

/// One entry in the auction's bid ladder. Buy-now purchases land here too,
/// flagged, so the audit trail stays a single ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidEntry {
    pub bidder: UserId,
    pub amount: Amount,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub buy_now: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

/// A direct purchase proposal outside the bidding ladder, subject to the
/// seller's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferEntry {
    pub offer_id: OfferId,
    pub buyer: UserId,
    pub amount: Amount,
    pub status: OfferStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub auction_id: AuctionId,
    pub seller: UserId,
    pub title: String,
    pub category: CategoryId,
    pub currency: Currency,
    pub start_price: Amount,

    /// The seller may set a minimum sale price in advance (the 'reserve').
    /// If the final bid does not reach it the vehicle remains unsold.
    /// A reserve of 0 is the equivalent of not setting one.
    pub reserve_price: Amount,

    /// The amount by which the next bid must exceed the current price.
    /// A minimum raise of 0 is the equivalent of not setting one.
    pub min_raise: Amount,

    pub buy_now_price: Option<Amount>,
    pub current_price: Amount,
    pub status: AuctionStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub bids: Vec<BidEntry>,
    pub offers: Vec<OfferEntry>,
    pub current_bidder: Option<UserId>,
    pub winner: Option<UserId>,
    pub final_price: Option<Amount>,
    pub bid_count: u32,
    pub watch_count: u32,

    /// Document version for conditional updates; bumped by the store on
    /// every successful write.
    pub version: u64,
}

impl Auction {
    pub fn offer(&self, offer_id: OfferId) -> Option<&OfferEntry> {
        self.offers.iter().find(|o| o.offer_id == offer_id)
    }

    pub fn highest_bid(&self) -> Option<&BidEntry> {
        self.bids.last()
    }

    /// Lowest amount the next bid must reach.
    pub fn minimum_bid(&self) -> AmountValue {
        self.current_price.value() + self.min_raise.value()
    }
}

/// Static checks that hold for every bid regardless of auction state.
pub fn validate_bid(auction: &Auction, bidder: &User, amount: Amount) -> Result<(), Errors> {
    if bidder.user_id == auction.seller {
        return Err(Errors::SellerCannotPlaceBids((
            bidder.user_id.clone(),
            auction.auction_id,
        )));
    }

    if amount.currency() != auction.currency {
        return Err(Errors::CurrencyMismatch(auction.currency));
    }

    if !bidder.payment_verified || bidder.payment_method_ref.is_none() {
        return Err(Errors::PaymentMethodNotVerified(bidder.user_id.clone()));
    }

    Ok(())
}
