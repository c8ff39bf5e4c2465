use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Auction, AuctionId, AuctionStatus, BidEntry, CategoryId, OfferEntry, OfferId, Role, User,
    UserId,
};
use crate::money::{Amount, AmountValue, Currency};

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

// --- requests

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
    pub name: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirm {
    pub user_id: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRequest {
    pub customer_ref: String,
    pub method_ref: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    pub title: String,
    pub category: CategoryId,
    pub currency: Option<Currency>,
    pub start_price: AmountValue,
    pub reserve_price: Option<AmountValue>,
    pub min_raise: Option<AmountValue>,
    pub buy_now_price: Option<AmountValue>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl CreateAuctionRequest {
    /// A fresh draft listing; the store assigns id and version.
    pub fn to_auction(&self, seller: &User) -> Auction {
        let currency = self.currency.unwrap_or(Currency::USD);

        Auction {
            auction_id: 0,
            seller: seller.user_id.clone(),
            title: self.title.clone(),
            category: self.category.clone(),
            currency,
            start_price: Amount::new(currency, self.start_price),
            reserve_price: Amount::new(currency, self.reserve_price.unwrap_or(0)),
            min_raise: Amount::new(currency, self.min_raise.unwrap_or(0)),
            buy_now_price: self.buy_now_price.map(|v| Amount::new(currency, v)),
            current_price: Amount::new(currency, self.start_price),
            status: AuctionStatus::Draft,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            bids: Vec::new(),
            offers: Vec::new(),
            current_bidder: None,
            winner: None,
            final_price: None,
            bid_count: 0,
            watch_count: 0,
            version: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BidRequest {
    pub amount: AmountValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferRequest {
    pub amount: AmountValue,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferResponseRequest {
    pub accept: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryUpdateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRequest {
    pub rate_bps: u32,
    pub cap: Option<AmountValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AuctionListQuery {
    pub status: Option<AuctionStatus>,
    pub category: Option<CategoryId>,
}

// --- responses

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSummary {
    pub id: AuctionId,
    pub title: String,
    pub category: CategoryId,
    pub status: AuctionStatus,
    pub currency: Currency,
    pub current_price: Amount,
    pub buy_now_price: Option<Amount>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub bid_count: u32,
    pub watch_count: u32,
    pub seller: UserId,
}

impl From<&Auction> for AuctionSummary {
    fn from(auction: &Auction) -> Self {
        AuctionSummary {
            id: auction.auction_id,
            title: auction.title.clone(),
            category: auction.category.clone(),
            status: auction.status,
            currency: auction.currency,
            current_price: auction.current_price,
            buy_now_price: auction.buy_now_price,
            starts_at: auction.starts_at,
            ends_at: auction.ends_at,
            bid_count: auction.bid_count,
            watch_count: auction.watch_count,
            seller: auction.seller.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDetail {
    pub id: AuctionId,
    pub title: String,
    pub category: CategoryId,
    pub status: AuctionStatus,
    pub currency: Currency,
    pub start_price: Amount,
    pub reserve_price: Amount,
    pub min_raise: Amount,
    pub buy_now_price: Option<Amount>,
    pub current_price: Amount,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub seller: UserId,
    pub bids: Vec<BidEntry>,
    pub offers: Vec<OfferEntry>,
    pub current_bidder: Option<UserId>,
    pub winner: Option<UserId>,
    pub final_price: Option<Amount>,
    pub bid_count: u32,
    pub watch_count: u32,
}

impl From<&Auction> for AuctionDetail {
    fn from(auction: &Auction) -> Self {
        AuctionDetail {
            id: auction.auction_id,
            title: auction.title.clone(),
            category: auction.category.clone(),
            status: auction.status,
            currency: auction.currency,
            start_price: auction.start_price,
            reserve_price: auction.reserve_price,
            min_raise: auction.min_raise,
            buy_now_price: auction.buy_now_price,
            current_price: auction.current_price,
            starts_at: auction.starts_at,
            ends_at: auction.ends_at,
            seller: auction.seller.clone(),
            bids: auction.bids.clone(),
            offers: auction.offers.clone(),
            current_bidder: auction.current_bidder.clone(),
            winner: auction.winner.clone(),
            final_price: auction.final_price,
            bid_count: auction.bid_count,
            watch_count: auction.watch_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub payment_verified: bool,
    pub customer_ref: Option<String>,
    pub payment_method_ref: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            role: user.role,
            payment_verified: user.payment_verified,
            customer_ref: user.customer_ref.clone(),
            payment_method_ref: user.payment_method_ref.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub reset_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCreated {
    pub offer_id: OfferId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchCount {
    pub watch_count: u32,
}
