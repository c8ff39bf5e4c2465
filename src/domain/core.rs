// src/domain/core.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::money::{AmountValue, Currency};
use super::lifecycle::{AuctionStatus, Trigger};

pub type UserId = String;
pub type AuctionId = i64;
pub type CategoryId = String;
pub type OfferId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Bidder,
    Seller,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
    /// Set once the payment provider has verified the stored method.
    pub payment_verified: bool,
    pub customer_ref: Option<String>,
    pub payment_method_ref: Option<String>,
    pub reset_token: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_sell(&self) -> bool {
        matches!(self.role, Role::Seller | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Uuid,
    pub auction_id: AuctionId,
    pub author: UserId,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Errors {
    #[error("Unknown auction: {0}")]
    UnknownAuction(AuctionId),

    #[error("Auction already exists: {0}")]
    AuctionAlreadyExists(AuctionId),

    #[error("Auction is not open for bidding: {0}")]
    AuctionNotActive(AuctionId),

    #[error("Auction has ended: {0}")]
    AuctionHasEnded(AuctionId),

    #[error("Auction has not started: {0}")]
    AuctionHasNotStarted(AuctionId),

    #[error("Seller cannot place bids: {0:?}")]
    SellerCannotPlaceBids((UserId, AuctionId)),

    #[error("Seller cannot make offers on their own auction: {0:?}")]
    SellerCannotMakeOffers((UserId, AuctionId)),

    #[error("Bid currency must be {0}")]
    CurrencyMismatch(Currency),

    #[error("Must place a bid of at least {0}")]
    MustPlaceBidAtLeast(AmountValue),

    #[error("No verified payment method on file for {0}")]
    PaymentMethodNotVerified(UserId),

    #[error("Auction has no buy-now price: {0}")]
    BuyNowUnavailable(AuctionId),

    #[error("Unknown offer: {0}")]
    UnknownOffer(OfferId),

    #[error("Offer is no longer pending: {0}")]
    OfferNotPending(OfferId),

    #[error("Only the seller may respond to offers: {0:?}")]
    NotAuctionSeller((UserId, AuctionId)),

    #[error("Only the offer's buyer may withdraw it: {0:?}")]
    NotOfferBuyer((UserId, OfferId)),

    #[error("Administrator role required: {0}")]
    AdminOnly(UserId),

    #[error("Seller role required: {0}")]
    SellerRoleRequired(UserId),

    #[error("Invalid status transition from {from:?} on {trigger:?}")]
    InvalidTransition { from: AuctionStatus, trigger: Trigger },

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("User already exists: {0}")]
    UserAlreadyExists(UserId),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("Category already exists: {0}")]
    CategoryAlreadyExists(CategoryId),

    #[error("Unknown payment record: {0}")]
    UnknownPayment(Uuid),

    #[error("Payment provider error: {0}")]
    Payment(String),

    #[error("Concurrent update on auction {0}, please retry")]
    VersionConflict(AuctionId),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
