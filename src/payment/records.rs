// src/payment/records.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AuctionId, UserId};
use crate::money::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    RequiresCapture,
    Succeeded,
    Canceled,
    ProcessingFailed,
    Replaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    BidAuthorization,
    FinalCommission,
    BidDeposit,
}

/// Audit record of one provider interaction. Records are never deleted,
/// only status-transitioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPayment {
    pub payment_id: Uuid,
    pub auction_id: AuctionId,
    pub bidder: UserId,
    pub bid_amount: Amount,
    pub commission_amount: Amount,
    pub total_amount: Amount,
    /// Provider-side intent reference; empty when the provider call never
    /// produced one.
    pub intent_ref: String,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
