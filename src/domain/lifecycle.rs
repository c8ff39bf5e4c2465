// src/domain/lifecycle.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use super::auctions::Auction;
use super::core::Errors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    Draft,
    Active,
    Ended,
    Sold,
    SoldBuyNow,
    ReserveNotMet,
    Cancelled,
}

impl AuctionStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuctionStatus::Draft | AuctionStatus::Active)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuctionStatus::Draft => "draft",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
            AuctionStatus::Sold => "sold",
            AuctionStatus::SoldBuyNow => "sold_buy_now",
            AuctionStatus::ReserveNotMet => "reserve_not_met",
            AuctionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Approve,
    Close,
    BuyNow,
    AcceptOffer,
    Cancel,
}

/// Every permitted status change. `Close` is the only trigger with more than
/// one target; `resolve_close` picks among them from the auction's bids.
pub const TRANSITIONS: &[(AuctionStatus, Trigger, &[AuctionStatus])] = &[
    (AuctionStatus::Draft, Trigger::Approve, &[AuctionStatus::Active]),
    (AuctionStatus::Draft, Trigger::Cancel, &[AuctionStatus::Cancelled]),
    (AuctionStatus::Active, Trigger::Cancel, &[AuctionStatus::Cancelled]),
    (AuctionStatus::Active, Trigger::BuyNow, &[AuctionStatus::SoldBuyNow]),
    (AuctionStatus::Active, Trigger::AcceptOffer, &[AuctionStatus::Sold]),
    (
        AuctionStatus::Active,
        Trigger::Close,
        &[
            AuctionStatus::Ended,
            AuctionStatus::Sold,
            AuctionStatus::ReserveNotMet,
        ],
    ),
];

/// Targets the table permits for a status/trigger pair.
pub fn permitted(from: AuctionStatus, trigger: Trigger) -> Option<&'static [AuctionStatus]> {
    TRANSITIONS
        .iter()
        .find(|(f, t, _)| *f == from && *t == trigger)
        .map(|(_, _, targets)| *targets)
}

/// Validates `from --trigger--> to` against the table.
pub fn transition(
    from: AuctionStatus,
    trigger: Trigger,
    to: AuctionStatus,
) -> Result<AuctionStatus, Errors> {
    match permitted(from, trigger) {
        Some(targets) if targets.contains(&to) => Ok(to),
        _ => Err(Errors::InvalidTransition { from, trigger }),
    }
}

/// Outcome of a natural or admin-forced close: an unmet reserve beats
/// everything, then a standing bidder wins, otherwise the auction just ends.
pub fn resolve_close(auction: &Auction) -> AuctionStatus {
    let reserve = auction.reserve_price.value();
    if reserve > 0 && auction.current_price.value() < reserve {
        AuctionStatus::ReserveNotMet
    } else if auction.current_bidder.is_some() {
        AuctionStatus::Sold
    } else {
        AuctionStatus::Ended
    }
}
