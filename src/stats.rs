// src/stats.rs
//
// Read-only reporting queries. No caching: every call recomputes from the
// primary records.
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{AuctionStatus, CategoryId, UserId};
use crate::money::AmountValue;
use crate::payment::records::{PaymentKind, PaymentStatus};
use crate::persistence::Database;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: CategoryId,
    pub auctions: usize,
    pub sold: usize,
    pub total_bids: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceStats {
    pub total_auctions: usize,
    pub active_auctions: usize,
    pub sold_auctions: usize,
    pub total_bids: u64,
    /// Succeeded commission totals keyed by currency code.
    pub revenue: BTreeMap<String, AmountValue>,
    pub average_sale_price: BTreeMap<String, f64>,
    pub categories: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub bids_placed: u64,
    pub auctions_listed: usize,
    pub auctions_won: usize,
    pub win_rate: f64,
}

fn is_sold(status: AuctionStatus) -> bool {
    matches!(status, AuctionStatus::Sold | AuctionStatus::SoldBuyNow)
}

pub fn marketplace_stats(db: &Database) -> MarketplaceStats {
    let auctions = db.list_auctions();

    let mut total_bids: u64 = 0;
    let mut categories: BTreeMap<CategoryId, CategoryBreakdown> = BTreeMap::new();
    let mut sale_sums: BTreeMap<String, (AmountValue, u32)> = BTreeMap::new();

    for auction in &auctions {
        total_bids += auction.bid_count as u64;

        let entry = categories
            .entry(auction.category.clone())
            .or_insert_with(|| CategoryBreakdown {
                category: auction.category.clone(),
                auctions: 0,
                sold: 0,
                total_bids: 0,
            });
        entry.auctions += 1;
        entry.total_bids += auction.bid_count as u64;
        if is_sold(auction.status) {
            entry.sold += 1;
        }

        if let Some(final_price) = auction.final_price {
            let (sum, count) = sale_sums
                .entry(final_price.currency().to_string())
                .or_insert((0, 0));
            *sum += final_price.value();
            *count += 1;
        }
    }

    let mut revenue: BTreeMap<String, AmountValue> = BTreeMap::new();
    for payment in db.all_payments() {
        if payment.kind == PaymentKind::FinalCommission && payment.status == PaymentStatus::Succeeded
        {
            *revenue
                .entry(payment.total_amount.currency().to_string())
                .or_insert(0) += payment.total_amount.value();
        }
    }

    MarketplaceStats {
        total_auctions: auctions.len(),
        active_auctions: auctions
            .iter()
            .filter(|a| a.status == AuctionStatus::Active)
            .count(),
        sold_auctions: auctions.iter().filter(|a| is_sold(a.status)).count(),
        total_bids,
        revenue,
        average_sale_price: sale_sums
            .into_iter()
            .map(|(currency, (sum, count))| (currency, sum as f64 / count as f64))
            .collect(),
        categories: categories.into_values().collect(),
    }
}

pub fn user_stats(db: &Database, user_id: &UserId) -> UserStats {
    let auctions = db.list_auctions();

    let mut bids_placed: u64 = 0;
    let mut auctions_listed = 0;
    let mut auctions_won = 0;
    let mut resolved_participations = 0;

    for auction in &auctions {
        if auction.seller == *user_id {
            auctions_listed += 1;
        }

        let user_bids = auction.bids.iter().filter(|b| b.bidder == *user_id).count();
        bids_placed += user_bids as u64;

        if user_bids > 0 && auction.status.is_terminal() {
            resolved_participations += 1;
        }
        if auction.winner.as_ref() == Some(user_id) {
            auctions_won += 1;
        }
    }

    let win_rate = if resolved_participations > 0 {
        auctions_won as f64 / resolved_participations as f64
    } else {
        0.0
    };

    UserStats {
        bids_placed,
        auctions_listed,
        auctions_won,
        win_rate,
    }
}
