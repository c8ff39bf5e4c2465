// src/domain/ledger.rs
//
// Pure operations over auction documents: each takes a snapshot plus the
// acting user and clock, and returns the updated document or a domain error.
// Persistence (and the conditional version check) happens in the controller.
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::money::Amount;
use super::auctions::{validate_bid, Auction, BidEntry, OfferEntry, OfferStatus};
use super::core::{Errors, OfferId, User, UserId};
use super::lifecycle::{self, AuctionStatus, Trigger};

/// Bidding window check: active status and inside [starts_at, ends_at).
fn ensure_open(auction: &Auction, at: DateTime<Utc>) -> Result<(), Errors> {
    match auction.status {
        AuctionStatus::Active => {
            if at < auction.starts_at {
                Err(Errors::AuctionHasNotStarted(auction.auction_id))
            } else if at >= auction.ends_at {
                Err(Errors::AuctionHasEnded(auction.auction_id))
            } else {
                Ok(())
            }
        }
        AuctionStatus::Draft => Err(Errors::AuctionNotActive(auction.auction_id)),
        _ => Err(Errors::AuctionHasEnded(auction.auction_id)),
    }
}

pub fn place_bid(
    auction: &Auction,
    bidder: &User,
    amount: Amount,
    at: DateTime<Utc>,
) -> Result<Auction, Errors> {
    ensure_open(auction, at)?;
    validate_bid(auction, bidder, amount)?;

    let minimum = auction.minimum_bid();
    if amount.value() < minimum {
        return Err(Errors::MustPlaceBidAtLeast(minimum));
    }

    let mut next = auction.clone();
    next.bids.push(BidEntry {
        bidder: bidder.user_id.clone(),
        amount,
        at,
        buy_now: false,
    });
    next.current_price = amount;
    next.current_bidder = Some(bidder.user_id.clone());
    next.bid_count += 1;
    Ok(next)
}

/// Immediate purchase at the listed buy-now price, resolving the auction.
pub fn buy_now(auction: &Auction, buyer: &User, at: DateTime<Utc>) -> Result<Auction, Errors> {
    ensure_open(auction, at)?;
    let price = auction
        .buy_now_price
        .ok_or(Errors::BuyNowUnavailable(auction.auction_id))?;
    validate_bid(auction, buyer, price)?;

    let status = lifecycle::transition(auction.status, Trigger::BuyNow, AuctionStatus::SoldBuyNow)?;

    let mut next = auction.clone();
    next.bids.push(BidEntry {
        bidder: buyer.user_id.clone(),
        amount: price,
        at,
        buy_now: true,
    });
    // The ladder price never moves down, even when buy-now undercuts it.
    if price.value() > next.current_price.value() {
        next.current_price = price;
    }
    next.current_bidder = Some(buyer.user_id.clone());
    next.bid_count += 1;
    next.status = status;
    next.winner = Some(buyer.user_id.clone());
    next.final_price = Some(price);
    Ok(next)
}

pub fn make_offer(
    auction: &Auction,
    buyer: &User,
    amount: Amount,
    at: DateTime<Utc>,
) -> Result<(Auction, OfferId), Errors> {
    ensure_open(auction, at)?;

    if buyer.user_id == auction.seller {
        return Err(Errors::SellerCannotMakeOffers((
            buyer.user_id.clone(),
            auction.auction_id,
        )));
    }
    if amount.currency() != auction.currency {
        return Err(Errors::CurrencyMismatch(auction.currency));
    }

    let offer_id = Uuid::new_v4();
    let mut next = auction.clone();
    next.offers.push(OfferEntry {
        offer_id,
        buyer: buyer.user_id.clone(),
        amount,
        status: OfferStatus::Pending,
        at,
    });
    Ok((next, offer_id))
}

/// Seller accepts or rejects a pending offer. Acceptance resolves the
/// auction early; the remaining pending offers are rejected with it.
pub fn respond_to_offer(
    auction: &Auction,
    responder: &UserId,
    offer_id: OfferId,
    accept: bool,
) -> Result<Auction, Errors> {
    if *responder != auction.seller {
        return Err(Errors::NotAuctionSeller((
            responder.clone(),
            auction.auction_id,
        )));
    }

    let offer = auction
        .offer(offer_id)
        .ok_or(Errors::UnknownOffer(offer_id))?;
    if offer.status != OfferStatus::Pending {
        return Err(Errors::OfferNotPending(offer_id));
    }
    let buyer = offer.buyer.clone();
    let amount = offer.amount;

    let mut next = auction.clone();
    if accept {
        let status =
            lifecycle::transition(auction.status, Trigger::AcceptOffer, AuctionStatus::Sold)?;
        for o in next.offers.iter_mut() {
            if o.offer_id == offer_id {
                o.status = OfferStatus::Accepted;
            } else if o.status == OfferStatus::Pending {
                o.status = OfferStatus::Rejected;
            }
        }
        next.status = status;
        next.winner = Some(buyer);
        next.final_price = Some(amount);
    } else {
        for o in next.offers.iter_mut() {
            if o.offer_id == offer_id {
                o.status = OfferStatus::Rejected;
            }
        }
    }
    Ok(next)
}

pub fn withdraw_offer(
    auction: &Auction,
    caller: &UserId,
    offer_id: OfferId,
) -> Result<Auction, Errors> {
    let offer = auction
        .offer(offer_id)
        .ok_or(Errors::UnknownOffer(offer_id))?;
    if offer.buyer != *caller {
        return Err(Errors::NotOfferBuyer((caller.clone(), offer_id)));
    }
    if offer.status != OfferStatus::Pending {
        return Err(Errors::OfferNotPending(offer_id));
    }

    let mut next = auction.clone();
    for o in next.offers.iter_mut() {
        if o.offer_id == offer_id {
            o.status = OfferStatus::Withdrawn;
        }
    }
    Ok(next)
}

/// Admin approval publishes a draft listing.
pub fn approve(auction: &Auction) -> Result<Auction, Errors> {
    let status = lifecycle::transition(auction.status, Trigger::Approve, AuctionStatus::Active)?;
    let mut next = auction.clone();
    next.status = status;
    Ok(next)
}

pub fn cancel(auction: &Auction) -> Result<Auction, Errors> {
    let status = lifecycle::transition(auction.status, Trigger::Cancel, AuctionStatus::Cancelled)?;
    let mut next = auction.clone();
    next.status = status;
    Ok(next)
}

/// End-of-auction resolution, triggered by expiry or admin action.
pub fn close(auction: &Auction) -> Result<Auction, Errors> {
    let resolved = lifecycle::resolve_close(auction);
    let status = lifecycle::transition(auction.status, Trigger::Close, resolved)?;

    let mut next = auction.clone();
    next.status = status;
    if status == AuctionStatus::Sold {
        next.winner = auction.current_bidder.clone();
        next.final_price = Some(auction.current_price);
    }
    Ok(next)
}
