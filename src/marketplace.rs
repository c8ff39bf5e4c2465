// src/marketplace.rs
//
// Controller shared by the web layer and the closing job. Every mutation is
// a versioned read-modify-write: read a snapshot, apply a ledger operation,
// conditionally write, retry on conflict. Concurrent bids on one auction
// therefore serialize instead of overwriting each other.
use chrono::{DateTime, Utc};
use log::{error, warn};
use std::sync::Arc;

use crate::domain::{ledger, Auction, AuctionId, Errors, OfferId, User, UserId};
use crate::money::{Amount, AmountValue};
use crate::payment::PaymentOrchestrator;
use crate::persistence::Database;

const MAX_RETRIES: u32 = 100;

pub struct Marketplace {
    pub db: Arc<Database>,
    pub payments: PaymentOrchestrator,
}

impl Marketplace {
    pub fn new(db: Arc<Database>, payments: PaymentOrchestrator) -> Self {
        Marketplace { db, payments }
    }

    /// Read-modify-write with a conditional version check, retried on
    /// conflict up to MAX_RETRIES.
    fn commit<F>(&self, auction_id: AuctionId, op: F) -> Result<Auction, Errors>
    where
        F: Fn(&Auction) -> Result<Auction, Errors>,
    {
        for _ in 0..MAX_RETRIES {
            let auction = self.db.get_auction(auction_id)?;
            let updated = op(&auction)?;
            match self.db.update_auction(updated) {
                Ok(doc) => return Ok(doc),
                Err(Errors::VersionConflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Errors::VersionConflict(auction_id))
    }

    pub fn create_listing(&self, seller: &User, auction: Auction) -> Result<Auction, Errors> {
        if !seller.can_sell() {
            return Err(Errors::SellerRoleRequired(seller.user_id.clone()));
        }
        self.db.get_category(&auction.category)?;
        if auction.ends_at <= auction.starts_at {
            return Err(Errors::InvalidRequest(
                "auction must end after it starts".to_string(),
            ));
        }
        if auction.start_price.value() <= 0 {
            return Err(Errors::InvalidRequest(
                "start price must be positive".to_string(),
            ));
        }
        Ok(self.db.create_auction(auction))
    }

    /// Authorizes the bidder's hold first, then commits the bid, so nobody
    /// without a chargeable method ever lands in the ladder.
    pub async fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: &UserId,
        amount: AmountValue,
        now: DateTime<Utc>,
    ) -> Result<Auction, Errors> {
        let bidder = self.db.get_user(bidder_id)?;
        let auction = self.db.get_auction(auction_id)?;
        let bid_amount = Amount::new(auction.currency, amount);

        // Dry run against the current snapshot: a bid that cannot be
        // accepted must not create a hold.
        ledger::place_bid(&auction, &bidder, bid_amount, now)?;

        self.payments
            .authorize_bid(&auction, &bidder, bid_amount)
            .await?;

        self.commit(auction_id, |a| ledger::place_bid(a, &bidder, bid_amount, now))
    }

    pub async fn buy_now(
        &self,
        auction_id: AuctionId,
        buyer_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Auction, Errors> {
        let buyer = self.db.get_user(buyer_id)?;
        let doc = self.commit(auction_id, |a| ledger::buy_now(a, &buyer, now))?;
        self.finalize_sale(&doc).await;
        Ok(doc)
    }

    pub fn make_offer(
        &self,
        auction_id: AuctionId,
        buyer_id: &UserId,
        amount: AmountValue,
        now: DateTime<Utc>,
    ) -> Result<(Auction, OfferId), Errors> {
        let buyer = self.db.get_user(buyer_id)?;
        for _ in 0..MAX_RETRIES {
            let auction = self.db.get_auction(auction_id)?;
            let offer_amount = Amount::new(auction.currency, amount);
            let (updated, offer_id) = ledger::make_offer(&auction, &buyer, offer_amount, now)?;
            match self.db.update_auction(updated) {
                Ok(doc) => return Ok((doc, offer_id)),
                Err(Errors::VersionConflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Errors::VersionConflict(auction_id))
    }

    pub async fn respond_to_offer(
        &self,
        auction_id: AuctionId,
        responder: &UserId,
        offer_id: OfferId,
        accept: bool,
    ) -> Result<Auction, Errors> {
        let doc = self.commit(auction_id, |a| {
            ledger::respond_to_offer(a, responder, offer_id, accept)
        })?;
        if accept {
            self.finalize_sale(&doc).await;
        }
        Ok(doc)
    }

    pub fn withdraw_offer(
        &self,
        auction_id: AuctionId,
        caller: &UserId,
        offer_id: OfferId,
    ) -> Result<Auction, Errors> {
        self.commit(auction_id, |a| ledger::withdraw_offer(a, caller, offer_id))
    }

    pub fn approve(&self, auction_id: AuctionId) -> Result<Auction, Errors> {
        self.commit(auction_id, ledger::approve)
    }

    /// Seller (of the listing) or admin cancels; open holds are released.
    pub async fn cancel(&self, auction_id: AuctionId, caller: &User) -> Result<Auction, Errors> {
        let auction = self.db.get_auction(auction_id)?;
        if !caller.is_admin() && caller.user_id != auction.seller {
            return Err(Errors::NotAuctionSeller((
                caller.user_id.clone(),
                auction_id,
            )));
        }
        let doc = self.commit(auction_id, ledger::cancel)?;
        self.payments.release_losing_holds(&doc).await;
        Ok(doc)
    }

    /// Admin-forced end: same resolution as a natural expiry.
    pub async fn end_auction(&self, auction_id: AuctionId) -> Result<Auction, Errors> {
        let doc = self.commit(auction_id, ledger::close)?;
        self.finalize_sale(&doc).await;
        Ok(doc)
    }

    /// Closes every active auction whose end time has passed. One failure
    /// does not block the rest.
    pub async fn close_due(&self, now: DateTime<Utc>) -> usize {
        let mut closed = 0;
        for auction in self.db.auctions_due(now) {
            match self.commit(auction.auction_id, ledger::close) {
                Ok(doc) => {
                    self.finalize_sale(&doc).await;
                    closed += 1;
                }
                Err(e) => error!("failed to close auction {}: {}", auction.auction_id, e),
            }
        }
        closed
    }

    /// Commission collection plus hold cleanup after a resolution. A charge
    /// failure is recorded by the orchestrator and logged here; the auction
    /// stays resolved for manual reconciliation.
    async fn finalize_sale(&self, auction: &Auction) {
        if auction.winner.is_some() {
            let schedule = self.db.commission_schedule();
            if let Err(e) = self.payments.charge_winner(auction, &schedule).await {
                warn!(
                    "commission charge failed for auction {}: {}",
                    auction.auction_id, e
                );
            }
        }
        self.payments.release_losing_holds(auction).await;
    }
}
