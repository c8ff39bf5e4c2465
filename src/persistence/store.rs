// src/persistence/store.rs
//
// In-process document store. Auction writes are conditional on the version
// the caller read, so concurrent read-modify-write sequences conflict
// instead of overwriting each other; multi-record payment updates happen
// under one lock so the cancel-and-replace sequence is atomic.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Auction, AuctionId, AuctionStatus, Category, CategoryId, Comment, CommissionPolicy,
    CommissionSchedule, Errors, User, UserId,
};
use crate::payment::records::{BidPayment, PaymentKind, PaymentStatus};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub auctions: Vec<Auction>,
    pub users: Vec<User>,
    pub payments: Vec<BidPayment>,
    pub categories: Vec<Category>,
    pub commissions: Vec<CommissionPolicy>,
    pub watchlists: HashMap<UserId, Vec<AuctionId>>,
    pub comments: Vec<Comment>,
    pub next_auction_id: i64,
}

#[derive(Default)]
pub struct Database {
    auctions: Mutex<HashMap<AuctionId, Auction>>,
    users: Mutex<HashMap<UserId, User>>,
    payments: Mutex<HashMap<Uuid, BidPayment>>,
    categories: Mutex<HashMap<CategoryId, Category>>,
    commissions: Mutex<HashMap<CategoryId, CommissionPolicy>>,
    watchlists: Mutex<HashMap<UserId, HashSet<AuctionId>>>,
    comments: Mutex<Vec<Comment>>,
    next_auction_id: AtomicI64,
}

impl Database {
    pub fn new() -> Self {
        Database {
            next_auction_id: AtomicI64::new(1),
            ..Database::default()
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Database {
            auctions: Mutex::new(
                snapshot
                    .auctions
                    .into_iter()
                    .map(|a| (a.auction_id, a))
                    .collect(),
            ),
            users: Mutex::new(
                snapshot
                    .users
                    .into_iter()
                    .map(|u| (u.user_id.clone(), u))
                    .collect(),
            ),
            payments: Mutex::new(
                snapshot
                    .payments
                    .into_iter()
                    .map(|p| (p.payment_id, p))
                    .collect(),
            ),
            categories: Mutex::new(
                snapshot
                    .categories
                    .into_iter()
                    .map(|c| (c.id.clone(), c))
                    .collect(),
            ),
            commissions: Mutex::new(
                snapshot
                    .commissions
                    .into_iter()
                    .map(|p| (p.category.clone(), p))
                    .collect(),
            ),
            watchlists: Mutex::new(
                snapshot
                    .watchlists
                    .into_iter()
                    .map(|(user, ids)| (user, ids.into_iter().collect()))
                    .collect(),
            ),
            comments: Mutex::new(snapshot.comments),
            next_auction_id: AtomicI64::new(snapshot.next_auction_id.max(1)),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            auctions: self.auctions.lock().unwrap().values().cloned().collect(),
            users: self.users.lock().unwrap().values().cloned().collect(),
            payments: self.payments.lock().unwrap().values().cloned().collect(),
            categories: self.categories.lock().unwrap().values().cloned().collect(),
            commissions: self.commissions.lock().unwrap().values().cloned().collect(),
            watchlists: self
                .watchlists
                .lock()
                .unwrap()
                .iter()
                .map(|(user, ids)| (user.clone(), ids.iter().copied().collect()))
                .collect(),
            comments: self.comments.lock().unwrap().clone(),
            next_auction_id: self.next_auction_id.load(Ordering::SeqCst),
        }
    }

    // --- auctions

    /// Inserts a new listing, assigning its id and initial version.
    pub fn create_auction(&self, mut auction: Auction) -> Auction {
        auction.auction_id = self.next_auction_id.fetch_add(1, Ordering::SeqCst);
        auction.version = 1;
        self.auctions
            .lock()
            .unwrap()
            .insert(auction.auction_id, auction.clone());
        auction
    }

    pub fn get_auction(&self, auction_id: AuctionId) -> Result<Auction, Errors> {
        self.auctions
            .lock()
            .unwrap()
            .get(&auction_id)
            .cloned()
            .ok_or(Errors::UnknownAuction(auction_id))
    }

    pub fn list_auctions(&self) -> Vec<Auction> {
        let mut auctions: Vec<Auction> = self.auctions.lock().unwrap().values().cloned().collect();
        auctions.sort_by_key(|a| a.auction_id);
        auctions
    }

    /// Conditional write: succeeds only while the stored document still
    /// carries the version the caller read, then bumps it.
    pub fn update_auction(&self, updated: Auction) -> Result<Auction, Errors> {
        let mut auctions = self.auctions.lock().unwrap();
        let current = auctions
            .get(&updated.auction_id)
            .ok_or(Errors::UnknownAuction(updated.auction_id))?;
        if current.version != updated.version {
            return Err(Errors::VersionConflict(updated.auction_id));
        }
        let mut doc = updated;
        doc.version += 1;
        auctions.insert(doc.auction_id, doc.clone());
        Ok(doc)
    }

    /// Active auctions whose end time has passed.
    pub fn auctions_due(&self, now: DateTime<Utc>) -> Vec<Auction> {
        let mut due: Vec<Auction> = self
            .auctions
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.status == AuctionStatus::Active && a.ends_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|a| a.auction_id);
        due
    }

    // --- users

    pub fn insert_user(&self, user: User) -> Result<(), Errors> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.user_id) {
            return Err(Errors::UserAlreadyExists(user.user_id));
        }
        users.insert(user.user_id.clone(), user);
        Ok(())
    }

    pub fn get_user(&self, user_id: &UserId) -> Result<User, Errors> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| Errors::UnknownUser(user_id.clone()))
    }

    pub fn update_user(&self, user: User) -> Result<(), Errors> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.user_id) {
            return Err(Errors::UnknownUser(user.user_id));
        }
        users.insert(user.user_id.clone(), user);
        Ok(())
    }

    // --- payments

    pub fn insert_payment(&self, payment: BidPayment) {
        self.payments
            .lock()
            .unwrap()
            .insert(payment.payment_id, payment);
    }

    pub fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<BidPayment, Errors> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments
            .get_mut(&payment_id)
            .ok_or(Errors::UnknownPayment(payment_id))?;
        payment.status = status;
        payment.updated_at = now;
        Ok(payment.clone())
    }

    pub fn payments_for_user(&self, user_id: &UserId) -> Vec<BidPayment> {
        let mut payments: Vec<BidPayment> = self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.bidder == *user_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        payments
    }

    pub fn all_payments(&self) -> Vec<BidPayment> {
        let mut payments: Vec<BidPayment> =
            self.payments.lock().unwrap().values().cloned().collect();
        payments.sort_by_key(|p| p.created_at);
        payments
    }

    /// Open (requires_capture) bid authorization for one bidder on one
    /// auction, if any.
    pub fn find_authorization(
        &self,
        auction_id: AuctionId,
        bidder: &UserId,
    ) -> Option<BidPayment> {
        self.payments
            .lock()
            .unwrap()
            .values()
            .find(|p| {
                p.auction_id == auction_id
                    && p.bidder == *bidder
                    && p.kind == PaymentKind::BidAuthorization
                    && p.status == PaymentStatus::RequiresCapture
            })
            .cloned()
    }

    pub fn authorizations_for_auction(&self, auction_id: AuctionId) -> Vec<BidPayment> {
        self.payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                p.auction_id == auction_id
                    && p.kind == PaymentKind::BidAuthorization
                    && p.status == PaymentStatus::RequiresCapture
            })
            .cloned()
            .collect()
    }

    /// A commission charge that already went through for this auction.
    pub fn find_commission_charge(&self, auction_id: AuctionId) -> Option<BidPayment> {
        self.payments
            .lock()
            .unwrap()
            .values()
            .find(|p| {
                p.auction_id == auction_id
                    && p.kind == PaymentKind::FinalCommission
                    && p.status == PaymentStatus::Succeeded
            })
            .cloned()
    }

    /// Applies the cancel-and-replace outcome in one batch: record statuses
    /// and the user's method references change together or not at all.
    pub fn replace_payment_method(
        &self,
        user_id: &UserId,
        customer_ref: &str,
        method_ref: &str,
        canceled: &[Uuid],
        replaced: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<(), Errors> {
        let mut payments = self.payments.lock().unwrap();
        let mut users = self.users.lock().unwrap();

        let user = users
            .get_mut(user_id)
            .ok_or_else(|| Errors::UnknownUser(user_id.clone()))?;

        for payment_id in canceled {
            if let Some(payment) = payments.get_mut(payment_id) {
                payment.status = PaymentStatus::Canceled;
                payment.updated_at = now;
            }
        }
        for payment_id in replaced {
            if let Some(payment) = payments.get_mut(payment_id) {
                payment.status = PaymentStatus::Replaced;
                payment.updated_at = now;
            }
        }

        user.customer_ref = Some(customer_ref.to_string());
        user.payment_method_ref = Some(method_ref.to_string());
        user.payment_verified = true;
        Ok(())
    }

    // --- categories and commissions

    pub fn insert_category(&self, category: Category) -> Result<(), Errors> {
        let mut categories = self.categories.lock().unwrap();
        if categories.contains_key(&category.id) {
            return Err(Errors::CategoryAlreadyExists(category.id));
        }
        categories.insert(category.id.clone(), category);
        Ok(())
    }

    pub fn get_category(&self, id: &str) -> Result<Category, Errors> {
        self.categories
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Errors::UnknownCategory(id.to_string()))
    }

    pub fn update_category(&self, category: Category) -> Result<(), Errors> {
        let mut categories = self.categories.lock().unwrap();
        if !categories.contains_key(&category.id) {
            return Err(Errors::UnknownCategory(category.id));
        }
        categories.insert(category.id.clone(), category);
        Ok(())
    }

    pub fn delete_category(&self, id: &str) -> Result<(), Errors> {
        self.categories
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Errors::UnknownCategory(id.to_string()))
    }

    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.categories.lock().unwrap().values().cloned().collect();
        categories.sort_by(|a, b| a.id.cmp(&b.id));
        categories
    }

    pub fn set_commission_policy(&self, policy: CommissionPolicy) {
        self.commissions
            .lock()
            .unwrap()
            .insert(policy.category.clone(), policy);
    }

    pub fn commission_policy(&self, category: &str) -> Option<CommissionPolicy> {
        self.commissions.lock().unwrap().get(category).cloned()
    }

    pub fn commission_schedule(&self) -> CommissionSchedule {
        CommissionSchedule::new(self.commissions.lock().unwrap().values().cloned())
    }

    // --- watchlists

    pub fn watch(&self, user_id: &UserId, auction_id: AuctionId) -> Result<u32, Errors> {
        let mut auctions = self.auctions.lock().unwrap();
        let auction = auctions
            .get_mut(&auction_id)
            .ok_or(Errors::UnknownAuction(auction_id))?;
        let mut watchlists = self.watchlists.lock().unwrap();
        let added = watchlists
            .entry(user_id.clone())
            .or_default()
            .insert(auction_id);
        if added {
            auction.watch_count += 1;
            auction.version += 1;
        }
        Ok(auction.watch_count)
    }

    pub fn unwatch(&self, user_id: &UserId, auction_id: AuctionId) -> Result<u32, Errors> {
        let mut auctions = self.auctions.lock().unwrap();
        let auction = auctions
            .get_mut(&auction_id)
            .ok_or(Errors::UnknownAuction(auction_id))?;
        let mut watchlists = self.watchlists.lock().unwrap();
        let removed = watchlists
            .get_mut(user_id)
            .map(|ids| ids.remove(&auction_id))
            .unwrap_or(false);
        if removed && auction.watch_count > 0 {
            auction.watch_count -= 1;
            auction.version += 1;
        }
        Ok(auction.watch_count)
    }

    pub fn watchlist(&self, user_id: &UserId) -> Vec<AuctionId> {
        let mut ids: Vec<AuctionId> = self
            .watchlists
            .lock()
            .unwrap()
            .get(user_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    // --- comments

    pub fn add_comment(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }

    pub fn comments_for_auction(&self, auction_id: AuctionId) -> Vec<Comment> {
        self.comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.auction_id == auction_id)
            .cloned()
            .collect()
    }
}
