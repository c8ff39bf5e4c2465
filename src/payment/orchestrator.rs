// src/payment/orchestrator.rs
use chrono::Utc;
use log::warn;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Auction, CommissionSchedule, Errors, User, UserId};
use crate::money::{Amount, AmountValue};
use crate::persistence::store::Database;
use super::provider::PaymentProvider;
use super::records::{BidPayment, PaymentKind, PaymentStatus};

/// Outcome of a cancel-and-replace pass over a user's authorizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodReplacement {
    pub canceled: usize,
    pub replaced: usize,
}

/// Drives the injected provider and keeps the BidPayment audit trail in
/// step with what the provider reports.
pub struct PaymentOrchestrator {
    provider: Arc<dyn PaymentProvider>,
    db: Arc<Database>,
    /// Fixed authorization ceiling, held in the auction's currency.
    hold_ceiling: AmountValue,
}

impl PaymentOrchestrator {
    pub fn new(provider: Arc<dyn PaymentProvider>, db: Arc<Database>, hold_ceiling: AmountValue) -> Self {
        PaymentOrchestrator {
            provider,
            db,
            hold_ceiling,
        }
    }

    fn billing_refs(user: &User) -> Result<(&str, &str), Errors> {
        match (&user.customer_ref, &user.payment_method_ref) {
            (Some(customer), Some(method)) if user.payment_verified => {
                Ok((customer.as_str(), method.as_str()))
            }
            _ => Err(Errors::PaymentMethodNotVerified(user.user_id.clone())),
        }
    }

    /// Places a manual-capture hold for the fixed ceiling against the
    /// bidder's stored method. One live hold per (auction, bidder): an
    /// existing open authorization is reused.
    pub async fn authorize_bid(
        &self,
        auction: &Auction,
        bidder: &User,
        bid_amount: Amount,
    ) -> Result<BidPayment, Errors> {
        if let Some(existing) = self
            .db
            .find_authorization(auction.auction_id, &bidder.user_id)
        {
            return Ok(existing);
        }

        let (customer, method) = Self::billing_refs(bidder)?;
        let ceiling = Amount::new(auction.currency, self.hold_ceiling);
        let intent_ref = self
            .provider
            .create_hold(customer, method, ceiling)
            .await
            .map_err(|e| Errors::Payment(e.to_string()))?;

        let now = Utc::now();
        let record = BidPayment {
            payment_id: Uuid::new_v4(),
            auction_id: auction.auction_id,
            bidder: bidder.user_id.clone(),
            bid_amount,
            commission_amount: bid_amount.with_value(0),
            total_amount: ceiling,
            intent_ref,
            status: PaymentStatus::RequiresCapture,
            kind: PaymentKind::BidAuthorization,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_payment(record.clone());
        Ok(record)
    }

    /// Collects the commission once an auction resolves with a winner:
    /// captures the winner's outstanding authorization when one exists,
    /// otherwise charges the stored method directly. The resulting record is
    /// persisted as succeeded or processing_failed either way; a failed
    /// capture leaves the authorization untouched for manual reconciliation.
    pub async fn charge_winner(
        &self,
        auction: &Auction,
        schedule: &CommissionSchedule,
    ) -> Result<BidPayment, Errors> {
        let winner_id = auction
            .winner
            .clone()
            .ok_or_else(|| Errors::InvalidRequest(format!(
                "auction {} has no winner to charge",
                auction.auction_id
            )))?;
        let final_price = auction.final_price.ok_or_else(|| {
            Errors::InvalidRequest(format!("auction {} has no final price", auction.auction_id))
        })?;

        if let Some(existing) = self.db.find_commission_charge(auction.auction_id) {
            return Ok(existing);
        }

        let commission = schedule.commission_for(&auction.category, final_price);
        let now = Utc::now();

        let authorization = self.db.find_authorization(auction.auction_id, &winner_id);
        let (intent_ref, status) = match &authorization {
            Some(auth) => match self.provider.capture(&auth.intent_ref, commission).await {
                Ok(()) => {
                    self.db
                        .update_payment_status(auth.payment_id, PaymentStatus::Succeeded, now)?;
                    (auth.intent_ref.clone(), PaymentStatus::Succeeded)
                }
                Err(e) => {
                    warn!(
                        "capture failed for auction {} winner {}: {}",
                        auction.auction_id, winner_id, e
                    );
                    (auth.intent_ref.clone(), PaymentStatus::ProcessingFailed)
                }
            },
            None => {
                let winner = self.db.get_user(&winner_id)?;
                match Self::billing_refs(&winner) {
                    Ok((customer, method)) => {
                        match self.provider.charge(customer, method, commission).await {
                            Ok(intent_ref) => (intent_ref, PaymentStatus::Succeeded),
                            Err(e) => {
                                warn!(
                                    "charge failed for auction {} winner {}: {}",
                                    auction.auction_id, winner_id, e
                                );
                                (String::new(), PaymentStatus::ProcessingFailed)
                            }
                        }
                    }
                    Err(_) => {
                        warn!(
                            "auction {} winner {} has no chargeable method",
                            auction.auction_id, winner_id
                        );
                        (String::new(), PaymentStatus::ProcessingFailed)
                    }
                }
            }
        };

        let record = BidPayment {
            payment_id: Uuid::new_v4(),
            auction_id: auction.auction_id,
            bidder: winner_id,
            bid_amount: final_price,
            commission_amount: commission,
            total_amount: commission,
            intent_ref,
            status,
            kind: PaymentKind::FinalCommission,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_payment(record.clone());
        Ok(record)
    }

    /// Verifies and attaches a new payment method. Every open authorization
    /// is cancelled at the provider (best-effort: an individual failure is
    /// logged and does not abort the rest), then all record statuses and the
    /// user's method reference change in a single store batch.
    pub async fn update_payment_method(
        &self,
        user_id: &UserId,
        customer_ref: &str,
        method_ref: &str,
    ) -> Result<MethodReplacement, Errors> {
        self.db.get_user(user_id)?;
        self.provider
            .verify_method(customer_ref, method_ref)
            .await
            .map_err(|e| Errors::Payment(e.to_string()))?;

        let payments = self.db.payments_for_user(user_id);
        let to_cancel: Vec<&BidPayment> = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::RequiresCapture)
            .collect();
        let to_replace: Vec<&BidPayment> = payments
            .iter()
            .filter(|p| p.kind == PaymentKind::BidAuthorization && p.status == PaymentStatus::Succeeded)
            .collect();

        for payment in &to_cancel {
            if let Err(e) = self.provider.cancel_hold(&payment.intent_ref).await {
                warn!(
                    "cancel failed for intent {} of {}: {}",
                    payment.intent_ref, user_id, e
                );
            }
        }

        let canceled_ids: Vec<Uuid> = to_cancel.iter().map(|p| p.payment_id).collect();
        let replaced_ids: Vec<Uuid> = to_replace.iter().map(|p| p.payment_id).collect();
        self.db.replace_payment_method(
            user_id,
            customer_ref,
            method_ref,
            &canceled_ids,
            &replaced_ids,
            Utc::now(),
        )?;

        Ok(MethodReplacement {
            canceled: canceled_ids.len(),
            replaced: replaced_ids.len(),
        })
    }

    /// Releases the open authorizations of everyone who did not win the
    /// auction. Provider cancellation is best-effort; records are marked
    /// canceled regardless so the audit trail reflects the decision.
    pub async fn release_losing_holds(&self, auction: &Auction) -> usize {
        let mut released = 0;
        for payment in self.db.authorizations_for_auction(auction.auction_id) {
            if auction.winner.as_ref() == Some(&payment.bidder) {
                continue;
            }
            if let Err(e) = self.provider.cancel_hold(&payment.intent_ref).await {
                warn!(
                    "release failed for intent {} on auction {}: {}",
                    payment.intent_ref, auction.auction_id, e
                );
            }
            if self
                .db
                .update_payment_status(payment.payment_id, PaymentStatus::Canceled, Utc::now())
                .is_ok()
            {
                released += 1;
            }
        }
        released
    }
}
