// src/payment/provider.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::money::Amount;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Unknown payment intent: {0}")]
    UnknownIntent(String),

    #[error("Payment provider unavailable: {0}")]
    Unavailable(String),
}

/// The payment-provider capability the orchestrator depends on. Injected so
/// tests (and alternative providers) can substitute their own implementation.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Checks the stored method can be charged before it is attached.
    async fn verify_method(&self, customer: &str, method: &str) -> Result<(), ProviderError>;

    /// Places a manual-capture authorization hold and returns its intent
    /// reference.
    async fn create_hold(
        &self,
        customer: &str,
        method: &str,
        amount: Amount,
    ) -> Result<String, ProviderError>;

    /// Converts a hold into an actual charge for `amount`.
    async fn capture(&self, intent_ref: &str, amount: Amount) -> Result<(), ProviderError>;

    /// Releases a hold without charging it.
    async fn cancel_hold(&self, intent_ref: &str) -> Result<(), ProviderError>;

    /// Direct charge without a prior hold; returns the intent reference.
    async fn charge(
        &self,
        customer: &str,
        method: &str,
        amount: Amount,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Open,
    Captured,
    Canceled,
}

/// Deterministic in-process provider backing the binary and default tests.
/// Tracks holds by intent reference so capture/cancel misuse surfaces as
/// `UnknownIntent` instead of silently succeeding.
#[derive(Default)]
pub struct SandboxProvider {
    holds: Mutex<HashMap<String, HoldState>>,
}

impl SandboxProvider {
    pub fn new() -> Self {
        SandboxProvider::default()
    }

    fn require_refs(customer: &str, method: &str) -> Result<(), ProviderError> {
        if customer.is_empty() || method.is_empty() {
            return Err(ProviderError::Declined(
                "missing customer or payment method reference".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for SandboxProvider {
    async fn verify_method(&self, customer: &str, method: &str) -> Result<(), ProviderError> {
        Self::require_refs(customer, method)
    }

    async fn create_hold(
        &self,
        customer: &str,
        method: &str,
        _amount: Amount,
    ) -> Result<String, ProviderError> {
        Self::require_refs(customer, method)?;
        let intent_ref = format!("hold_{}", Uuid::new_v4().simple());
        self.holds
            .lock()
            .unwrap()
            .insert(intent_ref.clone(), HoldState::Open);
        Ok(intent_ref)
    }

    async fn capture(&self, intent_ref: &str, _amount: Amount) -> Result<(), ProviderError> {
        let mut holds = self.holds.lock().unwrap();
        match holds.get_mut(intent_ref) {
            Some(state) if *state == HoldState::Open => {
                *state = HoldState::Captured;
                Ok(())
            }
            Some(_) => Err(ProviderError::Declined(format!(
                "intent {} is no longer open",
                intent_ref
            ))),
            None => Err(ProviderError::UnknownIntent(intent_ref.to_string())),
        }
    }

    async fn cancel_hold(&self, intent_ref: &str) -> Result<(), ProviderError> {
        let mut holds = self.holds.lock().unwrap();
        match holds.get_mut(intent_ref) {
            Some(state) if *state == HoldState::Open => {
                *state = HoldState::Canceled;
                Ok(())
            }
            Some(_) => Err(ProviderError::Declined(format!(
                "intent {} is no longer open",
                intent_ref
            ))),
            None => Err(ProviderError::UnknownIntent(intent_ref.to_string())),
        }
    }

    async fn charge(
        &self,
        customer: &str,
        method: &str,
        _amount: Amount,
    ) -> Result<String, ProviderError> {
        Self::require_refs(customer, method)?;
        Ok(format!("charge_{}", Uuid::new_v4().simple()))
    }
}
