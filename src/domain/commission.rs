// src/domain/commission.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::money::{Amount, AmountValue};
use super::core::CategoryId;

/// Rate applied when a category has no policy of its own.
pub const DEFAULT_RATE_BPS: u32 = 500;

/// Marketplace fee for one category: a percentage in basis points with an
/// optional absolute cap. Singleton per category, admin-mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPolicy {
    pub category: CategoryId,
    pub rate_bps: u32,
    pub cap: Option<AmountValue>,
}

/// All category policies plus the fallback rate. Lookup is deterministic
/// and side-effect-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionSchedule {
    policies: HashMap<CategoryId, CommissionPolicy>,
    default_rate_bps: u32,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        CommissionSchedule {
            policies: HashMap::new(),
            default_rate_bps: DEFAULT_RATE_BPS,
        }
    }
}

impl CommissionSchedule {
    pub fn new(policies: impl IntoIterator<Item = CommissionPolicy>) -> Self {
        CommissionSchedule {
            policies: policies
                .into_iter()
                .map(|p| (p.category.clone(), p))
                .collect(),
            default_rate_bps: DEFAULT_RATE_BPS,
        }
    }

    pub fn policy(&self, category: &str) -> Option<&CommissionPolicy> {
        self.policies.get(category)
    }

    /// Commission owed on a sale: `amount * rate / 10_000`, clamped to the
    /// category's cap when one is set.
    pub fn commission_for(&self, category: &str, amount: Amount) -> Amount {
        let (rate_bps, cap) = match self.policies.get(category) {
            Some(policy) => (policy.rate_bps, policy.cap),
            None => (self.default_rate_bps, None),
        };

        let raw = amount.value() * rate_bps as i64 / 10_000;
        let owed = match cap {
            Some(cap) => raw.min(cap),
            None => raw,
        };
        amount.with_value(owed)
    }
}
