// src/payment/mod.rs
pub mod orchestrator;
pub mod provider;
pub mod records;

pub use self::orchestrator::{MethodReplacement, PaymentOrchestrator};
pub use self::provider::{PaymentProvider, ProviderError, SandboxProvider};
pub use self::records::{BidPayment, PaymentKind, PaymentStatus};
