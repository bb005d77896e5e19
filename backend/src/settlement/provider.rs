//! Payment provider strategy
//!
//! External gateways are consumed through one trait with one
//! implementation per provider, selected from a registry keyed on payment
//! method. Settlement never interprets the gateway's redirect payload; it
//! hands it back to the caller for the external handshake.
//!
//! Network faults and rejected charges are different things: a rejected
//! charge is a normal business outcome ([`CaptureOutcome::Declined`], it
//! becomes a Failed payment), while an unreachable or misbehaving provider
//! is a [`GatewayError`] that callers may retry.

use crate::models::payment::PaymentMethod;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// External payment provider fault
///
/// Never mapped to a Failed payment: callers must be able to distinguish
/// "the gateway rejected the charge" from "the gateway was unreachable".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("payment gateway unreachable: {0}")]
    Unreachable(String),

    #[error("payment gateway timed out")]
    Timeout,

    #[error("payment gateway protocol error: {0}")]
    Protocol(String),
}

/// Order payload produced by a provider's `initiate`.
///
/// Returned to the caller verbatim for the external approval handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Provider-side order reference, quoted back on confirmation
    pub order_ref: String,

    /// Where the vendor completes the approval, if the provider has one
    pub approval_url: Option<String>,

    /// Amount the order was created for (i64 cents)
    pub amount: i64,
}

/// Result of capturing an order at the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The charge went through
    Captured,

    /// The provider processed the request and rejected the charge
    Declined { reason: String },
}

/// A payment gateway strategy.
///
/// Implementations must bound their network calls and surface expiry as
/// [`GatewayError::Timeout`]; the engine never holds a state lock while
/// these run.
pub trait PaymentProvider: Send + Sync {
    /// The payment method this provider settles
    fn method(&self) -> PaymentMethod;

    /// Create an order for the given amount, returning the redirect payload
    fn initiate(&self, amount: i64) -> Result<GatewayOrder, GatewayError>;

    /// Capture a previously created order
    fn capture(&self, order_ref: &str) -> Result<CaptureOutcome, GatewayError>;
}

/// Registry of providers, keyed by the method they support.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Later registrations for the same method shadow
    /// earlier ones.
    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers.insert(0, provider);
    }

    /// Find the provider for a method.
    pub fn get(&self, method: PaymentMethod) -> Option<Arc<dyn PaymentProvider>> {
        self.providers
            .iter()
            .find(|p| p.method() == method)
            .cloned()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let methods: Vec<PaymentMethod> = self.providers.iter().map(|p| p.method()).collect();
        f.debug_struct("ProviderRegistry")
            .field("methods", &methods)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::sandbox::{SandboxMode, SandboxProvider};

    #[test]
    fn test_registry_lookup_by_method() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.get(PaymentMethod::Gateway).is_none());

        registry.register(Arc::new(SandboxProvider::new(SandboxMode::Approve)));

        assert!(registry.get(PaymentMethod::Gateway).is_some());
        assert!(registry.get(PaymentMethod::Cash).is_none());
    }

    #[test]
    fn test_later_registration_shadows() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(SandboxProvider::new(SandboxMode::Decline)));
        registry.register(Arc::new(SandboxProvider::new(SandboxMode::Approve)));

        let provider = registry.get(PaymentMethod::Gateway).unwrap();
        let order = provider.initiate(10_000).unwrap();
        assert_eq!(provider.capture(&order.order_ref), Ok(CaptureOutcome::Captured));
    }
}
