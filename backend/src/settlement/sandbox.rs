//! Sandbox payment provider
//!
//! In-memory gateway used in development and tests. Behavior is scripted
//! through [`SandboxMode`]: approve every capture, decline every capture,
//! or simulate an unreachable provider. Orders are tracked so a capture of
//! a reference the sandbox never minted is a protocol error, like a real
//! gateway rejecting an unknown order id.

use crate::models::payment::PaymentMethod;
use crate::settlement::provider::{CaptureOutcome, GatewayError, GatewayOrder, PaymentProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted sandbox behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxMode {
    /// Every capture succeeds
    Approve,

    /// Every capture is declined (the charge is rejected, not errored)
    Decline,

    /// The provider is offline; every call is a `GatewayError`
    Unreachable,
}

/// Scriptable in-memory gateway
pub struct SandboxProvider {
    mode: Mutex<SandboxMode>,
    orders: Mutex<HashMap<String, i64>>,
    captures: AtomicUsize,
}

impl SandboxProvider {
    pub fn new(mode: SandboxMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            orders: Mutex::new(HashMap::new()),
            captures: AtomicUsize::new(0),
        }
    }

    /// Re-script the sandbox mid-test.
    pub fn set_mode(&self, mode: SandboxMode) {
        *self.mode.lock().expect("sandbox mode lock poisoned") = mode;
    }

    /// Number of capture calls that reached the provider.
    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    fn mode(&self) -> SandboxMode {
        *self.mode.lock().expect("sandbox mode lock poisoned")
    }
}

impl PaymentProvider for SandboxProvider {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Gateway
    }

    fn initiate(&self, amount: i64) -> Result<GatewayOrder, GatewayError> {
        if self.mode() == SandboxMode::Unreachable {
            return Err(GatewayError::Unreachable(
                "sandbox gateway is offline".to_string(),
            ));
        }

        let order_ref = format!("sandbox-{}", uuid::Uuid::new_v4());
        self.orders
            .lock()
            .expect("sandbox order lock poisoned")
            .insert(order_ref.clone(), amount);

        Ok(GatewayOrder {
            approval_url: Some(format!("https://sandbox.gateway.test/approve/{order_ref}")),
            order_ref,
            amount,
        })
    }

    fn capture(&self, order_ref: &str) -> Result<CaptureOutcome, GatewayError> {
        if self.mode() == SandboxMode::Unreachable {
            return Err(GatewayError::Unreachable(
                "sandbox gateway is offline".to_string(),
            ));
        }

        self.captures.fetch_add(1, Ordering::SeqCst);

        if !self
            .orders
            .lock()
            .expect("sandbox order lock poisoned")
            .contains_key(order_ref)
        {
            return Err(GatewayError::Protocol(format!(
                "unknown order reference: {order_ref}"
            )));
        }

        match self.mode() {
            SandboxMode::Approve => Ok(CaptureOutcome::Captured),
            SandboxMode::Decline => Ok(CaptureOutcome::Declined {
                reason: "sandbox declined the charge".to_string(),
            }),
            SandboxMode::Unreachable => unreachable!("handled above"),
        }
    }
}
