//! Pass delivery collaborators
//!
//! Rendering and notification are external capabilities: the engine only
//! depends on the two traits here. [`deliver`] is the one place in the
//! system where failures are logged and swallowed: the payment that
//! triggered delivery has already settled and must not be rolled back by a
//! notification fault. Operators re-send through the pass-image path
//! instead.

use crate::passes::IssuedPass;
use crate::passes::ReservationSummary;
use thiserror::Error;

/// Rendering failure reported by a [`PassRenderer`]
#[derive(Debug, Error, PartialEq)]
#[error("pass rendering failed: {0}")]
pub struct RenderError(pub String);

/// Delivery failure reported by a [`PassNotifier`]
#[derive(Debug, Error, PartialEq)]
#[error("pass notification failed: {0}")]
pub struct NotifyError(pub String);

/// Renders a scannable image for a pass token payload.
pub trait PassRenderer: Send + Sync {
    fn render(&self, payload: &str) -> Result<Vec<u8>, RenderError>;
}

/// Hands a rendered pass to the vendor (mail or equivalent).
pub trait PassNotifier: Send + Sync {
    fn send(
        &self,
        recipient: &str,
        image: &[u8],
        summary: &ReservationSummary,
    ) -> Result<(), NotifyError>;
}

/// Development stand-in renderer: emits the raw payload bytes.
///
/// Deployments wire a real QR encoder behind [`PassRenderer`] here.
#[derive(Debug, Clone, Default)]
pub struct PlainTextRenderer;

impl PassRenderer for PlainTextRenderer {
    fn render(&self, payload: &str) -> Result<Vec<u8>, RenderError> {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Development stand-in notifier: logs the dispatch instead of mailing.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

impl PassNotifier for LoggingNotifier {
    fn send(
        &self,
        recipient: &str,
        _image: &[u8],
        summary: &ReservationSummary,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            recipient,
            reservation_id = %summary.reservation_id,
            stalls = ?summary.stall_codes,
            "entry pass dispatched"
        );
        Ok(())
    }
}

/// Render and send a freshly issued pass, best-effort.
///
/// Failures are logged and swallowed; the caller's transaction has already
/// committed.
pub fn deliver(renderer: &dyn PassRenderer, notifier: &dyn PassNotifier, issued: &IssuedPass) {
    let image = match renderer.render(issued.pass.token()) {
        Ok(image) => image,
        Err(err) => {
            tracing::error!(
                reservation_id = %issued.summary.reservation_id,
                error = %err,
                "failed to render entry pass"
            );
            return;
        }
    };

    if let Err(err) = notifier.send(&issued.recipient, &image, &issued.summary) {
        tracing::error!(
            reservation_id = %issued.summary.reservation_id,
            recipient = %issued.recipient,
            error = %err,
            "failed to deliver entry pass"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pass::EntryPass;
    use crate::models::reservation::ReservationStatus;
    use chrono::Utc;

    struct FailingRenderer;

    impl PassRenderer for FailingRenderer {
        fn render(&self, _payload: &str) -> Result<Vec<u8>, RenderError> {
            Err(RenderError("encoder unavailable".to_string()))
        }
    }

    fn issued_fixture() -> IssuedPass {
        IssuedPass {
            pass: EntryPass::new("res-1".to_string()),
            recipient: "vendor@fair.test".to_string(),
            vendor_name: "Vendor Books".to_string(),
            summary: ReservationSummary {
                reservation_id: "res-1".to_string(),
                vendor_id: "vendor-1".to_string(),
                stall_codes: vec!["A-01".to_string()],
                reservation_date: Utc::now(),
                status: ReservationStatus::Confirmed,
            },
        }
    }

    #[test]
    fn test_plain_renderer_round_trips_payload() {
        let rendered = PlainTextRenderer.render("token-123").unwrap();
        assert_eq!(rendered, b"token-123");
    }

    #[test]
    fn test_deliver_swallows_render_failure() {
        // Must not panic or propagate
        deliver(&FailingRenderer, &LoggingNotifier, &issued_fixture());
    }
}
