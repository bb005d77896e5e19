//! Error bridging between engine errors and HTTP responses.
//!
//! Every engine error kind maps to a stable status code and a
//! machine-readable reason code; messages come from the typed errors and
//! never expose internals beyond what the error itself says.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookfair_core_rs::{
    BookingError, GatewayError, LedgerError, PassError, SettlementError,
};
use serde::Serialize;

/// HTTP-facing error
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            message,
        )
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = self.code, message = %self.message, "request failed");
        }

        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::StallNotFound { .. } => Self::not_found(message),
            LedgerError::CodeAlreadyExists { .. } | LedgerError::Stall(_) => {
                Self::conflict(message)
            }
            LedgerError::ConfirmedReservation { .. } => Self::conflict(message),
            LedgerError::HeldByLiveReservation { .. } | LedgerError::ManualReserve { .. } => {
                Self::new(StatusCode::CONFLICT, "INVALID_TRANSITION", message)
            }
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::InvalidStallCount { .. } | BookingError::UnknownStatus(_) => {
                Self::validation(message)
            }
            BookingError::VendorNotFound(_) | BookingError::ReservationNotFound(_) => {
                Self::not_found(message)
            }
            BookingError::EmailAlreadyRegistered(_) => Self::conflict(message),
            BookingError::QuotaExceeded { .. } => {
                Self::new(StatusCode::CONFLICT, "QUOTA_EXCEEDED", message)
            }
            BookingError::Ledger(inner) => inner.into(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::Timeout => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", message)
            }
            GatewayError::Unreachable(_) | GatewayError::Protocol(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", message)
            }
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        let message = err.to_string();
        match err {
            SettlementError::ReservationNotFound(_) | SettlementError::PaymentNotFound(_) => {
                Self::not_found(message)
            }
            SettlementError::PaymentAlreadyExists { .. }
            | SettlementError::ReservationNotPayable { .. }
            | SettlementError::AuditRetention { .. } => Self::conflict(message),
            SettlementError::NotACashPayment { .. }
            | SettlementError::CashViaGateway
            | SettlementError::UnsupportedMethod { .. } => Self::validation(message),
            SettlementError::Gateway(inner) => inner.into(),
            SettlementError::Pass(inner) => inner.into(),
        }
    }
}

impl From<PassError> for ApiError {
    fn from(err: PassError) -> Self {
        let message = err.to_string();
        match err {
            PassError::InvalidToken
            | PassError::ReservationNotFound(_)
            | PassError::NotIssued { .. } => Self::not_found(message),
            PassError::NotConfirmed { .. } => Self::conflict(message),
            PassError::Render(_) => Self::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_maps_to_conflict_with_reason() {
        let err: ApiError = BookingError::QuotaExceeded {
            vendor: "v@fair.test".to_string(),
            requested: 4,
            quota: 3,
        }
        .into();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_gateway_timeout_maps_to_504() {
        let err: ApiError = SettlementError::Gateway(GatewayError::Timeout).into();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_invalid_token_maps_to_404() {
        let err: ApiError = PassError::InvalidToken.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_unknown_status_is_validation() {
        let err: ApiError = BookingError::UnknownStatus(
            bookfair_core_rs::models::ParseStatusError("refunded".to_string()),
        )
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
