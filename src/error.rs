//! Error types for the x402 gate

use crate::X402_VERSION;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Result type alias for x402 gate operations
pub type Result<T> = std::result::Result<T, X402Error>;

/// Errors produced while computing requirements, talking to the facilitator
/// or encoding protocol headers.
#[derive(Error, Debug)]
pub enum X402Error {
    /// Payment header could not be decoded
    #[error("Failed to decode payment header: {reason}")]
    Decode { reason: String },

    /// Settlement receipt could not be encoded
    #[error("Failed to encode settlement response: {reason}")]
    Encode { reason: String },

    /// No signing metadata is known for the selected asset
    #[error("No asset metadata for asset {asset} on network {network}")]
    AssetMetadataNotFound { network: String, asset: String },

    #[error("Invalid payment requirements: {reason}")]
    InvalidPaymentRequirements { reason: String },

    #[error("Payment settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// Handler response body could not be read into the buffer
    #[error("Failed to capture handler response: {reason}")]
    ResponseCapture { reason: String },

    #[error("Facilitator error: {message}")]
    FacilitatorError { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl X402Error {
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    pub fn invalid_payment_requirements(reason: impl Into<String>) -> Self {
        Self::InvalidPaymentRequirements {
            reason: reason.into(),
        }
    }

    pub fn settlement_failed(reason: impl Into<String>) -> Self {
        Self::SettlementFailed {
            reason: reason.into(),
        }
    }

    pub fn facilitator_error(message: impl Into<String>) -> Self {
        Self::FacilitatorError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to when it ends a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            X402Error::Decode { .. } | X402Error::SettlementFailed { .. } => {
                StatusCode::PAYMENT_REQUIRED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for X402Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "x402Version": X402_VERSION,
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            X402Error::decode("empty").status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            X402Error::encode("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            X402Error::settlement_failed("reverted").status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            X402Error::facilitator_error("down").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_messages() {
        let err = X402Error::AssetMetadataNotFound {
            network: "avalanche".to_string(),
            asset: "0xdead".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No asset metadata for asset 0xdead on network avalanche"
        );
    }
}
