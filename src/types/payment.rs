//! Payment-related types

use super::network::Network;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// x402 protocol version
pub const X402_VERSION: u32 = 1;

/// Payment requirements for a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequirements {
    /// Payment scheme identifier (e.g., "exact")
    pub scheme: String,
    /// Blockchain network identifier (e.g., "base-sepolia", "polygon")
    pub network: String,
    /// Required payment amount in atomic token units
    #[serde(rename = "maxAmountRequired")]
    pub max_amount_required: String,
    /// Token contract address
    pub asset: String,
    /// Recipient wallet address for the payment
    #[serde(rename = "payTo")]
    pub pay_to: String,
    /// URL of the protected resource
    pub resource: String,
    /// Human-readable description of the resource
    pub description: String,
    /// MIME type of the expected response
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// JSON schema describing the response format
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Maximum time allowed for payment completion in seconds
    #[serde(rename = "maxTimeoutSeconds")]
    pub max_timeout_seconds: u32,
    /// Scheme-specific additional information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl PaymentRequirements {
    /// Create a new payment requirements instance
    pub fn new(
        scheme: impl Into<String>,
        network: impl Into<String>,
        max_amount_required: impl Into<String>,
        asset: impl Into<String>,
        pay_to: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            network: network.into(),
            max_amount_required: max_amount_required.into(),
            asset: asset.into(),
            pay_to: pay_to.into(),
            resource: resource.into(),
            description: description.into(),
            mime_type: String::new(),
            output_schema: None,
            max_timeout_seconds: 60,
            extra: None,
        }
    }

    /// Attach the EIP-712 domain (`name`, `version`) the client signs against
    pub fn set_asset_domain(&mut self, name: &str, version: &str) {
        self.extra = Some(serde_json::json!({
            "name": name,
            "version": version,
        }));
    }

    /// Set the legacy USDC domain information, keyed by mainnet/testnet
    pub fn set_usdc_info(&mut self, network: Network) {
        self.set_asset_domain(network.usdc_name(), "2");
    }
}

/// Payment payload carried in the `X-PAYMENT` header.
///
/// The scheme-specific proof in `payload` is forwarded to the facilitator
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPayload {
    /// Protocol version identifier
    #[serde(rename = "x402Version", default)]
    pub x402_version: u32,
    /// Payment scheme identifier
    pub scheme: String,
    /// Blockchain network identifier
    pub network: String,
    /// Scheme-specific proof (signature and authorization)
    pub payload: Value,
}

impl PaymentPayload {
    /// Create a new payment payload
    pub fn new(scheme: impl Into<String>, network: impl Into<String>, payload: Value) -> Self {
        Self {
            x402_version: X402_VERSION,
            scheme: scheme.into(),
            network: network.into(),
            payload,
        }
    }
}

/// Body of every 402 challenge and error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequirementsResponse {
    /// Protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,
    /// Human-readable error message
    pub error: String,
    /// Array of acceptable payment methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts: Option<Vec<PaymentRequirements>>,
}

impl PaymentRequirementsResponse {
    /// Create a new payment requirements response
    pub fn new(error: impl Into<String>, accepts: Vec<PaymentRequirements>) -> Self {
        Self {
            x402_version: X402_VERSION,
            error: error.into(),
            accepts: Some(accepts),
        }
    }

    /// Error body without payment options, used for internal faults
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            x402_version: X402_VERSION,
            error: error.into(),
            accepts: None,
        }
    }
}
