//! Facilitator endpoint settings and the verify/settle/supported replies

use crate::{Result, X402Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Public x402.org facilitator
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// Extra request headers per facilitator endpoint (`"verify"`, `"settle"`,
/// `"supported"`), header name to value.
pub type EndpointHeaders = HashMap<String, HashMap<String, String>>;

/// Produces [`EndpointHeaders`] for each facilitator call
pub type AuthHeaders = Arc<dyn Fn() -> Result<EndpointHeaders> + Send + Sync>;

/// Where and how to reach the facilitator
#[derive(Clone)]
pub struct FacilitatorConfig {
    pub url: String,
    /// HTTP client timeout covering each verify/settle round-trip
    pub timeout: Option<Duration>,
    /// Called before every request; an `Err` fails that request
    pub create_auth_headers: Option<AuthHeaders>,
}

impl std::fmt::Debug for FacilitatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorConfig")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field(
                "create_auth_headers",
                &self.create_auth_headers.as_ref().map(|_| "<function>"),
            )
            .finish()
    }
}

impl FacilitatorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            create_auth_headers: None,
        }
    }

    /// Reject empty, unparsable and non-http(s) URLs
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(X402Error::config("Facilitator URL cannot be empty"));
        }

        match url::Url::parse(&self.url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            Ok(parsed) => Err(X402Error::config(format!(
                "Facilitator URL must use http or https, got {}",
                parsed.scheme()
            ))),
            Err(e) => Err(X402Error::config(format!(
                "Invalid facilitator URL {}: {}",
                self.url, e
            ))),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Compute per-endpoint headers before each facilitator call
    pub fn with_auth_headers<F>(mut self, creator: F) -> Self
    where
        F: Fn() -> Result<EndpointHeaders> + Send + Sync + 'static,
    {
        self.create_auth_headers = Some(Arc::new(creator));
        self
    }

    /// Send `Authorization: Bearer <token>` to every facilitator endpoint
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        let value = format!("Bearer {}", token.into());
        self.with_auth_headers(move || {
            Ok(["verify", "settle", "supported"]
                .into_iter()
                .map(|endpoint| {
                    let headers = HashMap::from([("Authorization".to_string(), value.clone())]);
                    (endpoint.to_string(), headers)
                })
                .collect())
        })
    }
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FACILITATOR_URL)
    }
}

/// Reply to `POST /verify`. `is_valid == false` is a rejection, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(rename = "invalidReason", skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Reply to `POST /settle`; also the decoded `X-PAYMENT-RESPONSE` receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleResponse {
    pub success: bool,
    #[serde(rename = "errorReason", skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// On-chain transaction hash
    pub transaction: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Reply to `GET /supported`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedKinds {
    pub kinds: Vec<SupportedKind>,
}

impl SupportedKinds {
    /// Whether the facilitator accepts `scheme` payments on `network`
    pub fn supports(&self, scheme: &str, network: &str) -> bool {
        self.kinds
            .iter()
            .any(|kind| kind.scheme == scheme && kind.network == network)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedKind {
    #[serde(rename = "x402Version")]
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(FacilitatorConfig::default().validate().is_ok());
        assert!(FacilitatorConfig::new("").validate().is_err());
        assert!(FacilitatorConfig::new("not a url").validate().is_err());
        assert!(FacilitatorConfig::new("ftp://example.com").validate().is_err());
    }

    #[test]
    fn test_bearer_token_covers_every_endpoint() {
        let config = FacilitatorConfig::default().with_bearer_token("secret");
        let create = config.create_auth_headers.unwrap();
        let headers = create().unwrap();

        for endpoint in ["verify", "settle", "supported"] {
            assert_eq!(headers[endpoint]["Authorization"], "Bearer secret");
        }
    }

    #[test]
    fn test_supported_kinds_lookup() {
        let supported: SupportedKinds = serde_json::from_value(serde_json::json!({
            "kinds": [{ "x402Version": 1, "scheme": "exact", "network": "polygon" }]
        }))
        .unwrap();

        assert!(supported.supports("exact", "polygon"));
        assert!(!supported.supports("exact", "base"));
    }
}
