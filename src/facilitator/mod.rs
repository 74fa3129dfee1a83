//! Facilitator client for payment verification and settlement
//!
//! A facilitator is the remote service that checks payment authorizations
//! against the chain and executes settlement. The gate only depends on the
//! [`Facilitator`] trait; [`FacilitatorClient`] is the HTTP implementation.
//!
//! # Examples
//!
//! ```no_run
//! use x402_gate::facilitator::{Facilitator, FacilitatorClient};
//! use x402_gate::types::FacilitatorConfig;
//!
//! # async fn example() -> x402_gate::Result<()> {
//! let config = FacilitatorConfig::new("https://x402.org/facilitator");
//! let client = FacilitatorClient::new(config)?;
//!
//! # let payment_payload = todo!();
//! # let payment_requirements = todo!();
//! let verify_response = client.verify(&payment_payload, &payment_requirements).await?;
//! if verify_response.is_valid {
//!     let settle_response = client.settle(&payment_payload, &payment_requirements).await?;
//!     println!("Payment settled: {}", settle_response.transaction);
//! }
//! # Ok(())
//! # }
//! ```

use crate::types::{
    FacilitatorConfig, PaymentPayload, PaymentRequirements, SettleResponse, SupportedKinds,
    VerifyResponse, X402_VERSION,
};
use crate::{Result, X402Error};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::sync::Arc;


pub use crate::types::DEFAULT_FACILITATOR_URL;

/// Verification and settlement backend used by the payment gate.
///
/// Each method is called at most once per request. Errors mean the call
/// itself failed (transport, malformed reply); an explicit rejection is
/// reported through the response value.
#[async_trait]
pub trait Facilitator: Send + Sync {
    /// Verify a payment without executing the transaction
    async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse>;

    /// Settle a verified payment by executing the transaction
    async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse>;
}

#[async_trait]
impl<T: Facilitator + ?Sized> Facilitator for Arc<T> {
    async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        (**self).verify(payment_payload, payment_requirements).await
    }

    async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        (**self).settle(payment_payload, payment_requirements).await
    }
}

/// HTTP facilitator client
#[derive(Clone)]
pub struct FacilitatorClient {
    /// Base URL of the facilitator service
    url: String,
    /// HTTP client
    client: Client,
    /// Configuration for authentication headers
    auth_config: Option<crate::types::AuthHeaders>,
}

impl std::fmt::Debug for FacilitatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorClient")
            .field("url", &self.url)
            .field("auth_config", &"<function>")
            .finish()
    }
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: FacilitatorConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| X402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            client,
            auth_config: config.create_auth_headers,
        })
    }

    /// Get the base URL of this facilitator
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get supported payment schemes and networks
    pub async fn supported(&self) -> Result<SupportedKinds> {
        let request = self.client.get(format!("{}/supported", self.url));
        let response = self.with_auth_headers(request, "supported")?.send().await?;

        if !response.status().is_success() {
            return Err(X402Error::facilitator_error(format!(
                "Failed to get supported kinds with status: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    fn with_auth_headers(&self, mut request: RequestBuilder, endpoint: &str) -> Result<RequestBuilder> {
        if let Some(auth_config) = &self.auth_config {
            let headers = auth_config()?;
            if let Some(endpoint_headers) = headers.get(endpoint) {
                for (key, value) in endpoint_headers {
                    request = request.header(key, value);
                }
            }
        }
        Ok(request)
    }

    async fn post(
        &self,
        endpoint: &str,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<reqwest::Response> {
        let request_body = json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payment_payload,
            "paymentRequirements": payment_requirements,
        });

        tracing::debug!(
            "Facilitator {} request body: {}",
            endpoint,
            serde_json::to_string(&request_body).unwrap_or_default()
        );

        let request = self
            .client
            .post(format!("{}/{}", self.url, endpoint))
            .json(&request_body);
        let response = self.with_auth_headers(request, endpoint)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                "Facilitator {} failed with status: {}. Response body: {}",
                endpoint,
                status,
                response_body
            );
            return Err(X402Error::facilitator_error(format!(
                "{} failed with status: {}. Response: {}",
                endpoint, status, response_body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl Facilitator for FacilitatorClient {
    async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        let response = self
            .post("verify", payment_payload, payment_requirements)
            .await?;
        Ok(response.json().await?)
    }

    async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        let response = self
            .post("settle", payment_payload, payment_requirements)
            .await?;
        Ok(response.json().await?)
    }
}
