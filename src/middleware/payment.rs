//! Payment middleware implementation

use super::config::{AssetDomain, PaymentMiddlewareConfig};
use super::sink::{BufferedResponse, ResponseSink, ResponseWriter};
use crate::codec;
use crate::facilitator::{Facilitator, FacilitatorClient};
use crate::template::{generate_paywall_html, PaywallConfig};
use crate::types::{PaymentRequirements, PaymentRequirementsResponse, SettleResponse};
use crate::{Result, X402Error};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

/// Request header carrying the encoded payment payload
pub const PAYMENT_HEADER: &str = "X-PAYMENT";
/// Response header carrying the encoded settlement receipt
pub const PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";

/// Response extension set by [`Aborted`]
#[derive(Debug, Clone, Copy)]
pub struct HandlerAborted;

/// Wraps a handler response to end the request without settling.
///
/// The wrapped response goes to the client as-is and no payment is taken.
///
/// Only responses wrapped in `Aborted` skip settlement. Any other response
/// is settled whatever its status, including the 4xx rejections axum's
/// extractors produce before the handler body runs. Take the extractor as a
/// `Result` and wrap the rejection to keep the client from paying for it:
///
/// ```
/// use axum::{extract::rejection::JsonRejection, response::{IntoResponse, Response}, Json};
/// use x402_gate::middleware::Aborted;
///
/// async fn handler(body: Result<Json<serde_json::Value>, JsonRejection>) -> Response {
///     match body {
///         Ok(Json(value)) => Json(value).into_response(),
///         Err(rejection) => Aborted(rejection).into_response(),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Aborted<R>(pub R);

impl<R: IntoResponse> IntoResponse for Aborted<R> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        response.extensions_mut().insert(HandlerAborted);
        response
    }
}

/// Axum middleware for x402 payments
#[derive(Clone)]
pub struct PaymentMiddleware {
    pub config: Arc<PaymentMiddlewareConfig>,
    pub facilitator: Option<Arc<dyn Facilitator>>,
    pub template_config: Option<PaywallConfig>,
}

impl std::fmt::Debug for PaymentMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentMiddleware")
            .field("config", &self.config)
            .field("facilitator", &self.facilitator.as_ref().map(|_| "<facilitator>"))
            .field("template_config", &self.template_config)
            .finish()
    }
}

/// Payment processing result
#[derive(Debug)]
pub enum PaymentResult {
    /// Payment verified and settled successfully
    Success {
        response: Response,
        settlement: SettleResponse,
    },
    /// No usable payment was presented (402 challenge)
    PaymentRequired { response: Response },
    /// Facilitator rejected the payment
    VerificationFailed { response: Response },
    /// The handler ended the request itself; nothing was settled
    Aborted { response: Response },
    /// Settlement failed; the handler's output was discarded
    SettlementFailed { response: Response },
    /// Internal fault before or after settlement (500)
    Error { response: Response },
}

impl IntoResponse for PaymentResult {
    fn into_response(self) -> Response {
        match self {
            PaymentResult::Success { response, .. }
            | PaymentResult::PaymentRequired { response }
            | PaymentResult::VerificationFailed { response }
            | PaymentResult::Aborted { response }
            | PaymentResult::SettlementFailed { response }
            | PaymentResult::Error { response } => response,
        }
    }
}

impl PaymentMiddleware {
    /// Create a new payment middleware
    pub fn new(amount: rust_decimal::Decimal, pay_to: impl Into<String>) -> Self {
        Self::from_config(PaymentMiddlewareConfig::new(amount, pay_to))
    }

    /// Create a payment middleware from a prepared configuration
    pub fn from_config(config: PaymentMiddlewareConfig) -> Self {
        let facilitator = build_facilitator(&config);
        Self {
            config: Arc::new(config),
            facilitator,
            template_config: None,
        }
    }

    /// Set the payment description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).description = Some(description.into());
        self
    }

    /// Set the MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).mime_type = Some(mime_type.into());
        self
    }

    /// Set the maximum timeout
    pub fn with_max_timeout_seconds(mut self, max_timeout_seconds: u32) -> Self {
        Arc::make_mut(&mut self.config).max_timeout_seconds = max_timeout_seconds;
        self
    }

    /// Set the output schema
    pub fn with_output_schema(mut self, output_schema: serde_json::Value) -> Self {
        Arc::make_mut(&mut self.config).output_schema = Some(output_schema);
        self
    }

    /// Set the facilitator configuration.
    ///
    /// Replaces any facilitator set earlier with an HTTP client for the new
    /// endpoint.
    pub fn with_facilitator_config(
        mut self,
        facilitator_config: crate::types::FacilitatorConfig,
    ) -> Self {
        Arc::make_mut(&mut self.config).facilitator_config = facilitator_config;
        self.facilitator = build_facilitator(&self.config);
        self
    }

    /// Set whether this is a testnet
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        Arc::make_mut(&mut self.config).testnet = testnet;
        self
    }

    /// Set custom paywall HTML
    pub fn with_custom_paywall_html(mut self, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).custom_paywall_html = Some(html.into());
        self
    }

    /// Set the resource URL
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).resource = Some(resource.into());
        self
    }

    /// Set the resource root URL
    pub fn with_resource_root_url(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).resource_root_url = Some(url.into());
        self
    }

    /// Set an explicit network key
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).network = Some(network.into());
        self
    }

    /// Set an explicit token contract address
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).asset = Some(asset.into());
        self
    }

    /// Set the EIP-712 domain for an explicit asset
    pub fn with_asset_domain(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).asset_domain = Some(AssetDomain {
            name: name.into(),
            version: version.into(),
        });
        self
    }

    /// Get the middleware configuration
    pub fn config(&self) -> &PaymentMiddlewareConfig {
        &self.config
    }

    /// Set the facilitator
    pub fn with_facilitator(mut self, facilitator: impl Facilitator + 'static) -> Self {
        self.facilitator = Some(Arc::new(facilitator));
        self
    }

    /// Set the template configuration
    pub fn with_template_config(mut self, template_config: PaywallConfig) -> Self {
        self.template_config = Some(template_config);
        self
    }

    fn facilitator(&self) -> Result<Arc<dyn Facilitator>> {
        match &self.facilitator {
            Some(facilitator) => Ok(Arc::clone(facilitator)),
            None => {
                let client = FacilitatorClient::new(self.config.facilitator_config.clone())?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Run one request through the payment gate.
    ///
    /// `run` executes the protected handler. Its response is buffered and
    /// only released once settlement has succeeded; an `Err` from `run` is
    /// returned untouched and nothing is settled.
    pub async fn process_payment<F, Fut, E>(
        &self,
        request: Request,
        run: F,
    ) -> std::result::Result<PaymentResult, E>
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = std::result::Result<Response, E>>,
    {
        tracing::debug!("Payment middleware checking request: {}", request.uri());

        let is_web_browser = is_web_browser(request.headers());

        let payment_requirements =
            match self.config.create_payment_requirements(request.uri().path()) {
                Ok(requirements) => requirements,
                Err(e) => {
                    tracing::error!("Failed to create payment requirements: {}", e);
                    return Ok(PaymentResult::Error {
                        response: internal_error_response(&e),
                    });
                }
            };

        let payment_payload = match request.headers().get(PAYMENT_HEADER) {
            None => None,
            Some(value) => {
                let decoded = value
                    .to_str()
                    .map_err(|e| X402Error::decode(e.to_string()))
                    .and_then(codec::decode_payment_header);
                match decoded {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        tracing::debug!("Ignoring undecodable payment header: {}", e);
                        None
                    }
                }
            }
        };

        let Some(payment_payload) = payment_payload else {
            let response = self.payment_required_response(
                "X-PAYMENT header is required",
                &payment_requirements,
                is_web_browser,
            );
            return Ok(PaymentResult::PaymentRequired { response });
        };

        let facilitator = match self.facilitator() {
            Ok(facilitator) => facilitator,
            Err(e) => {
                tracing::error!("Failed to create facilitator client: {}", e);
                return Ok(PaymentResult::Error {
                    response: internal_error_response(&e),
                });
            }
        };

        let verify_response = match facilitator
            .verify(&payment_payload, &payment_requirements)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to verify payment: {}", e);
                return Ok(PaymentResult::Error {
                    response: internal_error_response(&e),
                });
            }
        };

        if !verify_response.is_valid {
            let reason = verify_response
                .invalid_reason
                .unwrap_or_else(|| "Payment verification failed".to_string());
            tracing::warn!("Invalid payment: {}", reason);
            return Ok(PaymentResult::VerificationFailed {
                response: payment_error_response(&reason, &payment_requirements),
            });
        }

        tracing::info!(
            payer = verify_response.payer.as_deref().unwrap_or("unknown"),
            "Payment verified, proceeding"
        );

        let response = run(request).await?;

        if response.extensions().get::<HandlerAborted>().is_some() {
            tracing::debug!("Handler aborted the request, skipping settlement");
            return Ok(PaymentResult::Aborted { response });
        }

        let buffer = match BufferedResponse::capture(response).await {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::error!("{}", e);
                return Ok(PaymentResult::Error {
                    response: internal_error_response(&e),
                });
            }
        };

        let settlement = match facilitator
            .settle(&payment_payload, &payment_requirements)
            .await
        {
            Ok(settlement) if settlement.success => settlement,
            Ok(settlement) => {
                let reason = settlement
                    .error_reason
                    .unwrap_or_else(|| "settlement was not successful".to_string());
                let e = X402Error::settlement_failed(reason);
                tracing::warn!("Settlement failed: {}", e);
                return Ok(PaymentResult::SettlementFailed {
                    response: payment_error_response(&e.to_string(), &payment_requirements),
                });
            }
            Err(e) => {
                tracing::warn!("Settlement failed: {}", e);
                return Ok(PaymentResult::SettlementFailed {
                    response: payment_error_response(&e.to_string(), &payment_requirements),
                });
            }
        };

        let receipt = codec::encode_settle_response(&settlement);
        Ok(release_buffer(buffer, receipt, settlement))
    }

    /// Create payment required response
    fn payment_required_response(
        &self,
        error: &str,
        payment_requirements: &PaymentRequirements,
        is_web_browser: bool,
    ) -> Response {
        if !is_web_browser {
            return payment_error_response(error, payment_requirements);
        }

        let html = match &self.config.custom_paywall_html {
            Some(custom_html) => custom_html.clone(),
            None => generate_paywall_html(
                error,
                std::slice::from_ref(payment_requirements),
                &self.template_config.clone().unwrap_or_default(),
            ),
        };

        (StatusCode::PAYMENT_REQUIRED, Html(html)).into_response()
    }
}

fn build_facilitator(config: &PaymentMiddlewareConfig) -> Option<Arc<dyn Facilitator>> {
    FacilitatorClient::new(config.facilitator_config.clone())
        .ok()
        .map(|client| Arc::new(client) as Arc<dyn Facilitator>)
}

/// Browsers get the HTML paywall, everything else the JSON challenge
pub fn is_web_browser(headers: &HeaderMap) -> bool {
    header_str(headers, header::ACCEPT).contains("text/html")
        && header_str(headers, header::USER_AGENT).contains("Mozilla")
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Commit point: flush the handler's output, then attach the receipt.
///
/// The receipt overrides any `X-PAYMENT-RESPONSE` the handler set, and is
/// added to the handler's `Access-Control-Expose-Headers` rather than
/// replacing them. If the receipt cannot be encoded the buffer is dropped
/// and the client gets a 500 instead.
pub(crate) fn release_buffer(
    buffer: BufferedResponse,
    receipt: Result<String>,
    settlement: SettleResponse,
) -> PaymentResult {
    let header_value = receipt.and_then(|receipt| {
        HeaderValue::from_str(&receipt).map_err(|e| X402Error::encode(e.to_string()))
    });
    let header_value = match header_value {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Settle header encoding failed: {}", e);
            return PaymentResult::Error {
                response: internal_error_response(&e),
            };
        }
    };

    tracing::info!(
        transaction = %settlement.transaction,
        network = %settlement.network,
        "Payment settled"
    );

    let mut writer = ResponseWriter::new();
    buffer.flush(&mut writer);

    // The receipt is ours; a handler header of the same name is replaced
    let headers = writer.headers_mut();
    headers.insert(PAYMENT_RESPONSE_HEADER, header_value);
    let exposed = headers
        .get_all(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|name| name.trim().eq_ignore_ascii_case(PAYMENT_RESPONSE_HEADER));
    if !exposed {
        headers.append(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(PAYMENT_RESPONSE_HEADER),
        );
    }

    PaymentResult::Success {
        response: writer.into_response(),
        settlement,
    }
}

/// 402 with the accepted payment requirements
fn payment_error_response(error: &str, payment_requirements: &PaymentRequirements) -> Response {
    let body = PaymentRequirementsResponse::new(error, vec![payment_requirements.clone()]);
    (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
}

/// 500 without payment options
fn internal_error_response(error: &X402Error) -> Response {
    let body = PaymentRequirementsResponse::error(error.to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Axum middleware function for handling x402 payments
pub async fn payment_middleware(
    State(middleware): State<PaymentMiddleware>,
    request: Request,
    next: Next,
) -> Response {
    let result = middleware
        .process_payment(request, |request| async move {
            Ok::<_, Infallible>(next.run(request).await)
        })
        .await;

    match result {
        Ok(result) => result.into_response(),
        Err(never) => match never {},
    }
}
