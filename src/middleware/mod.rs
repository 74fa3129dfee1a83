//! Middleware implementations for web frameworks
//!
//! This module puts a route behind x402 payment. The gate derives the payment
//! requirements for each request, challenges unpaid requests with 402, verifies
//! the `X-PAYMENT` proof with the facilitator, runs the handler into a buffer,
//! settles, and only then releases the handler's output together with the
//! `X-PAYMENT-RESPONSE` receipt.
//!
//! - [`config`] - Middleware configuration and payment requirements builder
//! - [`payment`] - The payment gate and the axum middleware function
//! - [`service`] - Tower service layer for framework integration
//! - [`sink`] - Buffering and passthrough response sinks
//!
//! # Examples
//!
//! ## Basic Axum Integration
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//! use x402_gate::middleware::{payment_middleware, PaymentMiddleware};
//!
//! # fn example() -> x402_gate::Result<()> {
//! let middleware = PaymentMiddleware::new(
//!     Decimal::from_str("0.01").unwrap(),
//!     "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
//! )
//! .with_description("API Access")
//! .with_testnet(true);
//!
//! let app: Router = Router::new()
//!     .route("/api/protected", get(|| async { "Protected content" }))
//!     .layer(axum::middleware::from_fn_with_state(middleware, payment_middleware));
//! # Ok(())
//! # }
//! ```
//!
//! ## Polygon with an explicit facilitator
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use x402_gate::middleware::PaymentMiddleware;
//! use x402_gate::types::FacilitatorConfig;
//!
//! let middleware = PaymentMiddleware::new(Decimal::new(5, 2), "0x209693Bc6afc0C5328bA36FaF03C514EF312287C")
//!     .with_network("polygon")
//!     .with_facilitator_config(FacilitatorConfig::new("https://facilitator.example.com"))
//!     .with_resource_root_url("https://api.example.com");
//! ```
//!
//! # Response Handling
//!
//! Unpaid requests get a 402. Browsers (`Accept: text/html` and a `Mozilla`
//! user agent) receive the paywall page; other clients receive
//! `{"error", "accepts", "x402Version"}` JSON.

pub mod config;
pub mod payment;
pub mod service;
pub mod sink;


// Re-export commonly used types
pub use config::{AssetDomain, PaymentMiddlewareConfig};
pub use payment::{
    is_web_browser, payment_middleware, Aborted, HandlerAborted, PaymentMiddleware, PaymentResult,
    PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER,
};
pub use service::{create_payment_service, PaymentService, PaymentServiceLayer};
pub use sink::{BufferedResponse, ResponseSink, ResponseWriter};
