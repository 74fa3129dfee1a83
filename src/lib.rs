//! # x402 Payment Gate
//!
//! Axum/tower middleware that puts HTTP routes behind x402 micropayments.
//!
//! ## Features
//!
//! - **HTTP 402 challenges**: JSON `accepts` list for API clients, a paywall page for browsers
//! - **Facilitator integration**: payment verification and settlement over HTTP
//! - **Commit-point buffering**: handler output is held until settlement succeeds
//! - **Multi-network pricing**: Base, Avalanche and Polygon USDC out of the box
//! - **Settlement receipts**: the `X-PAYMENT-RESPONSE` header on every paid response
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{response::Json, routing::get, Router};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//! use x402_gate::middleware::{payment_middleware, PaymentMiddleware};
//! use x402_gate::types::FacilitatorConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let middleware = PaymentMiddleware::new(
//!         Decimal::from_str("0.0001")?,
//!         "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
//!     )
//!     .with_description("Premium API access")
//!     .with_facilitator_config(FacilitatorConfig::default())
//!     .with_testnet(true);
//!
//!     let app = Router::new()
//!         .route("/joke", get(joke_handler))
//!         .layer(axum::middleware::from_fn_with_state(middleware, payment_middleware));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:4021").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//!
//! async fn joke_handler() -> Json<serde_json::Value> {
//!     Json(serde_json::json!({
//!         "joke": "Why do programmers prefer dark mode? Because light attracts bugs!"
//!     }))
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: Wire types, network registry and facilitator configuration
//! - **`codec`**: Base64 JSON codecs for the payment and receipt headers
//! - **`facilitator`**: The `Facilitator` trait and its HTTP client
//! - **`middleware`**: The payment gate, axum middleware and tower layer
//! - **`template`**: Paywall HTML for browser clients
//! - **`error`**: Error type and HTTP mapping

pub mod codec;
pub mod error;
pub mod facilitator;
pub mod middleware;
pub mod template;
pub mod types;

// Re-exports for convenience
pub use error::{Result, X402Error};
pub use facilitator::{Facilitator, FacilitatorClient};
pub use middleware::{payment_middleware, PaymentMiddleware, PaymentMiddlewareConfig};
pub use types::*;

/// Current version of the x402-gate library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
