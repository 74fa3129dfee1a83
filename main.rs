//! x402 Gate Demo Server
//!
//! Serves a paid `/joke` endpoint behind the x402 payment gate and a free
//! `/health` endpoint. Configuration comes from the environment.

use axum::{response::Json, routing::get, Router};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use x402_gate::{
    facilitator::FacilitatorClient,
    middleware::{payment_middleware, PaymentMiddleware},
    types::{FacilitatorConfig, DEFAULT_FACILITATOR_URL},
    X402Error, X402_VERSION,
};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:4021".to_string());
    let pay_to = env::var("X402_PAY_TO")
        .map_err(|_| X402Error::config("X402_PAY_TO must be set to the recipient address"))?;
    let amount = env::var("X402_AMOUNT").unwrap_or_else(|_| "0.01".to_string());
    let amount = Decimal::from_str(&amount)
        .map_err(|e| X402Error::config(format!("Invalid X402_AMOUNT {}: {}", amount, e)))?;
    let facilitator_url =
        env::var("X402_FACILITATOR_URL").unwrap_or_else(|_| DEFAULT_FACILITATOR_URL.to_string());
    let testnet = env::var("X402_TESTNET")
        .map(|value| value != "false" && value != "0")
        .unwrap_or(true);

    let mut facilitator_config = FacilitatorConfig::new(facilitator_url);
    if let Ok(token) = env::var("X402_FACILITATOR_TOKEN") {
        facilitator_config = facilitator_config.with_bearer_token(token);
    }
    facilitator_config.validate()?;

    let mut middleware = PaymentMiddleware::new(amount, pay_to)
        .with_description("A programming joke")
        .with_mime_type("application/json")
        .with_facilitator_config(facilitator_config.clone())
        .with_testnet(testnet);

    if let Ok(network) = env::var("X402_NETWORK") {
        middleware = middleware.with_network(network);
    }
    if let Ok(asset) = env::var("X402_ASSET") {
        middleware = middleware.with_asset(asset);
    }
    if let Ok(root_url) = env::var("X402_RESOURCE_ROOT_URL") {
        middleware = middleware.with_resource_root_url(root_url);
    }

    // Fail at startup rather than on the first request
    let requirements = middleware.config().create_payment_requirements("/joke")?;
    tracing::info!(
        network = %requirements.network,
        asset = %requirements.asset,
        max_amount_required = %requirements.max_amount_required,
        "Payment requirements ready"
    );

    let facilitator = FacilitatorClient::new(facilitator_config)?;
    match facilitator.supported().await {
        Ok(supported) if supported.supports(&requirements.scheme, &requirements.network) => {}
        Ok(_) => tracing::warn!(
            network = %requirements.network,
            "Facilitator does not list this network; payments may fail"
        ),
        Err(e) => tracing::warn!("Could not query facilitator capabilities: {}", e),
    }

    let paid = Router::new()
        .route("/joke", get(joke_handler))
        .layer(axum::middleware::from_fn_with_state(
            middleware,
            payment_middleware,
        ));

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(paid)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("x402 gate server running on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn joke_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "joke": "Why do programmers prefer dark mode? Because light attracts bugs!"
    }))
}

/// Health check endpoint
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": x402_gate::VERSION,
        "x402_version": X402_VERSION,
    }))
}
