//! Paywall page served to browser clients
//!
//! A deliberately small page: it names the resource and the price and embeds
//! the payment requirements as JSON for a wallet script to pick up. Operators
//! who need a full checkout flow supply their own markup through
//! `with_custom_paywall_html`.

use crate::types::PaymentRequirements;
use rust_decimal::Decimal;

/// Branding for the default paywall page
#[derive(Debug, Clone)]
pub struct PaywallConfig {
    pub app_name: String,
    pub app_logo: Option<String>,
}

impl Default for PaywallConfig {
    fn default() -> Self {
        Self {
            app_name: "x402 Service".to_string(),
            app_logo: None,
        }
    }
}

impl PaywallConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name shown in the page title
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Set the logo URL
    pub fn with_app_logo(mut self, app_logo: impl Into<String>) -> Self {
        self.app_logo = Some(app_logo.into());
        self
    }
}

/// Render the default paywall page
pub fn generate_paywall_html(
    error: &str,
    payment_requirements: &[PaymentRequirements],
    config: &PaywallConfig,
) -> String {
    let price = payment_requirements
        .first()
        .map(display_price)
        .unwrap_or_default();
    let description = payment_requirements
        .first()
        .map(|r| r.description.as_str())
        .unwrap_or_default();
    // Keep `</script>` inside string values from closing the tag
    let requirements_json = serde_json::to_string(payment_requirements)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");
    let logo = config
        .app_logo
        .as_deref()
        .map(|src| format!(r#"<img src="{}" alt="" height="48">"#, escape_html(src)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Payment Required - {app_name}</title>
</head>
<body>
{logo}
<h1>Payment Required</h1>
<p>{description}</p>
<p>Price: {price}</p>
<p>{error}</p>
<script>window.x402 = {{ paymentRequirements: {requirements_json} }};</script>
</body>
</html>"#,
        app_name = escape_html(&config.app_name),
        logo = logo,
        description = escape_html(description),
        price = escape_html(&price),
        error = escape_html(error),
        requirements_json = requirements_json,
    )
}

/// Human-readable price, e.g. `0.01 USDC on base-sepolia`
fn display_price(requirements: &PaymentRequirements) -> String {
    let amount = requirements
        .max_amount_required
        .parse::<Decimal>()
        .map(|units| (units / Decimal::from(1_000_000u64)).normalize().to_string())
        .unwrap_or_else(|_| requirements.max_amount_required.clone());
    format!("{} USDC on {}", amount, requirements.network)
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
