//! Middleware configuration and payment requirements builder

use crate::types::{networks, schemes, FacilitatorConfig, Network, PaymentRequirements};
use crate::{Result, X402Error};
use rust_decimal::{Decimal, RoundingStrategy};

/// Base units per whole token. Fixed at six decimals whatever the asset.
const BASE_UNITS_PER_TOKEN: u64 = 1_000_000;

/// EIP-712 domain of an explicitly configured asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDomain {
    pub name: String,
    pub version: String,
}

/// Configuration for payment middleware
#[derive(Debug, Clone)]
pub struct PaymentMiddlewareConfig {
    /// Payment amount in decimal units (e.g., 0.01 for one cent)
    pub amount: Decimal,
    /// Recipient wallet address
    pub pay_to: String,
    /// Payment description
    pub description: Option<String>,
    /// MIME type of the expected response
    pub mime_type: Option<String>,
    /// Maximum timeout in seconds
    pub max_timeout_seconds: u32,
    /// JSON schema for response format
    pub output_schema: Option<serde_json::Value>,
    /// Facilitator configuration
    pub facilitator_config: FacilitatorConfig,
    /// Whether this is a testnet
    pub testnet: bool,
    /// Custom paywall HTML for web browsers
    pub custom_paywall_html: Option<String>,
    /// Resource URL (if different from request URL)
    pub resource: Option<String>,
    /// Resource root URL for constructing full resource URLs
    pub resource_root_url: Option<String>,
    /// Explicit network key (e.g. "polygon", "polygon-amoy")
    pub network: Option<String>,
    /// Explicit token contract address
    pub asset: Option<String>,
    /// Signing domain for an explicit asset the registry does not know
    pub asset_domain: Option<AssetDomain>,
}

impl PaymentMiddlewareConfig {
    /// Create a new payment middleware config
    pub fn new(amount: Decimal, pay_to: impl Into<String>) -> Self {
        Self {
            amount,
            pay_to: pay_to.into(),
            description: None,
            mime_type: None,
            max_timeout_seconds: 60,
            output_schema: None,
            facilitator_config: FacilitatorConfig::default(),
            testnet: true,
            custom_paywall_html: None,
            resource: None,
            resource_root_url: None,
            network: None,
            asset: None,
            asset_domain: None,
        }
    }

    /// Set the payment description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the maximum timeout
    pub fn with_max_timeout_seconds(mut self, max_timeout_seconds: u32) -> Self {
        self.max_timeout_seconds = max_timeout_seconds;
        self
    }

    /// Set the output schema
    pub fn with_output_schema(mut self, output_schema: serde_json::Value) -> Self {
        self.output_schema = Some(output_schema);
        self
    }

    /// Set the facilitator configuration
    pub fn with_facilitator_config(mut self, facilitator_config: FacilitatorConfig) -> Self {
        self.facilitator_config = facilitator_config;
        self
    }

    /// Set whether this is a testnet
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Set custom paywall HTML
    pub fn with_custom_paywall_html(mut self, html: impl Into<String>) -> Self {
        self.custom_paywall_html = Some(html.into());
        self
    }

    /// Set the resource URL
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the resource root URL
    pub fn with_resource_root_url(mut self, url: impl Into<String>) -> Self {
        self.resource_root_url = Some(url.into());
        self
    }

    /// Set an explicit network key
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Set an explicit token contract address
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    /// Set the EIP-712 domain for an explicit asset
    pub fn with_asset_domain(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.asset_domain = Some(AssetDomain {
            name: name.into(),
            version: version.into(),
        });
        self
    }

    /// Amount in base units, `round(amount * 10^6)`
    pub fn max_amount_required(&self) -> Result<String> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(X402Error::invalid_payment_requirements(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }

        let units = self
            .amount
            .checked_mul(Decimal::from(BASE_UNITS_PER_TOKEN))
            .ok_or_else(|| {
                X402Error::invalid_payment_requirements(format!(
                    "amount {} is out of range",
                    self.amount
                ))
            })?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .normalize();

        Ok(units.to_string())
    }

    /// Pick the network and asset the request will be priced in.
    ///
    /// Legacy Base defaults apply only when neither a network nor an asset
    /// is configured. An explicit network other than the Polygon pair keeps
    /// the Base mainnet USDC address.
    pub fn select_network_and_asset(&self) -> (String, String) {
        let mut network = networks::BASE_MAINNET;
        let mut asset = Network::Mainnet.usdc_address();

        if let Some(explicit) = self.network.as_deref() {
            network = explicit;
        }

        if let Some(explicit) = self.asset.as_deref() {
            return (network.to_string(), explicit.to_string());
        }

        match self.network.as_deref() {
            Some(networks::POLYGON_MAINNET) | Some(networks::POLYGON_AMOY) => {
                if let Some(address) = networks::get_usdc_address(network) {
                    asset = address;
                }
            }
            None => {
                let legacy = Network::from_testnet(self.testnet);
                network = legacy.as_str();
                asset = legacy.usdc_address();
            }
            Some(_) => {}
        }

        (network.to_string(), asset.to_string())
    }

    /// Resolve the resource URL for a request path
    pub fn resource_for(&self, request_path: &str) -> String {
        match &self.resource {
            Some(resource) => resource.clone(),
            None => format!(
                "{}{}",
                self.resource_root_url.as_deref().unwrap_or_default(),
                request_path
            ),
        }
    }

    /// Create payment requirements for a request path
    pub fn create_payment_requirements(&self, request_path: &str) -> Result<PaymentRequirements> {
        let max_amount_required = self.max_amount_required()?;
        let (network, asset) = self.select_network_and_asset();

        let mut requirements = PaymentRequirements::new(
            schemes::EXACT,
            network,
            max_amount_required,
            asset,
            &self.pay_to,
            self.resource_for(request_path),
            self.description.clone().unwrap_or_default(),
        );

        requirements.mime_type = self.mime_type.clone().unwrap_or_default();
        requirements.output_schema = self.output_schema.clone();
        requirements.max_timeout_seconds = self.max_timeout_seconds;

        self.attach_asset_metadata(&mut requirements)?;

        Ok(requirements)
    }

    /// USDC domains are keyed by the testnet flag, not by the network, so
    /// `polygon` on the default testnet setting signs against `"USDC"`.
    fn attach_asset_metadata(&self, requirements: &mut PaymentRequirements) -> Result<()> {
        let usdc = Network::from_testnet(self.testnet);

        if let Some(info) = networks::find_asset(&requirements.network, &requirements.asset) {
            requirements.set_asset_domain(usdc.usdc_name(), info.version);
            return Ok(());
        }

        if let Some(domain) = &self.asset_domain {
            requirements.set_asset_domain(&domain.name, &domain.version);
            return Ok(());
        }

        // Explicit non-Polygon network still priced in the Base default asset
        if requirements
            .asset
            .eq_ignore_ascii_case(Network::Mainnet.usdc_address())
        {
            requirements.set_usdc_info(usdc);
            return Ok(());
        }

        Err(X402Error::AssetMetadataNotFound {
            network: requirements.network.clone(),
            asset: requirements.asset.clone(),
        })
    }
}
