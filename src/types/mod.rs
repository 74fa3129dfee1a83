//! Core types for the x402 protocol
//!
//! Wire-level data structures exchanged between the client, the gate and the
//! facilitator, plus the static table of known stable-coin deployments.
//!
//! - [`constants`] - Network identifiers, schemes and the USDC registry
//! - [`network`] - Mainnet/testnet switch behind the legacy Base defaults
//! - [`payment`] - Payment requirements, payloads and 402 response bodies
//! - [`facilitator`] - Facilitator configuration and response types
//!
//! # Examples
//!
//! ```
//! use x402_gate::types::{networks, PaymentRequirements};
//!
//! let mut requirements = PaymentRequirements::new(
//!     "exact",
//!     "base-sepolia",
//!     "10000",
//!     networks::get_usdc_address("base-sepolia").unwrap(),
//!     "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
//!     "https://api.example.com/resource",
//!     "API access payment",
//! );
//! requirements.set_asset_domain("USDC", "2");
//! assert!(requirements.extra.is_some());
//! ```

pub mod constants;
pub mod facilitator;
pub mod network;
pub mod payment;

// Re-export commonly used types
pub use constants::{networks, schemes};
pub use facilitator::{
    AuthHeaders, EndpointHeaders, FacilitatorConfig, SettleResponse,
    SupportedKind, SupportedKinds, VerifyResponse, DEFAULT_FACILITATOR_URL,
};
pub use network::Network;
pub use payment::{PaymentPayload, PaymentRequirements, PaymentRequirementsResponse, X402_VERSION};
