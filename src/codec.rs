//! Header codec for payment payloads and settlement receipts
//!
//! Both travel as standard-alphabet base64 of their JSON encoding.

use crate::types::{PaymentPayload, SettleResponse, X402_VERSION};
use crate::{Result, X402Error};
use base64::{engine::general_purpose, Engine as _};

/// Decode the `X-PAYMENT` header into a payment payload.
///
/// The decoded `x402Version` is replaced with the server's protocol version;
/// whatever the client sent is ignored.
pub fn decode_payment_header(header: &str) -> Result<PaymentPayload> {
    let header = header.trim();
    if header.is_empty() {
        return Err(X402Error::decode("payment header is empty"));
    }

    let json = general_purpose::STANDARD
        .decode(header)
        .map_err(|e| X402Error::decode(format!("invalid base64: {}", e)))?;
    let mut payload: PaymentPayload = serde_json::from_slice(&json)
        .map_err(|e| X402Error::decode(format!("invalid payment payload: {}", e)))?;

    payload.x402_version = X402_VERSION;
    Ok(payload)
}

/// Encode a payment payload into header form
pub fn encode_payment_payload(payload: &PaymentPayload) -> Result<String> {
    let json = serde_json::to_vec(payload).map_err(|e| X402Error::encode(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(json))
}

/// Encode a settlement receipt for the `X-PAYMENT-RESPONSE` header
pub fn encode_settle_response(settlement: &SettleResponse) -> Result<String> {
    let json = serde_json::to_vec(settlement).map_err(|e| X402Error::encode(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(json))
}

/// Decode an `X-PAYMENT-RESPONSE` header value back into a receipt
pub fn decode_settle_response(header: &str) -> Result<SettleResponse> {
    let json = general_purpose::STANDARD.decode(header.trim())?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_payload() -> PaymentPayload {
        PaymentPayload::new(
            "exact",
            "base-sepolia",
            json!({
                "signature": "0x2d6a7588d6acca505cbf0d9a4a227e0c52c6c34008c8e8986a1283259764173608a2ce6496642e377d6da8dbbf5836e9bd15092f9ecab05ded3d6293af148b571c",
                "authorization": {
                    "from": "0x857b06519E91e3A54538791bDbb0E22373e36b66",
                    "to": "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
                    "value": "10000",
                    "validAfter": "1745323800",
                    "validBefore": "1745323985",
                    "nonce": "0xf3746613c2d920b5fdabc0856f2aeb2d4f88ee6037b8cc5d04a71a4462f13480"
                }
            }),
        )
    }

    #[test]
    fn test_decode_payment_header() {
        let encoded = encode_payment_payload(&test_payload()).unwrap();
        let decoded = decode_payment_header(&encoded).unwrap();
        assert_eq!(decoded, test_payload());
    }

    #[test]
    fn test_decode_overwrites_client_version() {
        let raw = json!({
            "x402Version": 7,
            "scheme": "exact",
            "network": "base",
            "payload": {}
        });
        let encoded = general_purpose::STANDARD.encode(raw.to_string());
        let decoded = decode_payment_header(&encoded).unwrap();
        assert_eq!(decoded.x402_version, X402_VERSION);

        let without_version = json!({"scheme": "exact", "network": "base", "payload": {}});
        let encoded = general_purpose::STANDARD.encode(without_version.to_string());
        assert_eq!(
            decode_payment_header(&encoded).unwrap().x402_version,
            X402_VERSION
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for header in ["", "   ", "not base64!!", "aGVsbG8gd29ybGQ="] {
            let err = decode_payment_header(header).unwrap_err();
            assert!(matches!(err, X402Error::Decode { .. }), "{header}: {err}");
        }

        // Valid JSON, wrong shape
        let encoded = general_purpose::STANDARD.encode(r#"{"scheme":"exact"}"#);
        assert!(matches!(
            decode_payment_header(&encoded),
            Err(X402Error::Decode { .. })
        ));
    }

    #[test]
    fn test_settle_response_header() {
        let settlement = SettleResponse {
            success: true,
            error_reason: None,
            transaction: "0x1234567890abcdef".to_string(),
            network: "base-sepolia".to_string(),
            payer: Some("0x857b06519E91e3A54538791bDbb0E22373e36b66".to_string()),
        };
        let header = encode_settle_response(&settlement).unwrap();
        assert!(!header.contains('{'));
        assert_eq!(decode_settle_response(&header).unwrap(), settlement);
    }
}
