//! Wire types for the payment gateway's JSON contract.
//!
//! Field names are PascalCase on the wire (the provider's convention);
//! everything else in this crate stays snake_case.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Payment request body.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    /// Merchant identifier.
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    /// Amount in the gateway unit.
    #[serde(rename = "Amount")]
    pub amount: i64,
    /// Human-readable description shown on the hosted page.
    #[serde(rename = "Description")]
    pub description: String,
    /// URL the gateway calls back after the payment attempt.
    #[serde(rename = "CallbackURL")]
    pub callback_url: String,
}

/// Payment request reply.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequestResponse {
    /// Gateway status code; 100 means the request was accepted.
    #[serde(rename = "Status")]
    pub status: i32,
    /// Authority token for the accepted request, empty otherwise.
    #[serde(rename = "Authority", default)]
    pub authority: String,
    /// Error messages accompanying a rejection.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Verification request body.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest {
    /// Merchant identifier.
    #[serde(rename = "MerchantID")]
    pub merchant_id: String,
    /// Amount in the gateway unit, recomputed from the order.
    #[serde(rename = "Amount")]
    pub amount: i64,
    /// Authority token being verified.
    #[serde(rename = "Authority")]
    pub authority: String,
}

/// Verification reply.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    /// Gateway status code; 100 settled, 101 already settled.
    #[serde(rename = "Status")]
    pub status: i32,
    /// Payment reference id, present on a settled verification.
    #[serde(rename = "RefID")]
    pub ref_id: Option<i64>,
}

/// Outcome of a verification call, decoded from the gateway's codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The payment settled now; `ref_id` is the gateway's receipt.
    Verified {
        /// Gateway payment reference id.
        ref_id: i64,
    },
    /// The payment had already been settled by an earlier call.
    AlreadyVerified,
    /// The gateway declined the verification.
    Declined {
        /// Gateway status code.
        code: i32,
        /// Local description of the code.
        message: String,
    },
}

/// Convert an order total to the integer amount the gateway expects.
///
/// The gateway's unit is a tenth of the store currency, so the total is
/// multiplied by 10 and rounded to the nearest whole unit.
#[must_use]
pub fn gateway_amount(total: Decimal) -> i64 {
    (total * Decimal::TEN)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Local descriptions for the gateway's common status codes.
#[must_use]
pub const fn status_description(code: i32) -> &'static str {
    match code {
        -1 => "the payment request information is incomplete",
        -2 => "the merchant id or calling address is not valid",
        -3 => "the amount is below the gateway's minimum",
        -11 => "no payment request was found for this authority",
        -22 => "the transaction failed",
        -33 => "the amount does not match the amount paid",
        -54 => "the authority token has expired",
        101 => "the payment was already verified",
        _ => "unrecognized gateway status code",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_payment_request_wire_names() {
        let request = PaymentRequest {
            merchant_id: "m-123".to_string(),
            amount: 250,
            description: "order 7".to_string(),
            callback_url: "https://shop.example/orders/verify".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "MerchantID": "m-123",
                "Amount": 250,
                "Description": "order 7",
                "CallbackURL": "https://shop.example/orders/verify",
            })
        );
    }

    #[test]
    fn test_payment_request_response_shapes() {
        let accepted: PaymentRequestResponse =
            serde_json::from_value(json!({"Status": 100, "Authority": "A0001"})).unwrap();
        assert_eq!(accepted.status, 100);
        assert_eq!(accepted.authority, "A0001");
        assert!(accepted.errors.is_empty());

        let rejected: PaymentRequestResponse =
            serde_json::from_value(json!({"Status": -3, "errors": ["amount too low"]}))
                .unwrap();
        assert_eq!(rejected.status, -3);
        assert!(rejected.authority.is_empty());
        assert_eq!(rejected.errors, vec!["amount too low".to_string()]);
    }

    #[test]
    fn test_verify_wire_names() {
        let request = VerifyRequest {
            merchant_id: "m-123".to_string(),
            amount: 250,
            authority: "A0001".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"MerchantID": "m-123", "Amount": 250, "Authority": "A0001"})
        );

        let settled: VerifyResponse =
            serde_json::from_value(json!({"Status": 100, "RefID": 991_122})).unwrap();
        assert_eq!(settled.status, 100);
        assert_eq!(settled.ref_id, Some(991_122));

        let declined: VerifyResponse = serde_json::from_value(json!({"Status": -22})).unwrap();
        assert_eq!(declined.status, -22);
        assert_eq!(declined.ref_id, None);
    }

    #[test]
    fn test_gateway_amount_scales_by_ten() {
        assert_eq!(gateway_amount(Decimal::new(25_00, 2)), 250);
        assert_eq!(gateway_amount(Decimal::new(10, 2)), 1);
        assert_eq!(gateway_amount(Decimal::ZERO), 0);
    }

    #[test]
    fn test_gateway_amount_rounds_half_away_from_zero() {
        assert_eq!(gateway_amount(Decimal::new(25_55, 2)), 256);
        assert_eq!(gateway_amount(Decimal::new(25_54, 2)), 255);
    }

    #[test]
    fn test_status_descriptions() {
        assert_eq!(status_description(-22), "the transaction failed");
        assert_eq!(
            status_description(-7777),
            "unrecognized gateway status code"
        );
    }
}
