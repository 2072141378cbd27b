//! Payment gateway HTTP client.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::error::GatewayError;
use super::types::{
    PaymentRequest, PaymentRequestResponse, VerifyOutcome, VerifyRequest, VerifyResponse,
    status_description,
};
use crate::config::GatewayConfig;

/// Client for the payment gateway's JSON API.
#[derive(Clone)]
pub struct GatewayClient {
    /// HTTP client.
    client: Client,
    /// Merchant identifier sent with every call.
    merchant_id: SecretString,
    /// Gateway root URL, without a trailing slash.
    base_url: String,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("merchant_id", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a new gateway client.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            merchant_id: config.merchant_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the gateway's hosted payment page for an authority token.
    #[must_use]
    pub fn payment_page_url(&self, authority: &str) -> String {
        format!("{}/start-pay/{authority}", self.base_url)
    }

    /// Request a payment and return the authority token the gateway
    /// issued for it.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the reply cannot be parsed,
    /// or the gateway rejects the payment request.
    #[instrument(skip(self, description, callback_url))]
    pub async fn request_payment(
        &self,
        amount: i64,
        description: &str,
        callback_url: &str,
    ) -> Result<String, GatewayError> {
        let request = PaymentRequest {
            merchant_id: self.merchant_id.expose_secret().to_string(),
            amount,
            description: description.to_string(),
            callback_url: callback_url.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/payment/request.json", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let result: PaymentRequestResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;

        if result.status != 100 || result.authority.is_empty() {
            error!(
                status = result.status,
                "Payment request rejected by gateway"
            );
            return Err(GatewayError::Rejected {
                status: result.status,
                errors: result.errors,
            });
        }

        debug!(authority = %result.authority, "Payment authority issued");
        Ok(result.authority)
    }

    /// Verify a payment attempt for an authority token.
    ///
    /// The gateway's status codes are decoded into a [`VerifyOutcome`];
    /// only transport and parse problems surface as errors.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply cannot be parsed.
    #[instrument(skip(self), fields(authority = %authority))]
    pub async fn verify_payment(
        &self,
        amount: i64,
        authority: &str,
    ) -> Result<VerifyOutcome, GatewayError> {
        let request = VerifyRequest {
            merchant_id: self.merchant_id.expose_secret().to_string(),
            amount,
            authority: authority.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/payment/verify.json", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let result: VerifyResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;

        match result.status {
            100 => {
                let ref_id = result.ref_id.ok_or_else(|| {
                    GatewayError::Response(
                        "verify reply carried status 100 without a RefID".to_string(),
                    )
                })?;
                debug!(ref_id, "Payment verified");
                Ok(VerifyOutcome::Verified { ref_id })
            }
            101 => Ok(VerifyOutcome::AlreadyVerified),
            code => {
                error!(code, "Payment verification declined by gateway");
                Ok(VerifyOutcome::Declined {
                    code,
                    message: status_description(code).to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GatewayClient {
        GatewayClient::new(&GatewayConfig {
            merchant_id: SecretString::from("merchant-1234"),
            base_url: base_url.to_string(),
        })
    }

    #[test]
    fn test_payment_page_url() {
        let client = test_client("https://gateway.test/pg");
        assert_eq!(
            client.payment_page_url("A0001"),
            "https://gateway.test/pg/start-pay/A0001"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = test_client("https://gateway.test/pg/");
        assert_eq!(
            client.payment_page_url("A0001"),
            "https://gateway.test/pg/start-pay/A0001"
        );
    }

    #[test]
    fn test_debug_redacts_merchant_id() {
        let client = test_client("https://gateway.test/pg");
        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("merchant-1234"));
    }
}
