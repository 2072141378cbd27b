//! Payment-gateway errors.

use thiserror::Error;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("gateway request failed: {0}")]
    Request(String),

    /// Failed to parse the gateway's response.
    #[error("gateway response error: {0}")]
    Response(String),

    /// The gateway rejected the payment request.
    #[error("payment request rejected (status {status}): {}", .errors.join("; "))]
    Rejected {
        /// Gateway status code of the rejection.
        status: i32,
        /// Error messages from the gateway's reply.
        errors: Vec<String>,
    },
}
