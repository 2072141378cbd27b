//! Integration tests for the payment gateway client.
//!
//! Each test spins up an in-process axum stub on a loopback port and
//! points a real `GatewayClient` at it, so the full reqwest round trip
//! and wire field casing are exercised without an external gateway.

use axum::{Json, Router, routing::post};
use secrecy::SecretString;
use serde_json::{Value, json};

use clementine_api::config::GatewayConfig;
use clementine_api::gateway::{GatewayClient, GatewayError, VerifyOutcome, status_description};

async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> GatewayClient {
    GatewayClient::new(&GatewayConfig {
        merchant_id: SecretString::from("merchant-test"),
        base_url: base_url.to_string(),
    })
}

// =============================================================================
// Payment Request Tests
// =============================================================================

#[tokio::test]
async fn test_request_payment_returns_authority() {
    let app = Router::new().route(
        "/payment/request.json",
        post(|Json(body): Json<Value>| async move {
            // The gateway wire format uses PascalCase field names
            assert_eq!(body["MerchantID"], json!("merchant-test"));
            assert_eq!(body["Amount"], json!(2248));
            assert_eq!(
                body["CallbackURL"],
                json!("https://shop.example.com/orders/verify")
            );
            Json(json!({"Status": 100, "Authority": "A0000123"}))
        }),
    );
    let base = spawn_stub(app).await;

    let authority = client_for(&base)
        .request_payment(
            2248,
            "Payment for order 7",
            "https://shop.example.com/orders/verify",
        )
        .await
        .expect("payment request should succeed");

    assert_eq!(authority, "A0000123");
}

#[tokio::test]
async fn test_rejected_request_surfaces_status_and_errors() {
    let app = Router::new().route(
        "/payment/request.json",
        post(|| async {
            Json(json!({
                "Status": -2,
                "Authority": "",
                "errors": ["merchant id is not valid"]
            }))
        }),
    );
    let base = spawn_stub(app).await;

    let err = client_for(&base)
        .request_payment(500, "Payment for order 1", "https://shop.example.com/orders/verify")
        .await
        .expect_err("rejected request must error");

    match err {
        GatewayError::Rejected { status, errors } => {
            assert_eq!(status, -2);
            assert_eq!(errors, vec!["merchant id is not valid".to_string()]);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_status_without_authority_is_rejected() {
    // Status 100 with an empty authority cannot be redirected to
    let app = Router::new().route(
        "/payment/request.json",
        post(|| async { Json(json!({"Status": 100, "Authority": ""})) }),
    );
    let base = spawn_stub(app).await;

    let err = client_for(&base)
        .request_payment(500, "Payment for order 1", "https://shop.example.com/orders/verify")
        .await
        .expect_err("empty authority must error");

    assert!(matches!(err, GatewayError::Rejected { status: 100, .. }));
}

#[tokio::test]
async fn test_unreachable_gateway_is_a_request_error() {
    // Port 9 on loopback: nothing listens there
    let client = client_for("http://127.0.0.1:9");

    let err = client
        .request_payment(500, "Payment for order 1", "https://shop.example.com/orders/verify")
        .await
        .expect_err("unreachable gateway must error");

    assert!(matches!(err, GatewayError::Request(_)));
}

// =============================================================================
// Verification Tests
// =============================================================================

#[tokio::test]
async fn test_verify_success_carries_ref_id() {
    let app = Router::new().route(
        "/payment/verify.json",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["MerchantID"], json!("merchant-test"));
            assert_eq!(body["Amount"], json!(2248));
            assert_eq!(body["Authority"], json!("A0000123"));
            Json(json!({"Status": 100, "RefID": 424_242}))
        }),
    );
    let base = spawn_stub(app).await;

    let outcome = client_for(&base)
        .verify_payment(2248, "A0000123")
        .await
        .expect("verify should succeed");

    assert_eq!(outcome, VerifyOutcome::Verified { ref_id: 424_242 });
}

#[tokio::test]
async fn test_verify_replay_reports_already_verified() {
    let app = Router::new().route(
        "/payment/verify.json",
        post(|| async { Json(json!({"Status": 101})) }),
    );
    let base = spawn_stub(app).await;

    let outcome = client_for(&base)
        .verify_payment(2248, "A0000123")
        .await
        .expect("verify should succeed");

    assert_eq!(outcome, VerifyOutcome::AlreadyVerified);
}

#[tokio::test]
async fn test_verify_decline_maps_local_description() {
    let app = Router::new().route(
        "/payment/verify.json",
        post(|| async { Json(json!({"Status": -33})) }),
    );
    let base = spawn_stub(app).await;

    let outcome = client_for(&base)
        .verify_payment(2248, "A0000123")
        .await
        .expect("declines are reported in the outcome, not as errors");

    assert_eq!(
        outcome,
        VerifyOutcome::Declined {
            code: -33,
            message: status_description(-33).to_string(),
        }
    );
}

#[tokio::test]
async fn test_verify_success_without_ref_id_is_a_response_error() {
    let app = Router::new().route(
        "/payment/verify.json",
        post(|| async { Json(json!({"Status": 100})) }),
    );
    let base = spawn_stub(app).await;

    let err = client_for(&base)
        .verify_payment(2248, "A0000123")
        .await
        .expect_err("status 100 without a RefID must error");

    assert!(matches!(err, GatewayError::Response(_)));
}
