//! Payment route handlers.
//!
//! `pay` asks the gateway for an authority token, stores it on the order,
//! and redirects the shopper to the gateway's hosted payment page. The
//! gateway later sends the shopper back to `verify` with the authority and
//! an `OK`/`NOK` flag; only a verify call the gateway confirms marks the
//! order paid.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use clementine_core::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::db::orders;
use crate::error::{AppError, Result};
use crate::gateway::{VerifyOutcome, gateway_amount};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Query string the gateway appends when redirecting the shopper back.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "Authority")]
    pub authority: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Outcome of a verify callback.
#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub status: String,
    pub order_id: OrderId,
    pub ref_id: Option<i64>,
}

/// Start payment for an unpaid order and redirect to the gateway page.
///
/// Retrying after an abandoned attempt issues a fresh authority and
/// overwrites the stored one; only the newest redirect can complete.
///
/// # Errors
///
/// Returns an error if the order does not exist or is not unpaid, or if
/// the gateway rejects the request.
#[instrument(skip(state))]
pub async fn pay(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let order = orders::get_order_for_user(state.pool(), id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("no order with this id".to_string()))?;

    if order.order.status != OrderStatus::Unpaid {
        return Err(AppError::Validation(
            "only unpaid orders can be paid".to_string(),
        ));
    }

    let amount = gateway_amount(order.total());
    let description = format!("Payment for order {id}");
    let callback_url = state.config().payment_callback_url();

    let authority = state
        .gateway()
        .request_payment(amount, &description, &callback_url)
        .await?;

    orders::set_authority(state.pool(), id, &authority).await?;

    info!(order_id = %id, amount, "Redirecting to payment page");
    Ok(Redirect::to(&state.gateway().payment_page_url(&authority)))
}

/// Handle the gateway's return redirect and settle the order.
///
/// A shopper who cancelled on the gateway page comes back with `Status=NOK`
/// and the order stays unpaid. Replayed callbacks for an order already
/// marked paid answer `already_verified` without charging again.
///
/// # Errors
///
/// Returns an error if no order carries this authority, the gateway
/// declines the verification, or the gateway is unreachable.
#[instrument(skip(state), fields(authority = %params.authority))]
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<PaymentReceipt>> {
    let order = orders::get_by_authority(state.pool(), &params.authority)
        .await?
        .ok_or_else(|| AppError::NotFound("no payment with this authority".to_string()))?;
    let order_id = order.order.id;

    if params.status != "OK" {
        info!(order_id = %order_id, "Shopper cancelled on the payment page");
        return Ok(Json(PaymentReceipt {
            status: "canceled".to_string(),
            order_id,
            ref_id: None,
        }));
    }

    let amount = gateway_amount(order.total());
    match state
        .gateway()
        .verify_payment(amount, &params.authority)
        .await?
    {
        VerifyOutcome::Verified { ref_id } => {
            let paid = orders::mark_paid(state.pool(), &params.authority, ref_id).await?;
            info!(order_id = %order_id, ref_id, "Payment verified");
            Ok(Json(PaymentReceipt {
                status: "paid".to_string(),
                order_id,
                ref_id: paid.gateway_ref_id,
            }))
        }
        VerifyOutcome::AlreadyVerified => Ok(Json(PaymentReceipt {
            status: "already_verified".to_string(),
            order_id,
            ref_id: order.order.gateway_ref_id,
        })),
        VerifyOutcome::Declined { code, message } => {
            Err(AppError::PaymentDeclined { code, message })
        }
    }
}
