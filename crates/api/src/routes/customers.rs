//! Customer profile route handlers.
//!
//! A customer row is created lazily the first time an authenticated user
//! touches their profile or places an order, so `GET /customers/me` never
//! returns 404 for a valid user.

use axum::{Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use clementine_core::{CustomerId, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::customers;
use crate::error::Result;
use crate::middleware::{RequireStaff, RequireUser};
use crate::state::AppState;

/// Customer profile display data.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub user_id: UserId,
    pub phone_number: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<customers::Customer> for CustomerView {
    fn from(customer: customers::Customer) -> Self {
        Self {
            id: customer.id,
            user_id: customer.user_id,
            phone_number: customer.phone_number,
            birth_date: customer.birth_date,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

/// Profile update body.
#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    #[serde(default)]
    pub phone_number: String,
    pub birth_date: Option<NaiveDate>,
}

/// List all customer profiles.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerView>>> {
    let customers = customers::list_customers(state.pool()).await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Get the calling user's profile, creating an empty one on first access.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn me(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<CustomerView>> {
    let customer = customers::get_or_create_by_user(state.pool(), user.user_id).await?;
    Ok(Json(customer.into()))
}

/// Replace the calling user's profile fields.
///
/// # Errors
///
/// Returns an error if the database update fails.
#[instrument(skip(state, body))]
pub async fn update_me(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<ProfileBody>,
) -> Result<Json<CustomerView>> {
    let customer = customers::update_profile(
        state.pool(),
        user.user_id,
        customers::ProfileUpdate {
            phone_number: body.phone_number,
            birth_date: body.birth_date,
        },
    )
    .await?;

    Ok(Json(customer.into()))
}
