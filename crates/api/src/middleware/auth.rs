//! Identity extractors for route handlers.
//!
//! Authentication happens upstream; the authenticating proxy forwards
//! the caller's identity as trusted headers and this service never
//! re-derives it. `x-user-id` carries the integer user id and
//! `x-user-staff` (`true`/`1`) marks staff callers.

use axum::{extract::FromRequestParts, http::request::Parts};
use clementine_core::UserId;

use crate::error::AppError;

/// Header carrying the authenticated user's integer id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the staff flag (`true` or `1`).
pub const STAFF_HEADER: &str = "x-user-staff";

/// The authenticated caller, as asserted by the upstream proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    /// Upstream user account id.
    pub user_id: UserId,
    /// Whether the caller may use staff-only routes.
    pub is_staff: bool,
}

fn identity_from_parts(parts: &Parts) -> Option<CurrentUser> {
    let user_id = parts
        .headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .parse::<i32>()
        .ok()?;

    let is_staff = parts
        .headers
        .get(STAFF_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    Some(CurrentUser {
        user_id: UserId::new(user_id),
        is_staff,
    })
}

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("orders for user {}", user.user_id)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts)
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("missing or invalid x-user-id header".to_owned()))
    }
}

/// Extractor that requires an authenticated staff user.
///
/// Rejects anonymous callers with 401 and authenticated non-staff
/// callers with 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn create_product(
///     RequireStaff(user): RequireStaff,
///     Json(body): Json<ProductBody>,
/// ) -> impl IntoResponse {
///     // only staff reach this point
/// }
/// ```
pub struct RequireStaff(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = identity_from_parts(parts).ok_or_else(|| {
            AppError::Unauthorized("missing or invalid x-user-id header".to_owned())
        })?;

        if !user.is_staff {
            return Err(AppError::Forbidden(
                "Only staff can perform this action".to_owned(),
            ));
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_require_user_reads_headers() {
        let mut parts = parts_with_headers(&[("x-user-id", "42")]);
        let RequireUser(user) = RequireUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.user_id, UserId::new(42));
        assert!(!user.is_staff);
    }

    #[tokio::test]
    async fn test_require_user_rejects_missing_header() {
        let mut parts = parts_with_headers(&[]);
        let result = RequireUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_require_user_rejects_malformed_id() {
        let mut parts = parts_with_headers(&[("x-user-id", "not-a-number")]);
        let result = RequireUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_staff_flag_spellings() {
        for value in ["true", "TRUE", "1"] {
            let mut parts = parts_with_headers(&[("x-user-id", "7"), ("x-user-staff", value)]);
            let RequireStaff(user) = RequireStaff::from_request_parts(&mut parts, &())
                .await
                .unwrap();
            assert!(user.is_staff, "{value} should mark the caller as staff");
        }

        let mut parts = parts_with_headers(&[("x-user-id", "7"), ("x-user-staff", "yes")]);
        let result = RequireStaff::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_staff_rejects_non_staff() {
        let mut parts = parts_with_headers(&[("x-user-id", "7")]);
        let result = RequireStaff::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_require_staff_rejects_anonymous_before_forbidden() {
        let mut parts = parts_with_headers(&[("x-user-staff", "true")]);
        let result = RequireStaff::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

}
