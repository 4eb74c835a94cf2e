//! Bearer-token role guard.
//!
//! Handlers opt in by taking [`StaffUser`] or [`AdminUser`] as an
//! argument. The admin token also grants staff access.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Staff,
    Admin,
}

/// Tokens accepted for each role. An unset token disables that role.
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    pub staff: Option<String>,
    pub admin: Option<String>,
}

impl AuthTokens {
    pub fn new(staff: Option<String>, admin: Option<String>) -> Self {
        Self { staff, admin }
    }

    /// Returns the role granted by `token`, if any.
    pub fn role_for(&self, token: &str) -> Option<Role> {
        if self.admin.as_deref() == Some(token) {
            Some(Role::Admin)
        } else if self.staff.as_deref() == Some(token) {
            Some(Role::Staff)
        } else {
            None
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate<S>(parts: &Parts, state: &S) -> Result<Role, ApiError>
where
    AuthTokens: FromRef<S>,
{
    let tokens = AuthTokens::from_ref(state);
    bearer_token(parts)
        .and_then(|token| tokens.role_for(token))
        .ok_or(ApiError::Unauthorized)
}

/// Any authenticated back-office user.
#[derive(Debug, Clone, Copy)]
pub struct StaffUser(pub Role);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    AuthTokens: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(StaffUser)
    }
}

/// An authenticated administrator.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AuthTokens: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state)? {
            Role::Admin => Ok(AdminUser),
            Role::Staff => {
                tracing::debug!("staff token used on admin route");
                Err(ApiError::Forbidden)
            }
        }
    }
}
