use axum::{extract::FromRequestParts, http::header};
use chrono::{DateTime, Utc};

use crate::{error::AppError, state::AppState};

pub const SUPER_ADMIN: &str = "super_admin";

/// Resolved identity for one request. `user_id` is `None` for the trusted
/// dashboard session, which never maps to a `users` row.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Option<i64>,
    pub role: String,
}

impl AuthUser {
    pub fn super_admin() -> Self {
        Self {
            user_id: None,
            role: SUPER_ADMIN.to_string(),
        }
    }
}

/// Pure permit/deny check. An empty `required` set means any authenticated
/// identity passes; `super_admin` bypasses everything. Role matching is
/// case-sensitive and exact.
pub fn authorize(user: &AuthUser, required: &[&str]) -> Result<(), AppError> {
    if required.is_empty() || user.role == SUPER_ADMIN {
        return Ok(());
    }
    if required.contains(&user.role.as_str()) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Trusted dashboard session wins over any bearer token.
        if let Some(expected) = state.config.admin_session_token.as_deref() {
            if let Some(session) = parts
                .headers
                .get("x-admin-session")
                .and_then(|v| v.to_str().ok())
            {
                if session == expected {
                    return Ok(AuthUser::super_admin());
                }
            }
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(value) if value.starts_with("Bearer ") => {
                value.trim_start_matches("Bearer ").trim().to_string()
            }
            _ => return Err(AppError::NotAuthenticated),
        };

        let row: Option<(i64, String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, role, token_expires FROM users WHERE auth_token = $1",
        )
        .bind(&token)
        .fetch_optional(&state.pool)
        .await?;

        let (user_id, role, token_expires) = match row {
            Some(r) => r,
            None => return Err(AppError::InvalidToken),
        };

        if let Some(expires) = token_expires {
            if expires < Utc::now() {
                return Err(AppError::TokenExpired);
            }
        }

        Ok(AuthUser {
            user_id: Some(user_id),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Some(1),
            role: role.to_string(),
        }
    }

    #[test]
    fn empty_required_set_allows_any_authenticated_role() {
        assert!(authorize(&user("operator"), &[]).is_ok());
        assert!(authorize(&user("whatever"), &[]).is_ok());
    }

    #[test]
    fn super_admin_bypasses_role_checks() {
        assert!(authorize(&AuthUser::super_admin(), &["finance"]).is_ok());
    }

    #[test]
    fn exact_case_sensitive_match_required() {
        assert!(authorize(&user("finance"), &["finance", "admin"]).is_ok());
        assert!(authorize(&user("Finance"), &["finance"]).is_err());
        assert!(authorize(&user("operator"), &["finance"]).is_err());
    }
}
