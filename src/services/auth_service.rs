use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{LoginRequest, LoginResponse, LogoutResponse, UserInfo},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    state::AppState,
};

/// Email-or-username login. On success an opaque token is written onto the
/// user row with an expiry; the extractor validates it on later requests.
pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let LoginRequest { email, password } = payload;
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation("email and password are required".into()));
    }

    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE email = $1 OR username = $1")
            .bind(email.trim())
            .fetch_optional(&state.pool)
            .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Forbidden),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Forbidden);
    }

    if user.status != "active" {
        return Err(AppError::Forbidden);
    }

    let token = Uuid::new_v4().simple().to_string();
    let expires = Utc::now() + Duration::hours(state.config.token_ttl_hours);

    sqlx::query(
        "UPDATE users SET auth_token = $1, token_expires = $2, updated_at = now() WHERE id = $3",
    )
    .bind(&token)
    .bind(expires)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(LoginResponse {
        token,
        user: user_info(&user),
    })
}

pub async fn logout(state: &AppState, user: &AuthUser) -> AppResult<LogoutResponse> {
    if let Some(user_id) = user.user_id {
        sqlx::query("UPDATE users SET auth_token = NULL, token_expires = NULL WHERE id = $1")
            .bind(user_id)
            .execute(&state.pool)
            .await?;
    }
    Ok(LogoutResponse { success: true })
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<UserInfo> {
    // The trusted dashboard session has no users row to show.
    let user_id = user.user_id.ok_or(AppError::NotFound)?;
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;
    row.map(|u| user_info(&u)).ok_or(AppError::NotFound)
}

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        role: user.role.clone(),
    }
}
