use axum_umrah_backoffice::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    dto::auth::LoginRequest,
    error::AppError,
    middleware::auth::AuthUser,
    schema,
    services::{auth_service, crud_service},
    state::AppState,
};
use serde_json::json;

// Integration flow: register through the user registry, log in with either
// identifier, inspect the session, log out.
#[tokio::test]
async fn login_me_logout_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let users = schema::find("users").unwrap();

    // The create hook hashes the password; plaintext never lands in the table.
    let created = crud_service::create(
        &state.pool,
        users,
        json!({
            "name": "Rina",
            "username": "rina",
            "email": "rina@example.com",
            "password": "rahasia123",
            "role": "finance",
        }),
    )
    .await?;
    let user_id = created["id"].as_i64().unwrap();
    assert!(created.get("password").is_none());
    let hash = created["password_hash"].as_str().unwrap();
    assert!(hash.starts_with("$argon2"));

    // Username works in the email field.
    let session = auth_service::login(
        &state,
        LoginRequest {
            email: "rina".into(),
            password: "rahasia123".into(),
        },
    )
    .await?;
    assert_eq!(session.user.role, "finance");
    assert!(!session.token.is_empty());

    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "rina@example.com".into(),
            password: "salah".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // The stored token matches what the login handed out.
    let (stored,): (Option<String>,) =
        sqlx::query_as("SELECT auth_token FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(stored.as_deref(), Some(session.token.as_str()));

    let identity = AuthUser {
        user_id: Some(user_id),
        role: session.user.role.clone(),
    };
    let info = auth_service::me(&state, &identity).await?;
    assert_eq!(info.username, "rina");

    // The trusted dashboard session has no profile row.
    let err = auth_service::me(&state, &AuthUser::super_admin())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    auth_service::logout(&state, &identity).await?;
    let (cleared,): (Option<String>,) =
        sqlx::query_as("SELECT auth_token FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert!(cleared.is_none());

    // Deactivated accounts cannot log in even with the right password.
    crud_service::update(&state.pool, users, user_id, json!({ "status": "inactive" })).await?;
    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "rina".into(),
            password: "rahasia123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs.
    sqlx::query("TRUNCATE TABLE audit_logs, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await?;

    let orm = create_orm_conn(database_url).await?;
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        admin_session_token: None,
        token_ttl_hours: 24,
    };

    Ok(AppState { pool, orm, config })
}
