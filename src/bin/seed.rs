use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_umrah_backoffice::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123", "admin").await?;
    let finance_id =
        ensure_user(&pool, "finance", "finance@example.com", "finance123", "finance").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Finance ID: {finance_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<i64> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM packages")
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Catalog already seeded, skipping");
        return Ok(());
    }

    let (package_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO packages (name, category, duration_days, base_price, price_quad, price_triple, price_double, description)
        VALUES ('Umroh Reguler 9 Hari', 'umroh', 9, 28000000, 0, 1500000, 3000000, 'Paket reguler hotel bintang 4')
        RETURNING id
        "#,
    )
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO departures (package_id, departure_date, quota, price_quad, price_triple, price_double)
        VALUES ($1, CURRENT_DATE + 60, 45, 28000000, 29500000, 31000000)
        "#,
    )
    .bind(package_id)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO agents (name, code, agent_type, fixed_commission, commission_rate)
        VALUES ('Agen Pusat', 'AG-0001', 'master', 500000, 1.0)
        "#,
    )
    .execute(pool)
    .await?;

    println!("Seeded sample package, departure and agent");
    Ok(())
}
