use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full account row, including credential columns. Never serialized as-is;
/// responses go through `dto::auth::UserInfo`.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub auth_token: Option<String>,
    pub token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Payment {
    pub id: i64,
    pub jamaah_id: i64,
    pub amount: i64,
    pub payment_date: NaiveDate,
    pub method: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Room {
    pub id: i64,
    pub departure_id: i64,
    pub hotel_id: Option<i64>,
    pub room_number: String,
    pub capacity: i64,
    pub room_gender: String,
    pub created_at: DateTime<Utc>,
}
