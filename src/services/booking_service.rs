use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::bookings::{BookingCreated, CreateBookingRequest, PassengerInput},
    entity::{
        agents::Entity as Agents,
        booking_passengers,
        bookings::{self, Column as BookingCol, Entity as Bookings},
        departures::{self, Entity as Departures},
        jamaah::{self, Column as JamaahCol, Entity as Jamaah},
        commissions,
    },
    error::{AppError, AppResult},
    middleware::auth::{authorize, AuthUser},
    state::AppState,
};

const BOOKING_ROLES: &[&str] = &["admin", "operator"];
const CODE_RETRIES: usize = 4;

/// Creates the booking header, its passengers and the agent commission in a
/// single transaction. Any failure inside the transaction rolls the whole
/// thing back and surfaces as `BookingFailed`.
pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<BookingCreated> {
    authorize(user, BOOKING_ROLES)?;

    let departure_id = payload
        .departure_id
        .ok_or_else(|| AppError::MissingData("departure_id is required".into()))?;
    let contact_name = payload
        .contact_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::MissingData("contact_name is required".into()))?;
    if payload.passengers.is_empty() {
        return Err(AppError::MissingData(
            "at least one passenger is required".into(),
        ));
    }

    let departure = Departures::find_by_id(departure_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let txn = state.orm.begin().await?;
    let (booking_id, booking_code) =
        match insert_booking(&txn, &payload, contact_name, &departure).await {
            Ok(ok) => {
                txn.commit().await?;
                ok
            }
            Err(err) => {
                txn.rollback().await?;
                return Err(AppError::BookingFailed(err.to_string()));
            }
        };

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "booking_create",
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": booking_id, "booking_code": booking_code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(BookingCreated {
        success: true,
        booking_id,
        booking_code,
        message: "Booking created".into(),
    })
}

async fn insert_booking(
    txn: &DatabaseTransaction,
    payload: &CreateBookingRequest,
    contact_name: String,
    departure: &departures::Model,
) -> AppResult<(i64, String)> {
    let booking_code = unique_booking_code(txn).await?;

    let booking = bookings::ActiveModel {
        id: NotSet,
        booking_code: Set(booking_code.clone()),
        departure_id: Set(departure.id),
        contact_name: Set(contact_name),
        contact_phone: Set(payload.contact_phone.clone()),
        contact_email: Set(payload.contact_email.clone()),
        agent_id: Set(payload.agent_id),
        total_pax: Set(payload.passengers.len() as i64),
        // Placeholder; set to the real sum once passengers are priced.
        total_price: Set(0),
        status: Set("pending".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    let mut total_price: i64 = 0;
    for passenger in &payload.passengers {
        let jamaah_id = resolve_jamaah(txn, passenger, departure.package_id).await?;
        let room_type = passenger
            .room_type
            .clone()
            .unwrap_or_else(|| "quad".to_string());
        let price_pax = departure.price_for(&room_type);

        booking_passengers::ActiveModel {
            id: NotSet,
            booking_id: Set(booking.id),
            jamaah_id: Set(jamaah_id),
            room_type: Set(room_type),
            price_pax: Set(price_pax),
            assigned_room_id: Set(None),
            visa_status: Set("pending".into()),
            passport_status: Set("pending".into()),
            vaccine_status: Set("pending".into()),
            created_at: NotSet,
        }
        .insert(txn)
        .await?;

        total_price += price_pax;
    }

    let mut active: bookings::ActiveModel = booking.clone().into();
    active.total_price = Set(total_price);
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(txn).await?;

    if let Some(agent_id) = payload.agent_id {
        let agent = Agents::find_by_id(agent_id)
            .one(txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let amount = commission_amount(
            agent.fixed_commission,
            agent.commission_rate,
            payload.passengers.len() as i64,
            total_price,
        );
        // A zero commission produces no row at all.
        if amount > 0 {
            commissions::ActiveModel {
                id: NotSet,
                agent_id: Set(agent.id),
                booking_id: Set(booking.id),
                amount: Set(amount),
                status: Set("pending".into()),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(txn)
            .await?;
        }
    }

    Ok((booking.id, booking_code))
}

/// Resolves a passenger to an existing pilgrim (by explicit id, then by NIK)
/// or registers a new one under the departure's package.
async fn resolve_jamaah(
    txn: &DatabaseTransaction,
    passenger: &PassengerInput,
    package_id: i64,
) -> AppResult<i64> {
    if let Some(id) = passenger.existing_id {
        if Jamaah::find_by_id(id).one(txn).await?.is_some() {
            return Ok(id);
        }
    }

    if let Some(nik) = passenger.nik.as_deref().filter(|n| !n.is_empty()) {
        if let Some(existing) = Jamaah::find()
            .filter(JamaahCol::Nik.eq(nik))
            .one(txn)
            .await?
        {
            return Ok(existing.id);
        }
    }

    let full_name = passenger
        .full_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::MissingData("passenger full_name is required".into()))?;

    let created = jamaah::ActiveModel {
        id: NotSet,
        full_name: Set(full_name),
        nik: Set(passenger.nik.clone()),
        gender: Set(passenger.gender.clone().unwrap_or_else(|| "L".to_string())),
        birth_date: Set(None),
        phone: Set(passenger.phone.clone()),
        email: Set(None),
        address: Set(None),
        passport_number: Set(None),
        passport_expiry: Set(None),
        package_id: Set(Some(package_id)),
        sub_agent_id: Set(None),
        room_type: Set(passenger
            .room_type
            .clone()
            .unwrap_or_else(|| "quad".to_string())),
        total_price: Set(0),
        total_paid: Set(0),
        remaining_balance: Set(0),
        payment_status: Set("pending".into()),
        status: Set("active".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    Ok(created.id)
}

/// `TRX-YYMM-XXXX` with a retry loop on collisions; the unique index on
/// booking_code backstops the race between concurrent bookings.
async fn unique_booking_code(txn: &DatabaseTransaction) -> AppResult<String> {
    let mut code = build_booking_code();
    for _ in 0..CODE_RETRIES {
        let taken = Bookings::find()
            .filter(BookingCol::BookingCode.eq(code.clone()))
            .one(txn)
            .await?
            .is_some();
        if !taken {
            break;
        }
        code = build_booking_code();
    }
    Ok(code)
}

fn build_booking_code() -> String {
    let yymm = Utc::now().format("%y%m");
    let raw = Uuid::new_v4().simple().to_string();
    format!("TRX-{}-{}", yymm, raw[..4].to_uppercase())
}

pub fn commission_amount(fixed_commission: i64, commission_rate: f64, pax: i64, total_price: i64) -> i64 {
    let raw = fixed_commission as f64 * pax as f64 + total_price as f64 * commission_rate / 100.0;
    raw.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_combines_fixed_and_rate() {
        // 50_000 * 3 pax + 9_000_000 * 2% = 330_000
        assert_eq!(commission_amount(50_000, 2.0, 3, 9_000_000), 330_000);
    }

    #[test]
    fn zero_inputs_yield_zero_commission() {
        assert_eq!(commission_amount(0, 0.0, 5, 9_000_000), 0);
        assert_eq!(commission_amount(0, 0.0, 0, 0), 0);
    }

    #[test]
    fn rate_only_commission() {
        assert_eq!(commission_amount(0, 1.5, 2, 10_000_000), 150_000);
    }

    #[test]
    fn booking_code_shape() {
        let code = build_booking_code();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TRX");
        assert_eq!(parts[1].len(), 4);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn booking_codes_vary() {
        let a = build_booking_code();
        let b = build_booking_code();
        // Same month prefix, random suffix. Equality here is a 1-in-65536
        // event per pair; two fresh codes should differ.
        assert_ne!(a, b);
    }
}
