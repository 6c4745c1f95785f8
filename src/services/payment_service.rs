use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    dto::payments::{CreatePaymentRequest, PaymentListQuery, UpdatePaymentRequest},
    entity::{
        jamaah::{self, Entity as Jamaah},
        packages::{self, Entity as Packages},
        payments::{self, Column as PaymentCol, Entity as Payments, CONFIRMED},
    },
    error::{AppError, AppResult},
    middleware::auth::{authorize, AuthUser},
    models::Payment,
    response::{Deleted, Paginated},
    state::AppState,
};

const PAYMENT_ROLES: &[&str] = &["admin", "finance", "operator"];

pub async fn list_payments(
    state: &AppState,
    user: &AuthUser,
    query: PaymentListQuery,
) -> AppResult<Paginated<Payment>> {
    authorize(user, PAYMENT_ROLES)?;
    let (page, per_page, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(jamaah_id) = query.jamaah_id {
        condition = condition.add(PaymentCol::JamaahId.eq(jamaah_id));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(PaymentCol::Status.eq(status.clone()));
    }

    let finder = Payments::find()
        .filter(condition)
        .order_by_desc(PaymentCol::PaymentDate)
        .order_by_desc(PaymentCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_from_entity)
        .collect();

    Ok(Paginated::new(items, total, page, per_page))
}

pub async fn get_payment(state: &AppState, user: &AuthUser, id: i64) -> AppResult<Payment> {
    authorize(user, PAYMENT_ROLES)?;
    let payment = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(payment_from_entity(payment))
}

/// Insert the payment and refresh the owning pilgrim's derived balance in
/// one transaction; partial writes are never observable.
pub async fn create_payment(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePaymentRequest,
) -> AppResult<Payment> {
    authorize(user, PAYMENT_ROLES)?;

    let txn = state.orm.begin().await?;

    let payment = payments::ActiveModel {
        id: NotSet,
        jamaah_id: Set(payload.jamaah_id),
        amount: Set(payload.amount),
        payment_date: Set(payload.payment_date),
        method: Set(payload.method.unwrap_or_else(|| "transfer".to_string())),
        reference: Set(payload.reference),
        note: Set(payload.note),
        status: Set(payload.status.unwrap_or_else(|| "pending".to_string())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    recalculate_balance(&txn, payment.jamaah_id).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "payment_create",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": payment.id, "jamaah_id": payment.jamaah_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(payment_from_entity(payment))
}

pub async fn update_payment(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdatePaymentRequest,
) -> AppResult<Payment> {
    authorize(user, PAYMENT_ROLES)?;

    let txn = state.orm.begin().await?;

    let existing = Payments::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous_owner = existing.jamaah_id;

    let mut active: payments::ActiveModel = existing.into();
    if let Some(jamaah_id) = payload.jamaah_id {
        active.jamaah_id = Set(jamaah_id);
    }
    if let Some(amount) = payload.amount {
        active.amount = Set(amount);
    }
    if let Some(payment_date) = payload.payment_date {
        active.payment_date = Set(payment_date);
    }
    if let Some(method) = payload.method {
        active.method = Set(method);
    }
    if let Some(reference) = payload.reference {
        active.reference = Set(Some(reference));
    }
    if let Some(note) = payload.note {
        active.note = Set(Some(note));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
    let payment = active.update(&txn).await?;

    recalculate_balance(&txn, payment.jamaah_id).await?;
    // Reparented payments leave the old owner's totals stale unless that
    // side is recomputed too.
    if payment.jamaah_id != previous_owner {
        recalculate_balance(&txn, previous_owner).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "payment_update",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": payment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(payment_from_entity(payment))
}

pub async fn delete_payment(state: &AppState, user: &AuthUser, id: i64) -> AppResult<Deleted> {
    authorize(user, PAYMENT_ROLES)?;

    let txn = state.orm.begin().await?;

    let existing = Payments::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let owner = existing.jamaah_id;

    Payments::delete_by_id(id).exec(&txn).await?;
    recalculate_balance(&txn, owner).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        user.user_id,
        "payment_delete",
        Some("payments"),
        Some(serde_json::json!({ "payment_id": id, "jamaah_id": owner })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Deleted::new(id))
}

/// Recomputes a pilgrim's derived totals from their confirmed payments.
/// Idempotent: re-running it for the same underlying rows always converges
/// to the same four values.
pub async fn recalculate_balance<C: ConnectionTrait>(conn: &C, jamaah_id: i64) -> AppResult<()> {
    let pilgrim = Jamaah::find_by_id(jamaah_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let total_price = match pilgrim.package_id {
        Some(package_id) => Packages::find_by_id(package_id)
            .one(conn)
            .await?
            .map(|p| package_total(&p, &pilgrim.room_type))
            .unwrap_or(0),
        None => 0,
    };

    let confirmed = Payments::find()
        .filter(PaymentCol::JamaahId.eq(jamaah_id))
        .filter(PaymentCol::Status.eq(CONFIRMED))
        .all(conn)
        .await?;
    let total_paid: i64 = confirmed.iter().map(|p| p.amount).sum();

    let remaining_balance = total_price - total_paid;
    let payment_status = derive_payment_status(total_price, remaining_balance);

    let mut active: jamaah::ActiveModel = pilgrim.into();
    active.total_price = Set(total_price);
    active.total_paid = Set(total_paid);
    active.remaining_balance = Set(remaining_balance);
    active.payment_status = Set(payment_status.to_string());
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;

    Ok(())
}

fn package_total(package: &packages::Model, room_type: &str) -> i64 {
    let room_component = match room_type {
        "triple" => package.price_triple,
        "double" => package.price_double,
        _ => package.price_quad,
    };
    package.base_price + room_component
}

fn derive_payment_status(total_price: i64, remaining_balance: i64) -> &'static str {
    if total_price <= 0 {
        "pending"
    } else if remaining_balance <= 0 {
        "lunas"
    } else {
        "belum_lunas"
    }
}

fn payment_from_entity(model: payments::Model) -> Payment {
    Payment {
        id: model.id,
        jamaah_id: model.jamaah_id,
        amount: model.amount,
        payment_date: model.payment_date,
        method: model.method,
        reference: model.reference,
        note: model.note,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_package_means_pending() {
        assert_eq!(derive_payment_status(0, 0), "pending");
        assert_eq!(derive_payment_status(-1, -1), "pending");
    }

    #[test]
    fn settled_balance_is_lunas() {
        assert_eq!(derive_payment_status(25_000_000, 0), "lunas");
        // Overpayment still settles.
        assert_eq!(derive_payment_status(25_000_000, -500_000), "lunas");
    }

    #[test]
    fn outstanding_balance_is_belum_lunas() {
        assert_eq!(derive_payment_status(25_000_000, 10_000_000), "belum_lunas");
    }

    #[test]
    fn room_component_follows_room_type() {
        let package = packages::Model {
            id: 1,
            name: "Umroh Plus".into(),
            category: "umroh".into(),
            duration_days: 12,
            base_price: 20_000_000,
            price_quad: 0,
            price_triple: 1_500_000,
            price_double: 3_000_000,
            description: None,
            status: "active".into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        assert_eq!(package_total(&package, "quad"), 20_000_000);
        assert_eq!(package_total(&package, "triple"), 21_500_000);
        assert_eq!(package_total(&package, "double"), 23_000_000);
        // Garbage room types fall back to quad.
        assert_eq!(package_total(&package, "suite"), 20_000_000);
    }
}
