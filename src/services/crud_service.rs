use std::collections::HashMap;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::SaltString,
};
use password_hash::rand_core::OsRng;
use serde_json::Value as JsonValue;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    response::{Deleted, Paginated},
    schema::{CreateHook, FieldDef, FieldType, ResourceDef},
};

/// Query-string keys consumed by the engine itself; everything else is
/// treated as a candidate exact-match filter.
const RESERVED_KEYS: &[&str] = &["page", "per_page", "search", "orderby", "order"];

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// A value ready to be bound into a statement, converted according to the
/// declared field type.
#[derive(Debug, Clone)]
enum Bind {
    Text(String),
    Int(i64),
    Num(f64),
    Bool(bool),
    Date(String),
    Json(JsonValue),
}

pub async fn list(
    pool: &DbPool,
    def: &ResourceDef,
    query: &HashMap<String, String>,
) -> AppResult<Paginated<JsonValue>> {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1) * per_page;

    let search = query.get("search").map(String::as_str).filter(|s| !s.is_empty());

    // Unknown filter keys are dropped silently; only schema columns are
    // ever interpolated into SQL.
    let filters: Vec<(&'static str, String)> = query
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .filter_map(|(k, v)| def.field(k).map(|f| (f.name, v.clone())))
        .collect();

    let order_col = match query.get("orderby").map(String::as_str).filter(|s| !s.is_empty()) {
        Some(col) if def.is_sortable(col) => def
            .sortable
            .iter()
            .find(|c| **c == col)
            .copied()
            .unwrap_or("id"),
        Some(col) => {
            return Err(AppError::Validation(format!(
                "cannot order by '{col}'"
            )));
        }
        None => "id",
    };
    let order_dir = match query.get("order") {
        Some(o) if o.eq_ignore_ascii_case("asc") => "ASC",
        _ => "DESC",
    };

    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT count(*) FROM {} r", def.table));
    push_conditions(&mut count_qb, def, search, &filters);
    let (total,): (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT row_to_json(r) FROM {} r", def.table));
    push_conditions(&mut qb, def, search, &filters);
    qb.push(format!(" ORDER BY r.{order_col} {order_dir}"));
    qb.push(" LIMIT ");
    qb.push_bind(per_page);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows: Vec<(JsonValue,)> = qb.build_query_as().fetch_all(pool).await?;
    let items = rows.into_iter().map(|(row,)| row).collect();

    Ok(Paginated::new(items, total, page, per_page))
}

pub async fn get(pool: &DbPool, def: &ResourceDef, id: i64) -> AppResult<JsonValue> {
    let sql = format!("SELECT row_to_json(r) FROM {} r WHERE r.id = $1", def.table);
    let row: Option<(JsonValue,)> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    row.map(|(v,)| v).ok_or(AppError::NotFound)
}

pub async fn create(pool: &DbPool, def: &ResourceDef, body: JsonValue) -> AppResult<JsonValue> {
    let mut cols = extract_fields(def, &body, true)?;

    match def.create_hook {
        CreateHook::None => {}
        CreateHook::HashPassword => apply_password_hash(&mut cols)?,
        CreateHook::AgentCode => apply_agent_code(pool, &mut cols).await?,
    }

    let id: i64 = if cols.is_empty() {
        let sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING id", def.table);
        let (id,): (i64,) = sqlx::query_as(&sql).fetch_one(pool).await?;
        id
    } else {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (", def.table));
        for (i, (name, _)) in cols.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*name);
        }
        qb.push(") VALUES (");
        for (i, (_, bind)) in cols.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_bind_value(&mut qb, bind);
        }
        qb.push(") RETURNING id");
        let (id,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
        id
    };

    get(pool, def, id).await
}

pub async fn update(
    pool: &DbPool,
    def: &ResourceDef,
    id: i64,
    body: JsonValue,
) -> AppResult<JsonValue> {
    let mut cols = extract_fields(def, &body, false)?;

    // Password payloads never reach the table in plaintext, on update either.
    if def.create_hook == CreateHook::HashPassword {
        apply_password_hash(&mut cols)?;
    }
    // The sub/parent invariant holds across updates, not just creates.
    if def.create_hook == CreateHook::AgentCode {
        enforce_sub_parent(pool, &cols, id).await?;
    }

    if cols.is_empty() {
        return get(pool, def, id).await;
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!("UPDATE {} SET ", def.table));
    for (i, (name, bind)) in cols.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(name);
        qb.push(" = ");
        push_bind_value(&mut qb, bind);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.build().execute(pool).await?;

    // Re-fetch whether or not anything changed; NotFound when the id is gone.
    get(pool, def, id).await
}

pub async fn delete(pool: &DbPool, def: &ResourceDef, id: i64) -> AppResult<Deleted> {
    if def.soft_delete() {
        let sql = format!("UPDATE {} SET status = 'deleted' WHERE id = $1", def.table);
        sqlx::query(&sql).bind(id).execute(pool).await?;
    } else {
        let sql = format!("DELETE FROM {} WHERE id = $1", def.table);
        sqlx::query(&sql).bind(id).execute(pool).await?;
    }
    Ok(Deleted::new(id))
}

fn push_conditions(
    qb: &mut QueryBuilder<'_, Postgres>,
    def: &ResourceDef,
    search: Option<&str>,
    filters: &[(&'static str, String)],
) {
    qb.push(" WHERE 1=1");

    if let Some(term) = search {
        if !def.searchable.is_empty() {
            let pattern = format!("%{term}%");
            qb.push(" AND (");
            for (i, col) in def.searchable.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(format!("r.{col}::text ILIKE "));
                qb.push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }

    for (col, value) in filters {
        qb.push(format!(" AND r.{col}::text = "));
        qb.push_bind(value.clone());
    }
}

fn push_bind_value(qb: &mut QueryBuilder<'_, Postgres>, bind: Bind) {
    match bind {
        Bind::Text(s) => {
            qb.push_bind(s);
        }
        Bind::Int(i) => {
            qb.push_bind(i);
        }
        Bind::Num(n) => {
            qb.push_bind(n);
        }
        Bind::Bool(b) => {
            qb.push_bind(b);
        }
        Bind::Date(s) => {
            qb.push_bind(s);
            qb.push("::date");
        }
        Bind::Json(v) => {
            qb.push_bind(v);
        }
    }
}

/// Pulls schema-declared fields out of the request body. Fields not in the
/// schema are ignored. `for_create` enforces required fields and applies
/// declared defaults; updates touch only what the payload mentions.
fn extract_fields(
    def: &ResourceDef,
    body: &JsonValue,
    for_create: bool,
) -> AppResult<Vec<(&'static str, Bind)>> {
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::Validation("expected a JSON object body".into()))?;

    let mut cols: Vec<(&'static str, Bind)> = Vec::new();
    for f in def.fields {
        match obj.get(f.name) {
            Some(v) if !v.is_null() => {
                cols.push((f.name, convert(f, v)?));
            }
            _ if !for_create => {}
            _ if f.required => {
                return Err(AppError::Validation(format!("'{}' is required", f.name)));
            }
            _ => {
                if let Some(default) = f.default {
                    cols.push((f.name, convert_default(f, default)));
                }
            }
        }
    }
    Ok(cols)
}

fn convert(f: &FieldDef, v: &JsonValue) -> AppResult<Bind> {
    let invalid = || AppError::Validation(format!("invalid value for '{}'", f.name));
    match f.ty {
        FieldType::Text => v.as_str().map(|s| Bind::Text(s.to_string())).ok_or_else(invalid),
        FieldType::Integer => v
            .as_i64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            .map(Bind::Int)
            .ok_or_else(invalid),
        FieldType::Decimal => v
            .as_f64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            .map(Bind::Num)
            .ok_or_else(invalid),
        FieldType::Bool => v.as_bool().map(Bind::Bool).ok_or_else(invalid),
        FieldType::Date => {
            let s = v.as_str().ok_or_else(invalid)?;
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
            Ok(Bind::Date(s.to_string()))
        }
        FieldType::Json => Ok(Bind::Json(v.clone())),
    }
}

fn convert_default(f: &FieldDef, default: &str) -> Bind {
    match f.ty {
        FieldType::Text => Bind::Text(default.to_string()),
        FieldType::Integer => Bind::Int(default.parse().unwrap_or(0)),
        FieldType::Decimal => Bind::Num(default.parse().unwrap_or(0.0)),
        FieldType::Bool => Bind::Bool(default == "true"),
        FieldType::Date => Bind::Date(default.to_string()),
        FieldType::Json => Bind::Json(serde_json::from_str(default).unwrap_or(JsonValue::Null)),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn apply_password_hash(cols: &mut Vec<(&'static str, Bind)>) -> AppResult<()> {
    if let Some(pos) = cols.iter().position(|(name, _)| *name == "password") {
        let (_, bind) = cols.remove(pos);
        let plain = match bind {
            Bind::Text(s) => s,
            _ => return Err(AppError::Validation("invalid value for 'password'".into())),
        };
        cols.push(("password_hash", Bind::Text(hash_password(&plain)?)));
    }
    Ok(())
}

/// Rejects an update that would turn an agent into a sub without a parent,
/// either from the payload or already on the row.
async fn enforce_sub_parent(
    pool: &DbPool,
    cols: &[(&'static str, Bind)],
    id: i64,
) -> AppResult<()> {
    let becomes_sub = cols.iter().any(|(name, bind)| {
        *name == "agent_type" && matches!(bind, Bind::Text(s) if s == "sub")
    });
    if !becomes_sub || cols.iter().any(|(name, _)| *name == "parent_id") {
        return Ok(());
    }

    let row: Option<(Option<i64>,)> = sqlx::query_as("SELECT parent_id FROM agents WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some((Some(_),)) => Ok(()),
        Some((None,)) => Err(AppError::Validation(
            "'parent_id' is required for sub agents".into(),
        )),
        None => Err(AppError::NotFound),
    }
}

/// Sub agents must point at a parent; codes come from a per-type sequence
/// (`AG-0001` for masters, `SB-0001` for subs) when the payload omits one.
async fn apply_agent_code(pool: &DbPool, cols: &mut Vec<(&'static str, Bind)>) -> AppResult<()> {
    let agent_type = cols
        .iter()
        .find_map(|(name, bind)| match (name, bind) {
            (&"agent_type", Bind::Text(s)) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "master".to_string());

    if agent_type == "sub" && !cols.iter().any(|(name, _)| *name == "parent_id") {
        return Err(AppError::Validation(
            "'parent_id' is required for sub agents".into(),
        ));
    }

    let has_code = cols.iter().any(|(name, bind)| {
        *name == "code" && matches!(bind, Bind::Text(s) if !s.is_empty())
    });
    if !has_code {
        cols.retain(|(name, _)| *name != "code");
        let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM agents WHERE agent_type = $1")
            .bind(&agent_type)
            .fetch_one(pool)
            .await?;
        let prefix = if agent_type == "sub" { "SB" } else { "AG" };
        cols.push(("code", Bind::Text(format!("{}-{:04}", prefix, count + 1))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    #[test]
    fn create_extraction_enforces_required_fields() {
        let def = schema::find("packages").unwrap();
        let err = extract_fields(def, &json!({ "category": "haji" }), true).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn create_extraction_applies_defaults() {
        let def = schema::find("packages").unwrap();
        let cols =
            extract_fields(def, &json!({ "name": "Umroh Reguler", "base_price": 25000000 }), true)
                .unwrap();
        let status = cols.iter().find(|(n, _)| *n == "status").unwrap();
        assert!(matches!(&status.1, Bind::Text(s) if s == "active"));
        let category = cols.iter().find(|(n, _)| *n == "category").unwrap();
        assert!(matches!(&category.1, Bind::Text(s) if s == "umroh"));
    }

    #[test]
    fn update_extraction_skips_defaults_and_required() {
        let def = schema::find("packages").unwrap();
        let cols = extract_fields(def, &json!({ "status": "inactive" }), false).unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].0, "status");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let def = schema::find("tasks").unwrap();
        let cols = extract_fields(
            def,
            &json!({ "title": "Call vendor", "sql_injection": "drop table" }),
            true,
        )
        .unwrap();
        assert!(cols.iter().all(|(n, _)| *n != "sql_injection"));
    }

    #[test]
    fn integer_fields_accept_numbers_and_numeric_strings() {
        let def = schema::find("packages").unwrap();
        let f = def.field("base_price").unwrap();
        assert!(matches!(convert(f, &json!(123)).unwrap(), Bind::Int(123)));
        assert!(matches!(convert(f, &json!("456")).unwrap(), Bind::Int(456)));
        assert!(convert(f, &json!({ "nested": true })).is_err());
    }

    #[test]
    fn date_fields_are_validated_at_the_boundary() {
        let def = schema::find("departures").unwrap();
        let f = def.field("departure_date").unwrap();
        assert!(convert(f, &json!("2026-03-15")).is_ok());
        assert!(convert(f, &json!("15/03/2026")).is_err());
        assert!(convert(f, &json!("not a date")).is_err());
    }

    #[test]
    fn password_hook_replaces_plaintext_column() {
        let mut cols = vec![("password", Bind::Text("secret123".into()))];
        apply_password_hash(&mut cols).unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].0, "password_hash");
        assert!(matches!(&cols[0].1, Bind::Text(h) if h.starts_with("$argon2")));
    }

    #[test]
    fn hashing_verifies_with_argon2() {
        use argon2::password_hash::{PasswordHash, PasswordVerifier};
        let hash = hash_password("rahasia").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"rahasia", &parsed)
                .is_ok()
        );
    }
}
