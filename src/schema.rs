//! Static registry of every resource served by the generic CRUD engine.
//!
//! Identifiers (table names, column names, sortable columns) only ever come
//! from this registry, never from request input, so the query builder can
//! interpolate them without risking injection. Values are always bound.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Bool,
    Date,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// Applied on create when the field is absent. Stored as a literal and
    /// converted according to `ty`.
    pub default: Option<&'static str>,
}

const fn field(name: &'static str, ty: FieldType) -> FieldDef {
    FieldDef {
        name,
        ty,
        required: false,
        default: None,
    }
}

const fn required(name: &'static str, ty: FieldType) -> FieldDef {
    FieldDef {
        name,
        ty,
        required: true,
        default: None,
    }
}

const fn with_default(name: &'static str, ty: FieldType, default: &'static str) -> FieldDef {
    FieldDef {
        name,
        ty,
        required: false,
        default: Some(default),
    }
}

/// Allowed roles per CRUD operation. Empty slice = any authenticated user.
#[derive(Debug, Clone, Copy)]
pub struct Permissions {
    pub get_items: &'static [&'static str],
    pub get_item: &'static [&'static str],
    pub create_item: &'static [&'static str],
    pub update_item: &'static [&'static str],
    pub delete_item: &'static [&'static str],
}

const fn perms(
    read: &'static [&'static str],
    write: &'static [&'static str],
) -> Permissions {
    Permissions {
        get_items: read,
        get_item: read,
        create_item: write,
        update_item: write,
        delete_item: write,
    }
}

/// Statically-dispatched per-resource create transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateHook {
    None,
    /// `password` in the payload becomes an argon2 `password_hash` column.
    HashPassword,
    /// Validates the sub/parent invariant and fills `code` from a sequence.
    AgentCode,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub path: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    pub searchable: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub permissions: Permissions,
    pub create_hook: CreateHook,
    /// Opts out of the status-column soft-delete heuristic for tables whose
    /// `status` is a domain value rather than a lifecycle flag.
    pub hard_delete: bool,
}

impl ResourceDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Soft delete applies when the table carries a lifecycle `status`
    /// column and the resource has not opted out.
    pub fn soft_delete(&self) -> bool {
        !self.hard_delete && self.field("status").is_some()
    }

    pub fn is_sortable(&self, column: &str) -> bool {
        self.sortable.contains(&column)
    }
}

pub fn find(path: &str) -> Option<&'static ResourceDef> {
    RESOURCES.iter().find(|r| r.path == path)
}

const ANY: &[&str] = &[];
const ADMIN: &[&str] = &["admin"];
const OPS: &[&str] = &["admin", "operator"];
const FINANCE: &[&str] = &["admin", "finance"];
const HR: &[&str] = &["admin", "hr"];
const MARKETING: &[&str] = &["admin", "marketing"];

use FieldType::{Date, Decimal, Integer, Json, Text};

pub static RESOURCES: &[ResourceDef] = &[
    ResourceDef {
        path: "packages",
        table: "packages",
        fields: &[
            required("name", Text),
            with_default("category", Text, "umroh"),
            with_default("duration_days", Integer, "9"),
            required("base_price", Integer),
            with_default("price_quad", Integer, "0"),
            with_default("price_triple", Integer, "0"),
            with_default("price_double", Integer, "0"),
            field("description", Text),
            with_default("status", Text, "active"),
        ],
        searchable: &["name", "category"],
        sortable: &["id", "name", "base_price", "status", "created_at"],
        permissions: perms(ANY, OPS),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "departures",
        table: "departures",
        fields: &[
            required("package_id", Integer),
            required("departure_date", Date),
            with_default("quota", Integer, "0"),
            with_default("price_quad", Integer, "0"),
            with_default("price_triple", Integer, "0"),
            with_default("price_double", Integer, "0"),
            with_default("status", Text, "open"),
        ],
        searchable: &["status"],
        sortable: &["id", "departure_date", "quota", "status", "created_at"],
        permissions: perms(ANY, OPS),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "jamaah",
        table: "jamaah",
        fields: &[
            required("full_name", Text),
            field("nik", Text),
            with_default("gender", Text, "L"),
            field("birth_date", Date),
            field("phone", Text),
            field("email", Text),
            field("address", Text),
            field("passport_number", Text),
            field("passport_expiry", Date),
            field("package_id", Integer),
            field("sub_agent_id", Integer),
            with_default("room_type", Text, "quad"),
            with_default("status", Text, "active"),
        ],
        searchable: &["full_name", "nik", "phone", "passport_number"],
        sortable: &[
            "id",
            "full_name",
            "payment_status",
            "remaining_balance",
            "created_at",
        ],
        permissions: perms(ANY, OPS),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "bookings",
        table: "bookings",
        fields: &[
            required("departure_id", Integer),
            required("contact_name", Text),
            field("contact_phone", Text),
            field("contact_email", Text),
            field("agent_id", Integer),
            with_default("status", Text, "pending"),
        ],
        searchable: &["booking_code", "contact_name", "contact_phone"],
        sortable: &["id", "booking_code", "total_price", "status", "created_at"],
        permissions: Permissions {
            get_items: ANY,
            get_item: ANY,
            create_item: OPS,
            update_item: OPS,
            delete_item: ADMIN,
        },
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "agents",
        table: "agents",
        fields: &[
            required("name", Text),
            field("code", Text),
            with_default("agent_type", Text, "master"),
            field("parent_id", Integer),
            field("phone", Text),
            field("email", Text),
            with_default("fixed_commission", Integer, "0"),
            with_default("commission_rate", Decimal, "0"),
            with_default("status", Text, "active"),
        ],
        searchable: &["name", "code", "phone"],
        sortable: &["id", "name", "code", "created_at"],
        permissions: perms(ANY, ADMIN),
        create_hook: CreateHook::AgentCode,
        hard_delete: false,
    },
    ResourceDef {
        path: "finance",
        table: "finance_transactions",
        fields: &[
            required("transaction_date", Date),
            with_default("category", Text, "other"),
            with_default("direction", Text, "in"),
            required("amount", Integer),
            field("description", Text),
            with_default("status", Text, "posted"),
        ],
        searchable: &["description", "category"],
        sortable: &["id", "transaction_date", "amount", "created_at"],
        permissions: perms(FINANCE, FINANCE),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "employees",
        table: "employees",
        fields: &[
            required("full_name", Text),
            field("position", Text),
            field("department", Text),
            field("phone", Text),
            field("email", Text),
            with_default("base_salary", Integer, "0"),
            field("join_date", Date),
            with_default("status", Text, "active"),
        ],
        searchable: &["full_name", "position", "department"],
        sortable: &["id", "full_name", "join_date", "created_at"],
        permissions: perms(HR, HR),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "attendance",
        table: "attendance",
        fields: &[
            required("employee_id", Integer),
            required("work_date", Date),
            with_default("status", Text, "present"),
            field("note", Text),
        ],
        searchable: &[],
        sortable: &["id", "work_date", "created_at"],
        permissions: perms(HR, HR),
        create_hook: CreateHook::None,
        // `status` here is present/absent/sick, not a lifecycle flag.
        hard_delete: true,
    },
    ResourceDef {
        path: "loans",
        table: "loans",
        fields: &[
            required("employee_id", Integer),
            required("amount", Integer),
            with_default("monthly_deduction", Integer, "0"),
            with_default("remaining", Integer, "0"),
            with_default("status", Text, "active"),
        ],
        searchable: &[],
        sortable: &["id", "amount", "created_at"],
        permissions: perms(HR, HR),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "tasks",
        table: "tasks",
        fields: &[
            required("title", Text),
            field("description", Text),
            field("assignee_id", Integer),
            field("due_date", Date),
            with_default("priority", Text, "normal"),
            with_default("status", Text, "open"),
        ],
        searchable: &["title"],
        sortable: &["id", "due_date", "priority", "status", "created_at"],
        permissions: perms(ANY, ANY),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "leads",
        table: "leads",
        fields: &[
            required("full_name", Text),
            field("phone", Text),
            field("email", Text),
            with_default("source", Text, "walk_in"),
            field("campaign_id", Integer),
            field("assigned_to", Integer),
            with_default("status", Text, "new"),
        ],
        searchable: &["full_name", "phone", "email"],
        sortable: &["id", "full_name", "source", "status", "created_at"],
        permissions: perms(MARKETING, MARKETING),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "campaigns",
        table: "campaigns",
        fields: &[
            required("name", Text),
            with_default("channel", Text, "social"),
            with_default("budget", Integer, "0"),
            field("start_date", Date),
            field("end_date", Date),
            with_default("status", Text, "draft"),
        ],
        searchable: &["name", "channel"],
        sortable: &["id", "name", "budget", "start_date", "created_at"],
        permissions: perms(MARKETING, MARKETING),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "logistics",
        table: "logistics_items",
        fields: &[
            required("name", Text),
            field("sku", Text),
            with_default("quantity", Integer, "0"),
            with_default("unit", Text, "pcs"),
            field("location", Text),
            with_default("status", Text, "in_stock"),
        ],
        searchable: &["name", "sku"],
        sortable: &["id", "name", "quantity", "created_at"],
        permissions: perms(ANY, OPS),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "hotels",
        table: "hotels",
        fields: &[
            required("name", Text),
            field("city", Text),
            with_default("stars", Integer, "3"),
            with_default("status", Text, "active"),
        ],
        searchable: &["name", "city"],
        sortable: &["id", "name", "city", "stars", "created_at"],
        permissions: perms(ANY, OPS),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
    ResourceDef {
        path: "users",
        table: "users",
        fields: &[
            field("name", Text),
            required("username", Text),
            required("email", Text),
            required("password", Text),
            with_default("role", Text, "operator"),
            with_default("status", Text, "active"),
        ],
        searchable: &["name", "username", "email"],
        sortable: &["id", "username", "email", "role", "created_at"],
        permissions: perms(ADMIN, ADMIN),
        create_hook: CreateHook::HashPassword,
        hard_delete: false,
    },
    ResourceDef {
        path: "roles",
        table: "roles",
        fields: &[
            required("role_key", Text),
            field("label", Text),
            with_default("capabilities", Json, "[]"),
        ],
        searchable: &["role_key", "label"],
        sortable: &["id", "role_key", "created_at"],
        permissions: perms(ADMIN, ADMIN),
        create_hook: CreateHook::None,
        hard_delete: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_is_resolvable_by_path() {
        for def in RESOURCES {
            assert!(find(def.path).is_some(), "missing {}", def.path);
        }
        assert!(find("no_such_resource").is_none());
    }

    #[test]
    fn soft_delete_follows_status_column() {
        assert!(find("packages").unwrap().soft_delete());
        assert!(find("users").unwrap().soft_delete());
        // Roles have no status column and are removed for real.
        assert!(!find("roles").unwrap().soft_delete());
    }

    #[test]
    fn attendance_rows_are_removed_outright() {
        // Its status column holds present/absent values; flipping it to
        // 'deleted' would corrupt the sheet, so deletes are real.
        let def = find("attendance").unwrap();
        assert!(def.field("status").is_some());
        assert!(!def.soft_delete());
    }

    #[test]
    fn every_resource_sorts_by_id() {
        for def in RESOURCES {
            assert!(def.is_sortable("id"), "{} cannot sort by id", def.path);
        }
    }

    #[test]
    fn payments_and_rooms_are_not_generic_resources() {
        // Their mutations must go through the workflow services.
        assert!(find("payments").is_none());
        assert!(find("rooms").is_none());
    }
}
