use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jamaah")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    pub nik: Option<String>,
    pub gender: String,
    pub birth_date: Option<Date>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiry: Option<Date>,
    pub package_id: Option<i64>,
    pub sub_agent_id: Option<i64>,
    pub room_type: String,
    pub total_price: i64,
    pub total_paid: i64,
    pub remaining_balance: i64,
    pub payment_status: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::booking_passengers::Entity")]
    BookingPassengers,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::booking_passengers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingPassengers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
