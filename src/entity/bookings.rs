use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub booking_code: String,
    pub departure_id: i64,
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub agent_id: Option<i64>,
    pub total_pax: i64,
    pub total_price: i64,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departures::Entity",
        from = "Column::DepartureId",
        to = "super::departures::Column::Id"
    )]
    Departures,
    #[sea_orm(has_many = "super::booking_passengers::Entity")]
    BookingPassengers,
    #[sea_orm(has_many = "super::commissions::Entity")]
    Commissions,
}

impl Related<super::departures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departures.def()
    }
}

impl Related<super::booking_passengers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingPassengers.def()
    }
}

impl Related<super::commissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
