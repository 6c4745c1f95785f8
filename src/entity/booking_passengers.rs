use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "booking_passengers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub booking_id: i64,
    pub jamaah_id: i64,
    pub room_type: String,
    pub price_pax: i64,
    pub assigned_room_id: Option<i64>,
    pub visa_status: String,
    pub passport_status: String,
    pub vaccine_status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
    #[sea_orm(
        belongs_to = "super::jamaah::Entity",
        from = "Column::JamaahId",
        to = "super::jamaah::Column::Id"
    )]
    Jamaah,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::jamaah::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jamaah.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
