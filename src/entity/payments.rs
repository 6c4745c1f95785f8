use sea_orm::entity::prelude::*;

/// Only rows with this status count toward a pilgrim's balance.
pub const CONFIRMED: &str = "confirmed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub jamaah_id: i64,
    pub amount: i64,
    pub payment_date: Date,
    pub method: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::jamaah::Entity",
        from = "Column::JamaahId",
        to = "super::jamaah::Column::Id"
    )]
    Jamaah,
}

impl Related<super::jamaah::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jamaah.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
