use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category: String,
    pub duration_days: i64,
    pub base_price: i64,
    pub price_quad: i64,
    pub price_triple: i64,
    pub price_double: i64,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::departures::Entity")]
    Departures,
}

impl Related<super::departures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
