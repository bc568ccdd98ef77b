//! Review entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub vehicle_id: String,
    pub booking_id: String,

    // Snapshot of the vehicle at review time
    pub vehicle_model: String,
    pub owner_email: String,
    #[sea_orm(nullable)]
    pub owner_name: Option<String>,

    pub reviewer_email: String,
    #[sea_orm(nullable)]
    pub reviewer_name: Option<String>,
    #[sea_orm(nullable)]
    pub reviewer_photo: Option<String>,

    pub rating: i32,
    pub comment: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
