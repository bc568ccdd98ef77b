//! Vehicle entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub model: String,

    /// Minor currency units per day
    pub daily_price: i64,

    pub location: String,

    /// Availability: Available, Unavailable
    pub availability: String,

    pub owner_email: String,

    #[sea_orm(nullable)]
    pub owner_name: Option<String>,

    pub registration: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// JSON array of feature labels
    #[sea_orm(column_type = "Text")]
    pub features_json: String,

    /// JSON array of image URLs
    #[sea_orm(column_type = "Text")]
    pub image_urls_json: String,

    pub rating: f64,
    pub review_count: i64,
    pub booking_count: i64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
