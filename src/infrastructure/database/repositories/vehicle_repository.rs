//! SeaORM implementation of VehicleRepository
//!
//! Also hosts the ledger helpers the booking and review repositories use to
//! adjust vehicle counters inside their own transactions.

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::{begin_serializable, db_err, WriteGate};
use crate::domain::review::RatingSummary;
use crate::domain::vehicle::{Availability, Vehicle, VehicleRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, review, vehicle};

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmVehicleRepository {
    pub(crate) fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn decode_list(column: &str, raw: &str) -> DomainResult<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| DomainError::Unavailable(format!("Corrupt {} column: {}", column, e)))
}

fn encode_list(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

fn model_to_domain(m: vehicle::Model) -> DomainResult<Vehicle> {
    Ok(Vehicle {
        availability: m.availability.parse::<Availability>()?,
        features: decode_list("features_json", &m.features_json)?,
        image_urls: decode_list("image_urls_json", &m.image_urls_json)?,
        id: m.id,
        model: m.model,
        daily_price: m.daily_price,
        location: m.location,
        owner_email: m.owner_email,
        owner_name: m.owner_name,
        registration: m.registration,
        description: m.description,
        rating: m.rating,
        review_count: m.review_count,
        booking_count: m.booking_count,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

// ── Ledger helpers ──────────────────────────────────────────────

/// Atomic `booking_count = booking_count + delta` at the store level.
pub(crate) async fn bump_booking_count<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: &str,
    delta: i64,
) -> Result<(), DbErr> {
    vehicle::Entity::update_many()
        .col_expr(
            vehicle::Column::BookingCount,
            Expr::col(vehicle::Column::BookingCount).add(delta),
        )
        .filter(vehicle::Column::Id.eq(vehicle_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub(crate) async fn write_rating<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: &str,
    summary: &RatingSummary,
) -> Result<(), DbErr> {
    vehicle::Entity::update_many()
        .col_expr(vehicle::Column::Rating, Expr::value(summary.rating))
        .col_expr(vehicle::Column::ReviewCount, Expr::value(summary.review_count))
        .filter(vehicle::Column::Id.eq(vehicle_id))
        .exec(conn)
        .await?;
    Ok(())
}

// ── VehicleRepository impl ──────────────────────────────────────

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn save(&self, v: Vehicle) -> DomainResult<()> {
        debug!("Saving vehicle: {}", v.id);

        let model = vehicle::ActiveModel {
            id: Set(v.id),
            model: Set(v.model),
            daily_price: Set(v.daily_price),
            location: Set(v.location),
            availability: Set(v.availability.as_str().to_string()),
            owner_email: Set(v.owner_email),
            owner_name: Set(v.owner_name),
            registration: Set(v.registration),
            description: Set(v.description),
            features_json: Set(encode_list(&v.features)),
            image_urls_json: Set(encode_list(&v.image_urls)),
            rating: Set(v.rating),
            review_count: Set(v.review_count),
            booking_count: Set(v.booking_count),
            created_at: Set(v.created_at),
            updated_at: Set(v.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Vehicle>> {
        vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .order_by_desc(vehicle::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn find_by_owner(&self, owner_email: &str) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .filter(vehicle::Column::OwnerEmail.eq(owner_email))
            .order_by_desc(vehicle::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn update(&self, v: Vehicle) -> DomainResult<()> {
        debug!("Updating vehicle listing: {}", v.id);

        let result = vehicle::Entity::update_many()
            .col_expr(vehicle::Column::Model, Expr::value(v.model))
            .col_expr(vehicle::Column::DailyPrice, Expr::value(v.daily_price))
            .col_expr(vehicle::Column::Location, Expr::value(v.location))
            .col_expr(
                vehicle::Column::Availability,
                Expr::value(v.availability.as_str()),
            )
            .col_expr(vehicle::Column::Registration, Expr::value(v.registration))
            .col_expr(vehicle::Column::Description, Expr::value(v.description))
            .col_expr(
                vehicle::Column::FeaturesJson,
                Expr::value(encode_list(&v.features)),
            )
            .col_expr(
                vehicle::Column::ImageUrlsJson,
                Expr::value(encode_list(&v.image_urls)),
            )
            .col_expr(vehicle::Column::UpdatedAt, Expr::value(v.updated_at))
            .filter(vehicle::Column::Id.eq(v.id.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Vehicle", v.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        debug!("Deleting vehicle with bookings and reviews: {}", id);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        review::Entity::delete_many()
            .filter(review::Column::VehicleId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        booking::Entity::delete_many()
            .filter(booking::Column::VehicleId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let result = vehicle::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Vehicle", id));
        }
        txn.commit().await.map_err(db_err)
    }
}
