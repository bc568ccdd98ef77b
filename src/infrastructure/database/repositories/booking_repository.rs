//! SeaORM implementation of BookingRepository
//!
//! Each mutation re-validates against committed state inside its own
//! transaction, so the overlap check and the write commit together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::vehicle_repository::bump_booking_count;
use super::{begin_serializable, db_err, WriteGate};
use crate::domain::booking::{Booking, BookingRepository, BookingStatus, DateRange};
use crate::domain::vehicle::Availability;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, vehicle};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmBookingRepository {
    pub(crate) fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    Ok(Booking {
        period: DateRange::new(m.start_date, m.end_date)?,
        status: m.status.parse::<BookingStatus>()?,
        id: m.id,
        vehicle_id: m.vehicle_id,
        renter_email: m.renter_email,
        total_price: m.total_price,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

async fn confirmed_overlapping<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: &str,
    period: &DateRange,
    exclude_id: Option<&str>,
) -> Result<Vec<booking::Model>, DbErr> {
    let mut query = booking::Entity::find()
        .filter(booking::Column::VehicleId.eq(vehicle_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed.as_str()))
        .filter(booking::Column::StartDate.lte(period.end()))
        .filter(booking::Column::EndDate.gte(period.start()));
    if let Some(id) = exclude_id {
        query = query.filter(booking::Column::Id.ne(id));
    }
    query.all(conn).await
}

async fn load<C: ConnectionTrait>(conn: &C, id: &str) -> DomainResult<Booking> {
    let model = booking::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Booking", id))?;
    model_to_domain(model)
}

fn overlap_conflict(vehicle_id: &str, period: &DateRange) -> DomainError {
    DomainError::Conflict(format!(
        "vehicle {} is already booked for {}",
        vehicle_id, period
    ))
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_vehicle(&self, vehicle_id: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_renter(&self, renter_email: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::RenterEmail.eq(renter_email))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_confirmed_overlapping(
        &self,
        vehicle_id: &str,
        period: &DateRange,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Booking>> {
        let models = confirmed_overlapping(&self.db, vehicle_id, period, exclude_id)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn insert_reserving(&self, b: Booking) -> DomainResult<Booking> {
        debug!("Reserving {} for booking {}", b.vehicle_id, b.id);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        let vehicle = vehicle::Entity::find_by_id(b.vehicle_id.as_str())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Vehicle", b.vehicle_id.clone()))?;
        if vehicle.availability != Availability::Available.as_str() {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is not available",
                b.vehicle_id
            )));
        }

        let blocking = confirmed_overlapping(&txn, &b.vehicle_id, &b.period, None)
            .await
            .map_err(db_err)?;
        if !blocking.is_empty() {
            return Err(overlap_conflict(&b.vehicle_id, &b.period));
        }

        let model = booking::ActiveModel {
            id: Set(b.id.clone()),
            vehicle_id: Set(b.vehicle_id.clone()),
            renter_email: Set(b.renter_email.clone()),
            start_date: Set(b.period.start()),
            end_date: Set(b.period.end()),
            total_price: Set(b.total_price),
            status: Set(b.status.as_str().to_string()),
            created_at: Set(b.created_at),
            updated_at: Set(b.updated_at),
        };
        model.insert(&txn).await.map_err(db_err)?;
        bump_booking_count(&txn, &b.vehicle_id, 1)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(b)
    }

    async fn reschedule(
        &self,
        id: &str,
        period: DateRange,
        total_price: i64,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        debug!("Rescheduling booking {} to {}", id, period);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        let mut b = load(&txn, id).await?;
        if b.status.is_terminal() {
            return Err(DomainError::Conflict(format!(
                "booking {} is {} and can no longer be edited",
                id, b.status
            )));
        }
        let blocking = confirmed_overlapping(&txn, &b.vehicle_id, &period, Some(id))
            .await
            .map_err(db_err)?;
        if !blocking.is_empty() {
            return Err(overlap_conflict(&b.vehicle_id, &period));
        }

        booking::Entity::update_many()
            .col_expr(booking::Column::StartDate, Expr::value(period.start()))
            .col_expr(booking::Column::EndDate, Expr::value(period.end()))
            .col_expr(booking::Column::TotalPrice, Expr::value(total_price))
            .col_expr(booking::Column::UpdatedAt, Expr::value(updated_at))
            .filter(booking::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        b.period = period;
        b.total_price = total_price;
        b.updated_at = updated_at;
        Ok(b)
    }

    async fn set_status(
        &self,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        debug!("Booking {}: {} -> {}", id, from, to);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        let mut b = load(&txn, id).await?;
        if to.blocks_dates() {
            let blocking = confirmed_overlapping(&txn, &b.vehicle_id, &b.period, Some(id))
                .await
                .map_err(db_err)?;
            if !blocking.is_empty() {
                return Err(DomainError::Conflict(format!(
                    "vehicle {} already has a confirmed booking overlapping {}",
                    b.vehicle_id, b.period
                )));
            }
        }

        // Compare-and-set on the status the caller decided on
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(updated_at))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(from.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!(
                "booking {} changed concurrently (now {})",
                id, b.status
            )));
        }

        txn.commit().await.map_err(db_err)?;

        b.status = to;
        b.updated_at = updated_at;
        Ok(b)
    }

    async fn delete_releasing(&self, id: &str) -> DomainResult<Booking> {
        debug!("Deleting booking {}", id);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        let b = load(&txn, id).await?;
        booking::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if b.status != BookingStatus::Canceled {
            bump_booking_count(&txn, &b.vehicle_id, -1)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(b)
    }
}
