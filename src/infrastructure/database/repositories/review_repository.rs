//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::vehicle_repository::write_rating;
use super::{begin_serializable, db_err, WriteGate};
use crate::domain::review::{RatingSummary, Review, ReviewRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{review, vehicle};

pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmReviewRepository {
    pub(crate) fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: review::Model) -> Review {
    Review {
        id: m.id,
        vehicle_id: m.vehicle_id,
        booking_id: m.booking_id,
        vehicle_model: m.vehicle_model,
        owner_email: m.owner_email,
        owner_name: m.owner_name,
        reviewer_email: m.reviewer_email,
        reviewer_name: m.reviewer_name,
        reviewer_photo: m.reviewer_photo,
        rating: m.rating,
        comment: m.comment,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

/// Re-read every rating of the vehicle and store the new average
async fn recompute_on<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: &str,
) -> Result<RatingSummary, DbErr> {
    let ratings: Vec<i32> = review::Entity::find()
        .filter(review::Column::VehicleId.eq(vehicle_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();
    let summary = RatingSummary::from_ratings(&ratings);
    write_rating(conn, vehicle_id, &summary).await?;
    Ok(summary)
}

async fn ensure_vehicle<C: ConnectionTrait>(conn: &C, vehicle_id: &str) -> DomainResult<()> {
    vehicle::Entity::find_by_id(vehicle_id)
        .one(conn)
        .await
        .map_err(db_err)?
        .map(|_| ())
        .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))
}

// ── ReviewRepository impl ───────────────────────────────────────

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Review>> {
        let model = review::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_vehicle(&self, vehicle_id: &str) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_reviewer(&self, reviewer_email: &str) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::ReviewerEmail.eq(reviewer_email))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_vehicle_and_reviewer(
        &self,
        vehicle_id: &str,
        reviewer_email: &str,
    ) -> DomainResult<Option<Review>> {
        let model = review::Entity::find()
            .filter(review::Column::VehicleId.eq(vehicle_id))
            .filter(review::Column::ReviewerEmail.eq(reviewer_email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn insert_and_recompute(&self, r: Review) -> DomainResult<RatingSummary> {
        debug!("Saving review {} for vehicle {}", r.id, r.vehicle_id);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        ensure_vehicle(&txn, &r.vehicle_id).await?;
        let existing = review::Entity::find()
            .filter(review::Column::VehicleId.eq(r.vehicle_id.as_str()))
            .filter(review::Column::ReviewerEmail.eq(r.reviewer_email.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(DomainError::Conflict(format!(
                "{} has already reviewed vehicle {}",
                r.reviewer_email, r.vehicle_id
            )));
        }

        let vehicle_id = r.vehicle_id.clone();
        let model = review::ActiveModel {
            id: Set(r.id),
            vehicle_id: Set(r.vehicle_id),
            booking_id: Set(r.booking_id),
            vehicle_model: Set(r.vehicle_model),
            owner_email: Set(r.owner_email),
            owner_name: Set(r.owner_name),
            reviewer_email: Set(r.reviewer_email),
            reviewer_name: Set(r.reviewer_name),
            reviewer_photo: Set(r.reviewer_photo),
            rating: Set(r.rating),
            comment: Set(r.comment),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        };
        model.insert(&txn).await.map_err(db_err)?;
        let summary = recompute_on(&txn, &vehicle_id).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(summary)
    }

    async fn update_and_recompute(
        &self,
        id: &str,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> DomainResult<(Review, Option<RatingSummary>)> {
        debug!("Updating review {}", id);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        let existing = review::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Review", id))?;
        let vehicle_id = existing.vehicle_id.clone();

        let mut active: review::ActiveModel = existing.into();
        if let Some(rating) = rating {
            active.rating = Set(rating);
        }
        if let Some(comment) = comment {
            active.comment = Set(comment);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(db_err)?;

        let summary = match rating {
            Some(_) => Some(recompute_on(&txn, &vehicle_id).await.map_err(db_err)?),
            None => None,
        };

        txn.commit().await.map_err(db_err)?;
        Ok((model_to_domain(updated), summary))
    }

    async fn delete_and_recompute(&self, id: &str) -> DomainResult<RatingSummary> {
        debug!("Deleting review {}", id);

        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        let existing = review::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Review", id))?;
        review::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let summary = recompute_on(&txn, &existing.vehicle_id)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(summary)
    }

    async fn recompute(&self, vehicle_id: &str) -> DomainResult<RatingSummary> {
        let _turn = self.gate.enter().await;
        let txn = begin_serializable(&self.db).await?;

        ensure_vehicle(&txn, vehicle_id).await?;
        let summary = recompute_on(&txn, vehicle_id).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{Reviewer, VehicleSnapshot};
    use crate::domain::vehicle::{Vehicle, VehicleRepository};
    use crate::infrastructure::database::repositories::testing::sqlite_memory;
    use crate::infrastructure::database::repositories::vehicle_repository::SeaOrmVehicleRepository;

    fn review_of(v: &Vehicle, reviewer: &str, rating: i32) -> Review {
        Review::new(
            VehicleSnapshot {
                vehicle_id: v.id.clone(),
                model: v.model.clone(),
                owner_email: v.owner_email.clone(),
                owner_name: v.owner_name.clone(),
            },
            "b-1",
            Reviewer {
                email: reviewer.into(),
                name: None,
                photo_url: None,
            },
            rating,
            "smooth rental experience",
        )
        .unwrap()
    }

    async fn setup() -> (SeaOrmReviewRepository, SeaOrmVehicleRepository, Vehicle) {
        let db = sqlite_memory().await;
        let vehicles = SeaOrmVehicleRepository::new(db.clone(), WriteGate::default());
        let v = Vehicle::new("Fit", 3_000, "Khulna", "owner@x.com", None).unwrap();
        vehicles.save(v.clone()).await.unwrap();
        (SeaOrmReviewRepository::new(db, WriteGate::default()), vehicles, v)
    }

    #[tokio::test]
    async fn insert_recomputes_vehicle_rating() {
        let (repo, vehicles, v) = setup().await;
        repo.insert_and_recompute(review_of(&v, "a@x.com", 4)).await.unwrap();
        let summary = repo
            .insert_and_recompute(review_of(&v, "b@x.com", 2))
            .await
            .unwrap();
        assert_eq!(summary, RatingSummary { rating: 3.0, review_count: 2 });

        let stored = vehicles.find_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 3.0);
        assert_eq!(stored.review_count, 2);
    }

    #[tokio::test]
    async fn duplicate_reviewer_is_conflict() {
        let (repo, vehicles, v) = setup().await;
        repo.insert_and_recompute(review_of(&v, "a@x.com", 5)).await.unwrap();
        let err = repo
            .insert_and_recompute(review_of(&v, "a@x.com", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(vehicles.find_by_id(&v.id).await.unwrap().unwrap().review_count, 1);
    }

    #[tokio::test]
    async fn comment_only_update_skips_recompute() {
        let (repo, _, v) = setup().await;
        let r = review_of(&v, "a@x.com", 5);
        repo.insert_and_recompute(r.clone()).await.unwrap();

        let (updated, summary) = repo
            .update_and_recompute(&r.id, None, Some("still great a week later".into()))
            .await
            .unwrap();
        assert!(summary.is_none());
        assert_eq!(updated.comment, "still great a week later");

        let (_, summary) = repo.update_and_recompute(&r.id, Some(3), None).await.unwrap();
        assert_eq!(summary.unwrap().rating, 3.0);
    }

    #[tokio::test]
    async fn deleting_last_review_zeroes_rating() {
        let (repo, vehicles, v) = setup().await;
        let r = review_of(&v, "a@x.com", 4);
        repo.insert_and_recompute(r.clone()).await.unwrap();

        let summary = repo.delete_and_recompute(&r.id).await.unwrap();
        assert_eq!(summary, RatingSummary::EMPTY);
        let stored = vehicles.find_by_id(&v.id).await.unwrap().unwrap();
        assert_eq!((stored.rating, stored.review_count), (0.0, 0));
    }
}
