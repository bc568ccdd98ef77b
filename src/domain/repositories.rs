//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` — unified access to all per-aggregate repositories
//! - `DomainResult` — standard result type for domain operations

use async_trait::async_trait;

use super::booking::BookingRepository;
use super::review::ReviewRepository;
use super::vehicle::VehicleRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let vehicle = repos.vehicles().find_by_id("v-1").await?;
///     let taken = repos.bookings().find_confirmed_overlapping("v-1", &period, None).await?;
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn reviews(&self) -> &dyn ReviewRepository;

    /// Cheap round-trip to the backing store, used by the health check
    async fn ping(&self) -> DomainResult<()>;
}
