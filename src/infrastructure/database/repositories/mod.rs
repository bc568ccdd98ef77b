//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod booking_repository;
pub mod repository_provider;
pub mod review_repository;
pub mod vehicle_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, IsolationLevel, SqlErr,
    TransactionTrait,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{DomainError, DomainResult};

/// Unique-index violations are business conflicts; anything else means the
/// store itself is misbehaving.
pub(crate) fn db_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::Conflict(msg),
        _ => DomainError::Unavailable(format!("Database error: {}", e)),
    }
}

/// Process-wide gate for check-then-write units.
///
/// Two deferred SQLite transactions that both read and then both write
/// deadlock on the lock upgrade, and SQLite answers `SQLITE_BUSY` without
/// waiting on the busy timeout. Units therefore take turns on SQLite.
/// Other backends resolve contention inside the transaction and get no gate.
#[derive(Clone, Default)]
pub(crate) struct WriteGate(Option<Arc<Mutex<()>>>);

impl WriteGate {
    pub fn for_backend(db: &DatabaseConnection) -> Self {
        match db.get_database_backend() {
            DbBackend::Sqlite => Self(Some(Arc::new(Mutex::new(())))),
            _ => Self(None),
        }
    }

    /// Hold the returned guard until the unit's transaction is finished.
    pub async fn enter(&self) -> Option<OwnedMutexGuard<()>> {
        match &self.0 {
            Some(gate) => Some(gate.clone().lock_owned().await),
            None => None,
        }
    }
}

/// Open a transaction for a check-then-write unit.
///
/// SQLite transactions are already serializable and reject an explicit
/// isolation level, so only other backends get one.
pub(crate) async fn begin_serializable(db: &DatabaseConnection) -> DomainResult<DatabaseTransaction> {
    let isolation = match db.get_database_backend() {
        DbBackend::Sqlite => None,
        _ => Some(IsolationLevel::Serializable),
    };
    db.begin_with_config(isolation, None).await.map_err(db_err)
}
