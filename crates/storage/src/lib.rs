pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use error::{Result, StorageError};
pub use store::{ExerciseLogStore, LogBatch, RoutineDayStore};

use models::{ExerciseLog, NewExerciseLog, PlannedDay, RoutineDay};
use repository::{ExerciseLogRepository, PgLogBatch, RoutineRepository};

/// Postgres-backed store shared by every unit of work.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ExerciseLogStore for Database {
    async fn begin_batch(&self) -> Result<Box<dyn LogBatch>> {
        let batch = ExerciseLogRepository::new(&self.pool).begin_batch().await?;
        Ok(Box::new(batch))
    }

    async fn logs_since(&self, user_id: &str, since: NaiveDateTime) -> Result<Vec<ExerciseLog>> {
        ExerciseLogRepository::new(&self.pool)
            .list_since(user_id, since)
            .await
    }

    async fn exercise_names_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BTreeSet<String>> {
        ExerciseLogRepository::new(&self.pool)
            .distinct_names_between(user_id, start, end)
            .await
    }

    async fn delete_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u64> {
        ExerciseLogRepository::new(&self.pool)
            .delete_between(user_id, start, end)
            .await
    }

    async fn count_logs(&self, user_id: &str) -> Result<i64> {
        ExerciseLogRepository::new(&self.pool).count(user_id).await
    }
}

#[async_trait]
impl LogBatch for PgLogBatch {
    async fn insert_extended(&mut self, log: &NewExerciseLog) -> Result<()> {
        PgLogBatch::insert_extended(self, log).await
    }

    async fn insert_reduced(&mut self, log: &NewExerciseLog) -> Result<()> {
        PgLogBatch::insert_reduced(self, log).await
    }

    async fn insert_duration(&mut self, log: &NewExerciseLog) -> Result<()> {
        PgLogBatch::insert_duration(self, log).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        PgLogBatch::commit(*self).await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        PgLogBatch::rollback(*self).await
    }
}

#[async_trait]
impl RoutineDayStore for Database {
    async fn replace_routine(&self, user_id: &str, days: &[PlannedDay]) -> Result<()> {
        RoutineRepository::new(&self.pool).replace(user_id, days).await
    }

    async fn load_routine(&self, user_id: &str) -> Result<Vec<RoutineDay>> {
        RoutineRepository::new(&self.pool).list_for_user(user_id).await
    }
}
