use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use sqlx::{Acquire, PgPool, Postgres, Transaction};
use tracing::warn;

use crate::error::{Result, StorageError};
use crate::models::{ExerciseLog, ExerciseLogRow, NewExerciseLog};

const SELECT_LOGS: &str = r#"
    SELECT log_id, logged_at, user_id, exercise_name, total_repetitions,
           duration_minutes, comments, effort_reserve,
           series_detail::text AS series_detail
    FROM exercise_logs
    WHERE user_id = $1 AND logged_at >= $2
    ORDER BY logged_at DESC
"#;

// Same projection for schemas that predate the series_detail column.
const SELECT_LOGS_WITHOUT_DETAIL: &str = r#"
    SELECT log_id, logged_at, user_id, exercise_name, total_repetitions,
           duration_minutes, comments, effort_reserve,
           NULL::text AS series_detail
    FROM exercise_logs
    WHERE user_id = $1 AND logged_at >= $2
    ORDER BY logged_at DESC
"#;

/// Repository for `exercise_logs` reads and bulk deletes
pub struct ExerciseLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExerciseLogRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open an append transaction
    pub async fn begin_batch(&self) -> Result<PgLogBatch> {
        let tx = self.pool.begin().await?;
        Ok(PgLogBatch { tx })
    }

    /// List a user's logs since the given instant, newest first
    pub async fn list_since(
        &self,
        user_id: &str,
        since: NaiveDateTime,
    ) -> Result<Vec<ExerciseLog>> {
        let rows = match self.fetch_rows(SELECT_LOGS, user_id, since).await {
            Err(e) if e.is_missing_column() => {
                warn!("series_detail column not present, listing logs without it");
                self.fetch_rows(SELECT_LOGS_WITHOUT_DETAIL, user_id, since)
                    .await?
            }
            other => other?,
        };

        Ok(rows.into_iter().map(ExerciseLog::from).collect())
    }

    async fn fetch_rows(
        &self,
        sql: &str,
        user_id: &str,
        since: NaiveDateTime,
    ) -> Result<Vec<ExerciseLogRow>> {
        sqlx::query_as::<_, ExerciseLogRow>(sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(self.pool)
            .await
            .map_err(StorageError::classify)
    }

    /// Distinct exercise names logged in `[start, end)`
    pub async fn distinct_names_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BTreeSet<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT exercise_name
            FROM exercise_logs
            WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    /// Delete every log in `[start, end)` for the user
    pub async fn delete_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM exercise_logs
            WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(&self, user_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM exercise_logs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}

/// Append transaction over Postgres.
///
/// The extended insert runs inside a savepoint: a failed statement would
/// otherwise abort the whole transaction and rule out the reduced retry.
pub struct PgLogBatch {
    tx: Transaction<'static, Postgres>,
}

impl PgLogBatch {
    pub async fn insert_extended(&mut self, log: &NewExerciseLog) -> Result<()> {
        let series_detail = log.series_detail.as_ref().map(sqlx::types::Json);

        let mut savepoint = (&mut self.tx).begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO exercise_logs
                (logged_at, user_id, exercise_name, total_repetitions,
                 comments, effort_reserve, series_detail)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(log.logged_at)
        .bind(&log.user_id)
        .bind(&log.exercise_name)
        .bind(log.total_repetitions)
        .bind(&log.comments)
        .bind(log.effort_reserve)
        .bind(series_detail)
        .execute(&mut *savepoint)
        .await;

        match result {
            Ok(_) => {
                savepoint.commit().await?;
                Ok(())
            }
            Err(e) => {
                savepoint.rollback().await?;
                Err(StorageError::classify(e))
            }
        }
    }

    pub async fn insert_reduced(&mut self, log: &NewExerciseLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO exercise_logs
                (logged_at, user_id, exercise_name, total_repetitions,
                 comments, effort_reserve)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(log.logged_at)
        .bind(&log.user_id)
        .bind(&log.exercise_name)
        .bind(log.total_repetitions)
        .bind(&log.comments)
        .bind(log.effort_reserve)
        .execute(&mut *self.tx)
        .await
        .map_err(StorageError::classify)?;

        Ok(())
    }

    pub async fn insert_duration(&mut self, log: &NewExerciseLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO exercise_logs
                (logged_at, user_id, exercise_name, duration_minutes,
                 comments, effort_reserve)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(log.logged_at)
        .bind(&log.user_id)
        .bind(&log.exercise_name)
        .bind(log.duration_minutes)
        .bind(&log.comments)
        .bind(log.effort_reserve)
        .execute(&mut *self.tx)
        .await
        .map_err(StorageError::classify)?;

        Ok(())
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
