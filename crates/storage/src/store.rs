//! Store seams used by the tracker.
//!
//! [`crate::Database`] implements them over Postgres; the in-memory store
//! behind the `test-utils` feature implements them for tests.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{ExerciseLog, NewExerciseLog, PlannedDay, RoutineDay};

#[async_trait]
pub trait ExerciseLogStore: Send + Sync {
    /// Opens a transaction for appending log rows.
    async fn begin_batch(&self) -> Result<Box<dyn LogBatch>>;

    /// Rows for the user logged at or after `since`, newest first.
    async fn logs_since(&self, user_id: &str, since: NaiveDateTime) -> Result<Vec<ExerciseLog>>;

    /// Distinct exercise names logged in `[start, end)`.
    async fn exercise_names_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BTreeSet<String>>;

    /// Deletes rows logged in `[start, end)` and returns how many went.
    async fn delete_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u64>;

    async fn count_logs(&self, user_id: &str) -> Result<i64>;
}

/// An open append transaction. Dropping it without `commit` discards the rows.
#[async_trait]
pub trait LogBatch: Send {
    /// Insert including `series_detail`. Fails with
    /// [`crate::StorageError::MissingColumn`] when the column does not exist
    /// yet, leaving the batch usable.
    async fn insert_extended(&mut self, log: &NewExerciseLog) -> Result<()>;

    /// Insert restricted to the columns every schema version has.
    async fn insert_reduced(&mut self, log: &NewExerciseLog) -> Result<()>;

    async fn insert_duration(&mut self, log: &NewExerciseLog) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait RoutineDayStore: Send + Sync {
    /// Deletes every routine row of the user, then inserts `days`, atomically.
    async fn replace_routine(&self, user_id: &str, days: &[PlannedDay]) -> Result<()>;

    /// Saved days ordered by weekday.
    async fn load_routine(&self, user_id: &str) -> Result<Vec<RoutineDay>>;
}
