//! In-process store with the same contract as [`crate::Database`].
//!
//! It can pretend to run on the schema that predates `series_detail` and can
//! be told to reject specific exercise names, to exercise the writer's
//! fallback and rollback paths.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{ExerciseLog, NewExerciseLog, PlannedDay, RoutineDay};
use crate::store::{ExerciseLogStore, LogBatch, RoutineDayStore};

#[derive(Debug)]
struct MemoryState {
    logs: Vec<ExerciseLog>,
    routines: Vec<RoutineDay>,
    has_series_detail: bool,
    rejected_exercises: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                logs: Vec::new(),
                routines: Vec::new(),
                has_series_detail: true,
                rejected_exercises: HashSet::new(),
            })),
        }
    }

    /// A store whose `exercise_logs` table has no `series_detail` column.
    pub fn without_series_detail() -> Self {
        let store = Self::new();
        store.lock().has_series_detail = false;
        store
    }

    /// Every insert for `exercise_name` fails with a constraint violation.
    pub fn reject_exercise(&self, exercise_name: &str) {
        self.lock()
            .rejected_exercises
            .insert(exercise_name.to_string());
    }

    /// Appends a row directly, bypassing batches.
    pub fn seed_log(&self, log: NewExerciseLog) {
        let mut state = self.lock();
        let keep = state.has_series_detail;
        state.logs.push(log.into_log(Uuid::new_v4(), keep));
    }

    pub fn all_logs(&self) -> Vec<ExerciseLog> {
        self.lock().logs.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct MemoryBatch {
    store: MemoryStore,
    pending: Vec<ExerciseLog>,
}

impl MemoryBatch {
    fn check_rejected(&self, log: &NewExerciseLog) -> Result<()> {
        if self
            .store
            .lock()
            .rejected_exercises
            .contains(&log.exercise_name)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "insert rejected for '{}'",
                log.exercise_name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LogBatch for MemoryBatch {
    async fn insert_extended(&mut self, log: &NewExerciseLog) -> Result<()> {
        if !self.store.lock().has_series_detail {
            return Err(StorageError::MissingColumn(
                "column \"series_detail\" of relation \"exercise_logs\" does not exist"
                    .to_string(),
            ));
        }
        self.check_rejected(log)?;
        self.pending.push(log.clone().into_log(Uuid::new_v4(), true));
        Ok(())
    }

    async fn insert_reduced(&mut self, log: &NewExerciseLog) -> Result<()> {
        self.check_rejected(log)?;
        let mut row = log.clone();
        row.duration_minutes = None;
        self.pending.push(row.into_log(Uuid::new_v4(), false));
        Ok(())
    }

    async fn insert_duration(&mut self, log: &NewExerciseLog) -> Result<()> {
        self.check_rejected(log)?;
        let mut row = log.clone();
        row.total_repetitions = None;
        self.pending.push(row.into_log(Uuid::new_v4(), false));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryBatch { store, pending } = *self;
        store.lock().logs.extend(pending);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ExerciseLogStore for MemoryStore {
    async fn begin_batch(&self) -> Result<Box<dyn LogBatch>> {
        Ok(Box::new(MemoryBatch {
            store: self.clone(),
            pending: Vec::new(),
        }))
    }

    async fn logs_since(&self, user_id: &str, since: NaiveDateTime) -> Result<Vec<ExerciseLog>> {
        let mut logs: Vec<ExerciseLog> = self
            .lock()
            .logs
            .iter()
            .filter(|log| log.user_id == user_id && log.logged_at >= since)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        Ok(logs)
    }

    async fn exercise_names_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BTreeSet<String>> {
        Ok(self
            .lock()
            .logs
            .iter()
            .filter(|log| log.user_id == user_id && log.logged_at >= start && log.logged_at < end)
            .map(|log| log.exercise_name.clone())
            .collect())
    }

    async fn delete_between(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u64> {
        let mut state = self.lock();
        let before = state.logs.len();
        state.logs.retain(|log| {
            !(log.user_id == user_id && log.logged_at >= start && log.logged_at < end)
        });
        Ok((before - state.logs.len()) as u64)
    }

    async fn count_logs(&self, user_id: &str) -> Result<i64> {
        Ok(self
            .lock()
            .logs
            .iter()
            .filter(|log| log.user_id == user_id)
            .count() as i64)
    }
}

#[async_trait]
impl RoutineDayStore for MemoryStore {
    async fn replace_routine(&self, user_id: &str, days: &[PlannedDay]) -> Result<()> {
        let now = Utc::now().naive_utc();
        let mut state = self.lock();
        state.routines.retain(|day| day.user_id != user_id);
        state.routines.extend(days.iter().map(|day| RoutineDay {
            routine_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            weekday: day.weekday,
            exercises: sqlx::types::Json(day.exercises.clone()),
            updated_at: now,
        }));
        Ok(())
    }

    async fn load_routine(&self, user_id: &str) -> Result<Vec<RoutineDay>> {
        let mut days: Vec<RoutineDay> = self
            .lock()
            .routines
            .iter()
            .filter(|day| day.user_id == user_id)
            .cloned()
            .collect();
        days.sort_by_key(|day| day.weekday);
        Ok(days)
    }
}
