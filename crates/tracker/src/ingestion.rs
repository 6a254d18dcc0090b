use std::sync::Arc;

use storage::models::NewExerciseLog;
use storage::{ExerciseLogStore, LogBatch};
use tracing::{info, warn};

use crate::canonical::models::{ExerciseEntry, Workload};
use crate::clock::Clock;
use crate::{Result, TrackerError};

/// Appends validated entries to the exercise log, one transaction per call.
pub struct IngestionWriter<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ExerciseLogStore> IngestionWriter<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Writes every entry or none. Returns the number of rows written.
    pub async fn ingest(&self, entries: &[ExerciseEntry], user_id: &str) -> Result<usize> {
        if entries.is_empty() {
            return Err(TrackerError::Ingestion(
                "no exercises to record".to_string(),
            ));
        }

        let logged_at = self.clock.now();
        let mut batch = self.store.begin_batch().await?;

        for entry in entries {
            let row = NewExerciseLog {
                logged_at,
                user_id: user_id.to_string(),
                exercise_name: entry.name.clone(),
                total_repetitions: entry.total_repetitions(),
                duration_minutes: entry.duration_minutes(),
                comments: entry.comments.clone(),
                effort_reserve: entry.effort_reserve,
                series_detail: entry.series().map(<[_]>::to_vec),
            };

            if let Err(e) = self.write_entry(batch.as_mut(), entry, &row).await {
                warn!("Rolling back ingestion for user {}: {}", user_id, e);
                if let Err(rollback_err) = batch.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                return Err(e);
            }
        }

        batch.commit().await.map_err(|e| {
            TrackerError::Ingestion(format!("commit failed: {}", e))
        })?;

        info!("Recorded {} exercise(s) for user {}", entries.len(), user_id);
        Ok(entries.len())
    }

    async fn write_entry(
        &self,
        batch: &mut dyn LogBatch,
        entry: &ExerciseEntry,
        row: &NewExerciseLog,
    ) -> Result<()> {
        let result = match entry.workload {
            Workload::Series(_) => match batch.insert_extended(row).await {
                Err(e) if e.is_missing_column() => {
                    warn!(
                        "Extended insert unavailable ({}), using reduced insert for '{}'",
                        e, row.exercise_name
                    );
                    batch.insert_reduced(row).await
                }
                other => other,
            },
            Workload::DurationMinutes(_) => batch.insert_duration(row).await,
        };

        result.map_err(|e| {
            if e.is_connection_error() {
                TrackerError::from(e)
            } else {
                TrackerError::Ingestion(format!(
                    "could not record '{}': {}",
                    row.exercise_name, e
                ))
            }
        })
    }
}
