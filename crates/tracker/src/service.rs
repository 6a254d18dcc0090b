//! The operations exposed to routing, chat and CLI layers.
//!
//! Every operation returns an [`Outcome`]; errors are logged and turned into
//! a failure message here and never reach the caller.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use storage::models::ExerciseLog;
use storage::{ExerciseLogStore, RoutineDayStore};
use tracing::error;

use crate::canonical::models::ExerciseEntry;
use crate::canonical::validator::RecordValidator;
use crate::clock::Clock;
use crate::extractors::pipeline::LogExtractor;
use crate::extractors::prompts::ExtractionPromptBuilder;
use crate::ingestion::IngestionWriter;
use crate::normalizer::{ExerciseDictionary, NameNormalizer};
use crate::reconciler::{DailyReconciler, DailyStatusView};
use crate::routine::{RoutineMap, RoutineStore};
use crate::traits::TextGenerator;
use crate::TrackerError;

#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    fn from_error(operation: &str, error: TrackerError) -> Self {
        error!("{} failed: {}", operation, error);
        Self::failure(user_message(&error))
    }
}

fn user_message(error: &TrackerError) -> String {
    match error {
        TrackerError::Extraction(_) => {
            "Could not understand the workout description, please rephrase it".to_string()
        }
        TrackerError::Validation(detail) => {
            format!("The workout could not be recorded: {}", detail)
        }
        TrackerError::Ingestion(detail) => format!("Nothing was saved: {}", detail),
        TrackerError::StoreUnavailable(_) => {
            "The workout store is unavailable, try again later".to_string()
        }
        _ => "An internal error occurred".to_string(),
    }
}

pub struct WorkoutTracker<G, S> {
    generator: Arc<G>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    normalizer: NameNormalizer,
    extractor: LogExtractor<G>,
    writer: IngestionWriter<S>,
    routines: Arc<RoutineStore<S>>,
    reconciler: DailyReconciler<S, S>,
}

impl<G, S> WorkoutTracker<G, S>
where
    G: TextGenerator,
    S: ExerciseLogStore + RoutineDayStore,
{
    pub fn new(
        generator: Arc<G>,
        store: Arc<S>,
        dictionary: Arc<ExerciseDictionary>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let normalizer = NameNormalizer::new(dictionary);
        let routines = Arc::new(RoutineStore::new(store.clone(), normalizer.clone()));

        Self {
            extractor: LogExtractor::new(
                generator.clone(),
                ExtractionPromptBuilder::new(),
                RecordValidator::new(normalizer.clone()),
            ),
            generator,
            normalizer,
            writer: IngestionWriter::new(store.clone(), clock.clone()),
            reconciler: DailyReconciler::new(store.clone(), routines.clone(), clock.clone()),
            routines,
            store,
            clock,
        }
    }

    pub fn with_prompt_builder(mut self, prompt_builder: ExtractionPromptBuilder) -> Self {
        self.extractor = LogExtractor::new(
            self.generator.clone(),
            prompt_builder,
            RecordValidator::new(self.normalizer.clone()),
        );
        self
    }

    pub fn prompt_builder(&self) -> &ExtractionPromptBuilder {
        self.extractor.prompt_builder()
    }

    /// Extracts, validates and records a free-text workout.
    pub async fn submit_log(&self, user_id: &str, raw_text: &str) -> Outcome<Vec<ExerciseEntry>> {
        if raw_text.trim().is_empty() {
            return Outcome::failure("Nothing to log");
        }

        let result = async {
            let validated = self.extractor.extract(raw_text).await?;
            self.writer.ingest(&validated.entries, user_id).await?;
            Ok::<_, TrackerError>(validated.entries)
        }
        .await;

        match result {
            Ok(entries) => {
                let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
                Outcome::ok(
                    format!("Recorded {} exercise(s): {}", entries.len(), names.join(", ")),
                    entries,
                )
            }
            Err(e) => Outcome::from_error("submit_log", e),
        }
    }

    /// Extracts and validates without persisting anything.
    pub async fn preview_log(&self, raw_text: &str) -> Outcome<Vec<ExerciseEntry>> {
        match self.extractor.extract(raw_text).await {
            Ok(validated) => Outcome::ok(
                format!("Parsed {} exercise(s)", validated.entries.len()),
                validated.entries,
            ),
            Err(e) => Outcome::from_error("preview_log", e),
        }
    }

    /// Logs from the last `days` calendar days, today included, newest first.
    pub async fn get_logs(&self, user_id: &str, days: u32) -> Outcome<Vec<ExerciseLog>> {
        let (today_start, _) = self.clock.today_bounds();
        // Windows reaching past the calendar range start at its first instant.
        let since = Duration::try_days(i64::from(days.max(1)) - 1)
            .and_then(|back| today_start.checked_sub_signed(back))
            .unwrap_or(NaiveDateTime::MIN);

        match self.store.logs_since(user_id, since).await {
            Ok(logs) => Outcome::ok(format!("{} log(s) found", logs.len()), logs),
            Err(e) => Outcome::from_error("get_logs", e.into()),
        }
    }

    pub async fn get_routine(&self, user_id: &str) -> Outcome<RoutineMap> {
        match self.routines.load(user_id).await {
            Ok(routine) if routine.is_empty() => Outcome::ok("No routine saved", routine),
            Ok(routine) => Outcome::ok(format!("{} day(s) planned", routine.len()), routine),
            Err(e) => Outcome::from_error("get_routine", e),
        }
    }

    /// Replaces the routine with the valid days of a `{"1": [...], ...}` object.
    pub async fn save_routine(&self, user_id: &str, routine: &Value) -> Outcome<usize> {
        let Some(days) = routine.as_object() else {
            return Outcome::failure("A routine must be an object keyed by weekday number");
        };

        match self.routines.save(user_id, days).await {
            Ok(saved) => Outcome::ok(format!("Routine saved ({} day(s))", saved), saved),
            Err(e) => Outcome::from_error("save_routine", e),
        }
    }

    pub async fn get_today_status(&self, user_id: &str) -> Outcome<DailyStatusView> {
        match self.reconciler.today_status(user_id).await {
            Ok(view) => {
                let message = match &view.message {
                    Some(message) => message.clone(),
                    None => format!(
                        "{}: {} of {} done",
                        view.weekday_name,
                        view.completed_count(),
                        view.planned.len()
                    ),
                };
                Outcome::ok(message, view)
            }
            Err(e) => Outcome::from_error("get_today_status", e),
        }
    }

    pub async fn reset_today(&self, user_id: &str) -> Outcome<u64> {
        match self.reconciler.reset_today(user_id).await {
            Ok(deleted) => Outcome::ok(format!("{} log(s) removed for today", deleted), deleted),
            Err(e) => Outcome::from_error("reset_today", e),
        }
    }
}
