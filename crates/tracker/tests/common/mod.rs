#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use storage::memory::MemoryStore;
use storage::models::NewExerciseLog;
use tracker::{
    ExerciseDictionary, FixedClock, Generation, Result, TextGenerator, TrackerError,
    WorkoutTracker,
};

pub const USER: &str = "user-1";

/// Answers every prompt with the same canned response.
pub struct ScriptedGenerator {
    response: std::result::Result<String, String>,
}

impl ScriptedGenerator {
    pub fn replying(content: &str) -> Self {
        Self {
            response: Ok(content.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Generation> {
        match &self.response {
            Ok(content) => Ok(Generation {
                content: content.clone(),
            }),
            Err(reason) => Err(TrackerError::Extraction(reason.clone())),
        }
    }
}

/// Monday 2025-03-10, 18:30.
pub fn monday_evening() -> NaiveDateTime {
    at(2025, 3, 10, 18, 30)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn tracker_with(
    generator: ScriptedGenerator,
    store: MemoryStore,
) -> WorkoutTracker<ScriptedGenerator, MemoryStore> {
    WorkoutTracker::new(
        Arc::new(generator),
        Arc::new(store),
        Arc::new(ExerciseDictionary::default()),
        Arc::new(FixedClock(monday_evening())),
    )
}

pub fn logged(exercise_name: &str, logged_at: NaiveDateTime) -> NewExerciseLog {
    NewExerciseLog {
        logged_at,
        user_id: USER.to_string(),
        exercise_name: exercise_name.to_string(),
        total_repetitions: Some(10),
        duration_minutes: None,
        comments: None,
        effort_reserve: None,
        series_detail: None,
    }
}
