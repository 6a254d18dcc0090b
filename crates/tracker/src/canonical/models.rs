use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use storage::models::Series;

/// Container key the extraction prompt asks the model for.
pub const RECORD_KEY: &str = "registro";

/// Raw model output coerced into `{"registro": [...]}`. Entries are kept as
/// untyped JSON until [`super::validator::RecordValidator`] checks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordContainer {
    pub registro: Vec<Value>,
}

/// What was done: sets for strength work, minutes for cardio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    Series(Vec<Series>),
    DurationMinutes(i32),
}

/// A validated exercise with a canonicalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub name: String,
    pub workload: Workload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort_reserve: Option<i32>,
}

impl ExerciseEntry {
    pub fn series(&self) -> Option<&[Series]> {
        match &self.workload {
            Workload::Series(series) => Some(series),
            Workload::DurationMinutes(_) => None,
        }
    }

    pub fn duration_minutes(&self) -> Option<i32> {
        match self.workload {
            Workload::DurationMinutes(minutes) => Some(minutes),
            Workload::Series(_) => None,
        }
    }

    /// Sum of repetitions across sets, `None` for duration entries.
    pub fn total_repetitions(&self) -> Option<i32> {
        self.series()
            .map(|series| series.iter().map(|s| s.repetitions).sum())
    }
}

/// Shape the model is asked to emit for one exercise. Used to render the
/// schema example in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRecordSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<Series>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort_reserve: Option<i32>,
}
