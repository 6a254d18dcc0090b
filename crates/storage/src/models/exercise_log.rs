use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One performed set. `weight` is 0.0 for bodyweight work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub repetitions: i32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub effort_reserve: Option<i32>,
}

/// The `series_detail` column as found in the store.
///
/// Older rows may hold a free-text or double-encoded value instead of a JSON
/// array. The variant is decided once when the row is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesDetail {
    Structured(Vec<Series>),
    Text(String),
}

impl SeriesDetail {
    pub fn from_column(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::String(inner)) => match serde_json::from_str(&inner) {
                Ok(series) => SeriesDetail::Structured(series),
                Err(_) => SeriesDetail::Text(inner),
            },
            Ok(value @ serde_json::Value::Array(_)) => match serde_json::from_value(value) {
                Ok(series) => SeriesDetail::Structured(series),
                Err(_) => SeriesDetail::Text(raw.to_string()),
            },
            _ => SeriesDetail::Text(raw.to_string()),
        }
    }

    pub fn series(&self) -> Option<&[Series]> {
        match self {
            SeriesDetail::Structured(series) => Some(series),
            SeriesDetail::Text(_) => None,
        }
    }
}

/// Raw `exercise_logs` row. `series_detail` is selected as text so JSONB and
/// legacy TEXT columns decode the same way.
#[derive(Debug, Clone, FromRow)]
pub struct ExerciseLogRow {
    pub log_id: Uuid,
    pub logged_at: NaiveDateTime,
    pub user_id: String,
    pub exercise_name: String,
    pub total_repetitions: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub comments: Option<String>,
    pub effort_reserve: Option<i32>,
    pub series_detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseLog {
    pub log_id: Uuid,
    pub logged_at: NaiveDateTime,
    pub user_id: String,
    pub exercise_name: String,
    pub total_repetitions: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub comments: Option<String>,
    pub effort_reserve: Option<i32>,
    pub series_detail: Option<SeriesDetail>,
}

impl From<ExerciseLogRow> for ExerciseLog {
    fn from(row: ExerciseLogRow) -> Self {
        Self {
            log_id: row.log_id,
            logged_at: row.logged_at,
            user_id: row.user_id,
            exercise_name: row.exercise_name,
            total_repetitions: row.total_repetitions,
            duration_minutes: row.duration_minutes,
            comments: row.comments,
            effort_reserve: row.effort_reserve,
            series_detail: row.series_detail.as_deref().map(SeriesDetail::from_column),
        }
    }
}

/// A log row about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExerciseLog {
    pub logged_at: NaiveDateTime,
    pub user_id: String,
    pub exercise_name: String,
    pub total_repetitions: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub comments: Option<String>,
    pub effort_reserve: Option<i32>,
    pub series_detail: Option<Vec<Series>>,
}

impl NewExerciseLog {
    /// The row as read back from a store, with the given id.
    pub fn into_log(self, log_id: Uuid, keep_series_detail: bool) -> ExerciseLog {
        ExerciseLog {
            log_id,
            logged_at: self.logged_at,
            user_id: self.user_id,
            exercise_name: self.exercise_name,
            total_repetitions: self.total_repetitions,
            duration_minutes: self.duration_minutes,
            comments: self.comments,
            effort_reserve: self.effort_reserve,
            series_detail: self
                .series_detail
                .filter(|_| keep_series_detail)
                .map(SeriesDetail::Structured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_detail_from_json_array() {
        let detail = SeriesDetail::from_column(
            r#"[{"repetitions":5,"weight":75.0,"effort_reserve":null},{"repetitions":7,"weight":70.0,"effort_reserve":2}]"#,
        );
        let series = detail.series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].effort_reserve, Some(2));
    }

    #[test]
    fn test_series_detail_from_double_encoded_string() {
        let detail = SeriesDetail::from_column(r#""[{\"repetitions\":8,\"weight\":60}]""#);
        assert_eq!(
            detail,
            SeriesDetail::Structured(vec![Series {
                repetitions: 8,
                weight: 60.0,
                effort_reserve: None,
            }])
        );
    }

    #[test]
    fn test_series_detail_falls_back_to_text() {
        let detail = SeriesDetail::from_column("5x75, 7x70");
        assert_eq!(detail, SeriesDetail::Text("5x75, 7x70".to_string()));
        assert!(detail.series().is_none());
    }

    #[test]
    fn test_series_weight_defaults_to_zero() {
        let series: Series = serde_json::from_str(r#"{"repetitions":12}"#).unwrap();
        assert_eq!(series.weight, 0.0);
        assert_eq!(series.effort_reserve, None);
    }

    #[test]
    fn test_series_blob_shape() {
        let blob = serde_json::to_value(vec![Series {
            repetitions: 5,
            weight: 75.0,
            effort_reserve: None,
        }])
        .unwrap();
        assert_eq!(
            blob,
            serde_json::json!([{"repetitions": 5, "weight": 75.0, "effort_reserve": null}])
        );
    }
}
