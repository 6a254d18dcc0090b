use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoutineDay {
    pub routine_id: Uuid,
    pub user_id: String,
    pub weekday: i16,
    pub exercises: sqlx::types::Json<Vec<String>>,
    pub updated_at: NaiveDateTime,
}

/// One weekday of a routine being saved. `weekday` is ISO numbered, 1 = Monday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDay {
    pub weekday: i16,
    pub exercises: Vec<String>,
}
