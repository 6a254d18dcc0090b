use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use storage::{ExerciseLogStore, RoutineDayStore};
use tracing::info;

use crate::Result;
use crate::clock::{Clock, weekday_name};
use crate::routine::RoutineStore;

pub const NO_ROUTINE_TODAY: &str = "No routine planned for today";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStatus {
    pub exercise_name: String,
    pub completed: bool,
}

/// Today's plan with completion derived from today's log rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStatusView {
    pub date: NaiveDate,
    pub weekday: u8,
    pub weekday_name: String,
    pub planned: Vec<PlannedStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DailyStatusView {
    pub fn completed_count(&self) -> usize {
        self.planned.iter().filter(|p| p.completed).count()
    }
}

pub struct DailyReconciler<L, R> {
    logs: Arc<L>,
    routines: Arc<RoutineStore<R>>,
    clock: Arc<dyn Clock>,
}

impl<L, R> DailyReconciler<L, R>
where
    L: ExerciseLogStore,
    R: RoutineDayStore,
{
    pub fn new(logs: Arc<L>, routines: Arc<RoutineStore<R>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            logs,
            routines,
            clock,
        }
    }

    pub async fn today_status(&self, user_id: &str) -> Result<DailyStatusView> {
        let date = self.clock.today();
        let weekday = self.clock.weekday();
        let mut view = DailyStatusView {
            date,
            weekday,
            weekday_name: weekday_name(weekday).to_string(),
            planned: Vec::new(),
            message: None,
        };

        let planned = self
            .routines
            .planned_for(user_id, weekday)
            .await?
            .unwrap_or_default();
        if planned.is_empty() {
            view.message = Some(NO_ROUTINE_TODAY.to_string());
            return Ok(view);
        }

        let (start, end) = self.clock.today_bounds();
        let done = self
            .logs
            .exercise_names_between(user_id, start, end)
            .await?;

        view.planned = planned
            .into_iter()
            .map(|exercise_name| PlannedStatus {
                completed: done.contains(&exercise_name),
                exercise_name,
            })
            .collect();

        Ok(view)
    }

    /// Deletes every log row of today for the user.
    pub async fn reset_today(&self, user_id: &str) -> Result<u64> {
        let (start, end) = self.clock.today_bounds();
        let deleted = self.logs.delete_between(user_id, start, end).await?;

        info!("Reset today for user {}: {} row(s) deleted", user_id, deleted);
        Ok(deleted)
    }
}
