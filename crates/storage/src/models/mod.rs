mod exercise_log;
mod routine_day;

pub use exercise_log::{ExerciseLog, ExerciseLogRow, NewExerciseLog, Series, SeriesDetail};
pub use routine_day::{PlannedDay, RoutineDay};
